use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Operator-entered payroll line. Kept apart from the attendance-derived
/// [`SalaryRecord`](super::salary_record::SalaryRecord); nothing reconciles the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payroll {
    pub id: u64,
    pub employee_id: u64,

    /// first day of the month this payroll covers
    #[schema(value_type = String, format = "date")]
    pub month: NaiveDate,

    pub base_salary: f64,
    pub bonus: f64,
    pub deductions: f64,
    pub net_salary: f64,
}
