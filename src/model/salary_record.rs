use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Attendance-derived salary for one employee and pay period.
///
/// Keyed by `(employee_id, period_key)`; saving under an existing key
/// overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1,
    "period_key": "2026-01",
    "period_start": "2026-01-01",
    "period_end": "2026-01-31",
    "present_count": 20,
    "absent_count": 5,
    "total_working_days": 25,
    "computed_salary": 20000.0,
    "paid": false,
    "paid_date": null,
    "computed_on": "2026-02-01"
}))]
pub struct SalaryRecord {
    pub employee_id: u64,
    pub period_key: String,

    #[schema(value_type = String, format = "date")]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub period_end: NaiveDate,

    pub present_count: u32,
    pub absent_count: u32,
    pub total_working_days: u32,
    pub computed_salary: f64,

    pub paid: bool,
    #[schema(value_type = Option<String>, format = "date")]
    pub paid_date: Option<NaiveDate>,

    #[schema(value_type = String, format = "date")]
    pub computed_on: NaiveDate,
}

impl SalaryRecord {
    /// Flips Pending <-> Paid. `paid_date` follows the flag.
    pub fn toggle_paid(&mut self, today: NaiveDate) {
        self.paid = !self.paid;
        self.paid_date = self.paid.then_some(today);
    }

    pub fn receipt(&self, name: impl Into<String>) -> SalaryReceipt {
        SalaryReceipt {
            name: name.into(),
            present_count: self.present_count,
            absent_count: self.absent_count,
            total_working_days: self.total_working_days,
            salary: self.computed_salary,
            paid: self.paid,
        }
    }
}

/// Flat view handed to whatever prints the pay slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalaryReceipt {
    #[schema(example = "John Doe")]
    pub name: String,
    pub present_count: u32,
    pub absent_count: u32,
    pub total_working_days: u32,
    #[schema(example = 20000.0)]
    pub salary: f64,
    pub paid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SalaryRecord {
        SalaryRecord {
            employee_id: 1,
            period_key: "2026-01".into(),
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            present_count: 20,
            absent_count: 5,
            total_working_days: 25,
            computed_salary: 20000.0,
            paid: false,
            paid_date: None,
            computed_on: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        }
    }

    #[test]
    fn toggling_twice_restores_the_flag() {
        let mut record = record();
        let first = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let second = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();

        record.toggle_paid(first);
        assert!(record.paid);
        assert_eq!(record.paid_date, Some(first));

        record.toggle_paid(second);
        assert!(!record.paid);
        assert_eq!(record.paid_date, None);
    }

    #[test]
    fn receipt_carries_counts_and_salary() {
        let mut record = record();
        record.toggle_paid(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());

        let receipt = record.receipt("John Doe");
        assert_eq!(
            receipt,
            SalaryReceipt {
                name: "John Doe".into(),
                present_count: 20,
                absent_count: 5,
                total_working_days: 25,
                salary: 20000.0,
                paid: true,
            }
        );
    }
}
