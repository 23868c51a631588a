use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// How an employee's `salary` is quoted.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SalaryInterval {
    /// `salary` is paid per present day
    Daily,
    /// `salary` is the full month, pro-rated by attendance
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "role": "Warehouse",
        "salary": 25000.0,
        "salary_interval": "monthly",
        "hire_date": "2024-01-01",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Warehouse")]
    pub role: String,

    #[schema(example = 25000.0)]
    pub salary: f64,

    pub salary_interval: SalaryInterval,

    #[schema(
        example = "2024-01-01",
        value_type = String,
        format = "date"
    )]
    pub hire_date: NaiveDate,

    #[schema(example = "active")]
    pub status: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// Field checks shared by HR edits and rows read back from storage.
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() {
            return Err("first_name must not be empty".into());
        }
        if !self.salary.is_finite() || self.salary < 0.0 {
            return Err(format!("salary must be a non-negative number, got {}", self.salary));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample(id: u64, salary: f64, salary_interval: SalaryInterval) -> Employee {
    Employee {
        id,
        employee_code: format!("EMP-{id:03}"),
        first_name: format!("Worker{id}"),
        last_name: "Test".into(),
        email: format!("worker{id}@company.com"),
        phone: None,
        role: "Warehouse".into(),
        salary,
        salary_interval,
        hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        status: "active".into(),
    }
}
