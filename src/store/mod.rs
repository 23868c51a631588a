//! Storage boundary. Handlers only see these traits; `MySqlStore` backs
//! them in production and `MemoryStore` in tests or `STORE_BACKEND=memory`.

use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDate;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::{
    model::{
        attendance::AttendanceDay, employee::Employee, payroll::Payroll,
        salary_record::SalaryRecord,
    },
    utils::period::DateRange,
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row that does not fit the schema (unknown enum name,
    /// negative salary, ...).
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

pub type StoreFuture<'a, T> = BoxFuture<'a, Result<T, StoreError>>;

/// Day-keyed attendance records.
pub trait AttendanceStore: Send + Sync {
    fn get_day(&self, date: NaiveDate) -> StoreFuture<'_, Option<AttendanceDay>>;

    /// Every saved day inside `range`. Days with no record are simply absent
    /// from the map.
    fn get_range(&self, range: DateRange) -> StoreFuture<'_, BTreeMap<NaiveDate, AttendanceDay>>;

    /// Insert or replace the record for `day.date`.
    fn put_day(&self, day: AttendanceDay) -> StoreFuture<'_, ()>;
}

pub trait EmployeeRoster: Send + Sync {
    fn list_employees(&self) -> StoreFuture<'_, Vec<Employee>>;
    /// One page of employees matching `filter`, by id, plus the unpaged total.
    fn search_employees(
        &self,
        filter: EmployeeFilter,
        page: Page,
    ) -> StoreFuture<'_, (Vec<Employee>, i64)>;
    fn get_employee(&self, id: u64) -> StoreFuture<'_, Option<Employee>>;
    /// `employee.id` is ignored and replaced by the assigned one.
    fn create_employee(&self, employee: Employee) -> StoreFuture<'_, Employee>;
    /// Replaces the stored employee with the same id. `false` if none exists.
    fn update_employee(&self, employee: Employee) -> StoreFuture<'_, bool>;
    fn delete_employee(&self, id: u64) -> StoreFuture<'_, bool>;
}

pub trait SalaryStore: Send + Sync {
    fn get_salary(&self, employee_id: u64, period_key: String)
    -> StoreFuture<'_, Option<SalaryRecord>>;
    /// Last write wins on `(employee_id, period_key)`.
    fn put_salary(&self, record: SalaryRecord) -> StoreFuture<'_, ()>;
    /// Newest period first.
    fn list_salaries(&self, employee_id: u64) -> StoreFuture<'_, Vec<SalaryRecord>>;
}

#[derive(Debug, Copy, Clone)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// Rows to skip. Computed in `u64` so no `u32` page number can overflow.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.per_page)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// case-insensitive exact match
    pub status: Option<String>,
    /// case-insensitive substring of first name, last name or email
    pub search: Option<String>,
}

impl EmployeeFilter {
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(status) = &self.status {
            if !employee.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let search = search.to_lowercase();
            return [&employee.first_name, &employee.last_name, &employee.email]
                .iter()
                .any(|field| field.to_lowercase().contains(&search));
        }
        true
    }
}

pub trait PayrollStore: Send + Sync {
    /// `payroll.id` is ignored and replaced by the assigned one.
    fn create_payroll(&self, payroll: Payroll) -> StoreFuture<'_, Payroll>;
    fn update_payroll(&self, payroll: Payroll) -> StoreFuture<'_, bool>;
    fn get_payroll(&self, id: u64) -> StoreFuture<'_, Option<Payroll>>;
    /// One page ordered by month, newest first, plus the unpaged total.
    fn list_payrolls(
        &self,
        page: Page,
        employee_id: Option<u64>,
    ) -> StoreFuture<'_, (Vec<Payroll>, i64)>;
    fn find_payroll_for_month(
        &self,
        employee_id: u64,
        month: NaiveDate,
    ) -> StoreFuture<'_, Option<Payroll>>;
}

/// Handles shared with every request through `web::Data`.
#[derive(Clone)]
pub struct Stores {
    pub attendance: Arc<dyn AttendanceStore>,
    pub roster: Arc<dyn EmployeeRoster>,
    pub salaries: Arc<dyn SalaryStore>,
    pub payrolls: Arc<dyn PayrollStore>,
}

impl Stores {
    fn from_backend<S>(store: Arc<S>) -> Self
    where
        S: AttendanceStore + EmployeeRoster + SalaryStore + PayrollStore + 'static,
    {
        Self {
            attendance: store.clone(),
            roster: store.clone(),
            salaries: store.clone(),
            payrolls: store,
        }
    }

    pub fn mysql(store: MySqlStore) -> Self {
        Self::from_backend(Arc::new(store))
    }

    pub fn memory(store: MemoryStore) -> Self {
        Self::from_backend(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::{self, SalaryInterval};

    #[test]
    fn offset_of_last_page_number_does_not_overflow() {
        let page = Page { page: u32::MAX, per_page: 100 };
        assert_eq!(page.offset(), (u64::from(u32::MAX) - 1) * 100);
        assert_eq!(Page { page: 0, per_page: 10 }.offset(), 0);
        assert_eq!(Page { page: 3, per_page: 10 }.offset(), 20);
    }

    #[test]
    fn filter_matches_status_and_search() {
        let worker = employee::sample(3, 500.0, SalaryInterval::Daily);

        assert!(EmployeeFilter::default().matches(&worker));
        let active = EmployeeFilter { status: Some("ACTIVE".into()), search: None };
        assert!(active.matches(&worker));
        let by_email = EmployeeFilter { status: None, search: Some("WORKER3@".into()) };
        assert!(by_email.matches(&worker));
        let miss = EmployeeFilter { status: Some("active".into()), search: Some("nobody".into()) };
        assert!(!miss.matches(&worker));
    }
}
