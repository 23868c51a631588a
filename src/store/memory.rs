use std::{collections::BTreeMap, sync::RwLock};

use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::ready;

use super::{
    AttendanceStore, EmployeeFilter, EmployeeRoster, Page, PayrollStore, SalaryStore, StoreError,
    StoreFuture,
};
use crate::{
    model::{
        attendance::AttendanceDay, employee::Employee, payroll::Payroll,
        salary_record::SalaryRecord,
    },
    utils::period::DateRange,
};

/// Process-local store. Everything is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    employees: RwLock<BTreeMap<u64, Employee>>,
    days: RwLock<BTreeMap<NaiveDate, AttendanceDay>>,
    salaries: RwLock<BTreeMap<(u64, String), SalaryRecord>>,
    payrolls: RwLock<BTreeMap<u64, Payroll>>,
}

fn done<'a, T: Send + 'a>(value: T) -> StoreFuture<'a, T> {
    ready(Ok::<_, StoreError>(value)).boxed()
}

fn skip_count(page: Page) -> usize {
    usize::try_from(page.offset()).unwrap_or(usize::MAX)
}

fn next_id<V>(map: &BTreeMap<u64, V>) -> u64 {
    map.keys().next_back().map_or(1, |last| last + 1)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceStore for MemoryStore {
    fn get_day(&self, date: NaiveDate) -> StoreFuture<'_, Option<AttendanceDay>> {
        let days = self.days.read().expect("attendance map poisoned");
        done(days.get(&date).cloned())
    }

    fn get_range(&self, range: DateRange) -> StoreFuture<'_, BTreeMap<NaiveDate, AttendanceDay>> {
        if range.is_empty() {
            return done(BTreeMap::new());
        }
        let days = self.days.read().expect("attendance map poisoned");
        done(
            days.range(range.start..=range.end)
                .map(|(date, day)| (*date, day.clone()))
                .collect(),
        )
    }

    fn put_day(&self, day: AttendanceDay) -> StoreFuture<'_, ()> {
        self.days
            .write()
            .expect("attendance map poisoned")
            .insert(day.date, day);
        done(())
    }
}

impl EmployeeRoster for MemoryStore {
    fn list_employees(&self) -> StoreFuture<'_, Vec<Employee>> {
        let employees = self.employees.read().expect("employee map poisoned");
        done(employees.values().cloned().collect())
    }

    fn search_employees(
        &self,
        filter: EmployeeFilter,
        page: Page,
    ) -> StoreFuture<'_, (Vec<Employee>, i64)> {
        let employees = self.employees.read().expect("employee map poisoned");
        let matching: Vec<&Employee> = employees.values().filter(|e| filter.matches(e)).collect();

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(skip_count(page))
            .take(page.per_page as usize)
            .cloned()
            .collect();
        done((data, total))
    }

    fn get_employee(&self, id: u64) -> StoreFuture<'_, Option<Employee>> {
        let employees = self.employees.read().expect("employee map poisoned");
        done(employees.get(&id).cloned())
    }

    fn create_employee(&self, mut employee: Employee) -> StoreFuture<'_, Employee> {
        let mut employees = self.employees.write().expect("employee map poisoned");
        employee.id = next_id(&employees);
        employees.insert(employee.id, employee.clone());
        done(employee)
    }

    fn update_employee(&self, employee: Employee) -> StoreFuture<'_, bool> {
        let mut employees = self.employees.write().expect("employee map poisoned");
        let updated = match employees.get_mut(&employee.id) {
            Some(current) => {
                *current = employee;
                true
            }
            None => false,
        };
        done(updated)
    }

    fn delete_employee(&self, id: u64) -> StoreFuture<'_, bool> {
        let mut employees = self.employees.write().expect("employee map poisoned");
        done(employees.remove(&id).is_some())
    }
}

impl SalaryStore for MemoryStore {
    fn get_salary(
        &self,
        employee_id: u64,
        period_key: String,
    ) -> StoreFuture<'_, Option<SalaryRecord>> {
        let salaries = self.salaries.read().expect("salary map poisoned");
        done(salaries.get(&(employee_id, period_key)).cloned())
    }

    fn put_salary(&self, record: SalaryRecord) -> StoreFuture<'_, ()> {
        self.salaries
            .write()
            .expect("salary map poisoned")
            .insert((record.employee_id, record.period_key.clone()), record);
        done(())
    }

    fn list_salaries(&self, employee_id: u64) -> StoreFuture<'_, Vec<SalaryRecord>> {
        let salaries = self.salaries.read().expect("salary map poisoned");
        let mut records: Vec<_> = salaries
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.period_start.cmp(&a.period_start));
        done(records)
    }
}

impl PayrollStore for MemoryStore {
    fn create_payroll(&self, mut payroll: Payroll) -> StoreFuture<'_, Payroll> {
        let mut payrolls = self.payrolls.write().expect("payroll map poisoned");
        payroll.id = next_id(&payrolls);
        payrolls.insert(payroll.id, payroll.clone());
        done(payroll)
    }

    fn update_payroll(&self, payroll: Payroll) -> StoreFuture<'_, bool> {
        let mut payrolls = self.payrolls.write().expect("payroll map poisoned");
        let updated = match payrolls.get_mut(&payroll.id) {
            Some(current) => {
                *current = payroll;
                true
            }
            None => false,
        };
        done(updated)
    }

    fn get_payroll(&self, id: u64) -> StoreFuture<'_, Option<Payroll>> {
        let payrolls = self.payrolls.read().expect("payroll map poisoned");
        done(payrolls.get(&id).cloned())
    }

    fn list_payrolls(
        &self,
        page: Page,
        employee_id: Option<u64>,
    ) -> StoreFuture<'_, (Vec<Payroll>, i64)> {
        let payrolls = self.payrolls.read().expect("payroll map poisoned");
        let mut matching: Vec<_> = payrolls
            .values()
            .filter(|p| employee_id.is_none_or(|id| p.employee_id == id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.month.cmp(&a.month));

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(skip_count(page))
            .take(page.per_page as usize)
            .collect();
        done((data, total))
    }

    fn find_payroll_for_month(
        &self,
        employee_id: u64,
        month: NaiveDate,
    ) -> StoreFuture<'_, Option<Payroll>> {
        let payrolls = self.payrolls.read().expect("payroll map poisoned");
        done(
            payrolls
                .values()
                .find(|p| p.employee_id == employee_id && p.month == month)
                .cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        attendance::{AttendanceEntry, AttendanceStatus},
        employee::{self, SalaryInterval},
    };

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[actix_web::test]
    async fn put_day_overwrites_previous_save() {
        let store = MemoryStore::new();
        let present = AttendanceEntry { employee_id: 1, status: AttendanceStatus::Present };
        let absent = AttendanceEntry { employee_id: 1, status: AttendanceStatus::Absent };

        store.put_day(AttendanceDay::new(date(5), vec![present])).await.unwrap();
        store.put_day(AttendanceDay::new(date(5), vec![absent.clone()])).await.unwrap();

        let day = store.get_day(date(5)).await.unwrap().unwrap();
        assert_eq!(day.entries, vec![absent]);
    }

    #[actix_web::test]
    async fn get_range_returns_only_saved_days_inside_range() {
        let store = MemoryStore::new();
        for d in [3, 5, 9] {
            store.put_day(AttendanceDay::new(date(d), vec![])).await.unwrap();
        }

        let days = store.get_range(DateRange::new(date(4), date(9))).await.unwrap();
        assert_eq!(days.keys().copied().collect::<Vec<_>>(), vec![date(5), date(9)]);

        let none = store.get_range(DateRange::new(date(9), date(4))).await.unwrap();
        assert!(none.is_empty());
    }

    #[actix_web::test]
    async fn employees_get_sequential_ids() {
        let store = MemoryStore::new();
        let first = store
            .create_employee(employee::sample(0, 10.0, SalaryInterval::Daily))
            .await
            .unwrap();
        let second = store
            .create_employee(employee::sample(0, 10.0, SalaryInterval::Daily))
            .await
            .unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert!(store.delete_employee(1).await.unwrap());
        assert!(!store.delete_employee(1).await.unwrap());
        assert_eq!(store.list_employees().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn payroll_listing_pages_newest_first() {
        let store = MemoryStore::new();
        for (employee_id, month) in [(1, 1), (1, 3), (2, 2), (1, 2)] {
            store
                .create_payroll(Payroll {
                    id: 0,
                    employee_id,
                    month: NaiveDate::from_ymd_opt(2026, month, 1).unwrap(),
                    base_salary: 100.0,
                    bonus: 0.0,
                    deductions: 0.0,
                    net_salary: 100.0,
                })
                .await
                .unwrap();
        }

        let (page, total) = store
            .list_payrolls(Page { page: 1, per_page: 2 }, Some(1))
            .await
            .unwrap();
        assert_eq!(total, 3);
        let months: Vec<_> = page.iter().map(|p| p.month).collect();
        assert_eq!(
            months,
            vec![
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
            ]
        );

        let found = store
            .find_payroll_for_month(2, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.employee_id), Some(2));
    }
}
