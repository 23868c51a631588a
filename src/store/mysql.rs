use std::{collections::BTreeMap, str::FromStr};

use chrono::NaiveDate;
use futures_util::TryStreamExt;
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use super::{
    AttendanceStore, EmployeeFilter, EmployeeRoster, Page, PayrollStore, SalaryStore, StoreError,
    StoreFuture,
};
use crate::{
    model::{
        attendance::{AttendanceDay, AttendanceEntry, AttendanceStatus},
        employee::{Employee, SalaryInterval},
        payroll::Payroll,
        salary_record::SalaryRecord,
    },
    utils::period::DateRange,
};

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

// ---------- rows as stored, validated into models ----------

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    employee_code: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    role: String,
    salary: f64,
    salary_interval: String,
    hire_date: NaiveDate,
    status: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let salary_interval = SalaryInterval::from_str(&row.salary_interval).map_err(|_| {
            StoreError::InvalidRecord(format!(
                "employee {}: unknown salary_interval {:?}",
                row.id, row.salary_interval
            ))
        })?;

        let employee = Employee {
            id: row.id,
            employee_code: row.employee_code,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            role: row.role,
            salary: row.salary,
            salary_interval,
            hire_date: row.hire_date,
            status: row.status,
        };

        employee
            .validate()
            .map_err(|e| StoreError::InvalidRecord(format!("employee {}: {e}", employee.id)))?;

        Ok(employee)
    }
}

#[derive(FromRow)]
struct EntryRow {
    date: NaiveDate,
    employee_id: u64,
    status: String,
}

fn parse_status(row: &EntryRow) -> Result<AttendanceStatus, StoreError> {
    AttendanceStatus::from_str(&row.status).map_err(|_| {
        StoreError::InvalidRecord(format!(
            "attendance {} employee {}: unknown status {:?}",
            row.date, row.employee_id, row.status
        ))
    })
}

#[derive(FromRow)]
struct SalaryRow {
    employee_id: u64,
    period_key: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
    present_count: u32,
    absent_count: u32,
    total_working_days: u32,
    computed_salary: f64,
    paid: bool,
    paid_date: Option<NaiveDate>,
    computed_on: NaiveDate,
}

impl From<SalaryRow> for SalaryRecord {
    fn from(row: SalaryRow) -> Self {
        Self {
            employee_id: row.employee_id,
            period_key: row.period_key,
            period_start: row.period_start,
            period_end: row.period_end,
            present_count: row.present_count,
            absent_count: row.absent_count,
            total_working_days: row.total_working_days,
            computed_salary: row.computed_salary,
            paid: row.paid,
            paid_date: row.paid_date,
            computed_on: row.computed_on,
        }
    }
}

#[derive(FromRow)]
struct PayrollRow {
    id: u64,
    employee_id: u64,
    month: NaiveDate,
    base_salary: f64,
    bonus: f64,
    deductions: f64,
    net_salary: f64,
}

impl From<PayrollRow> for Payroll {
    fn from(row: PayrollRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            month: row.month,
            base_salary: row.base_salary,
            bonus: row.bonus,
            deductions: row.deductions,
            net_salary: row.net_salary,
        }
    }
}

/// Escapes `LIKE` wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const EMPLOYEE_COLUMNS: &str = "id, employee_code, first_name, last_name, email, phone, role, \
     salary, salary_interval, hire_date, status";

const SALARY_COLUMNS: &str = "employee_id, period_key, period_start, period_end, present_count, \
     absent_count, total_working_days, computed_salary, paid, paid_date, computed_on";

const PAYROLL_COLUMNS: &str =
    "id, employee_id, month, base_salary, bonus, deductions, net_salary";

// ---------- attendance ----------

impl AttendanceStore for MySqlStore {
    fn get_day(&self, date: NaiveDate) -> StoreFuture<'_, Option<AttendanceDay>> {
        Box::pin(async move {
            let mut days = self.get_range(DateRange::single(date)).await?;
            Ok(days.remove(&date))
        })
    }

    fn get_range(&self, range: DateRange) -> StoreFuture<'_, BTreeMap<NaiveDate, AttendanceDay>> {
        Box::pin(async move {
            let mut days = BTreeMap::new();
            if range.is_empty() {
                return Ok(days);
            }

            let saved = sqlx::query_scalar::<_, NaiveDate>(
                "SELECT date FROM attendance_days WHERE date BETWEEN ? AND ?",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?;

            for date in saved {
                days.insert(date, AttendanceDay::new(date, Vec::new()));
            }

            let mut rows = sqlx::query_as::<_, EntryRow>(
                r#"
                SELECT date, employee_id, status
                FROM attendance_entries
                WHERE date BETWEEN ? AND ?
                ORDER BY date, employee_id
                "#,
            )
            .bind(range.start)
            .bind(range.end)
            .fetch(&self.pool);

            while let Some(row) = rows.try_next().await? {
                let status = parse_status(&row)?;
                // entries without a parent day row are orphans of a failed save
                if let Some(day) = days.get_mut(&row.date) {
                    day.entries.push(AttendanceEntry { employee_id: row.employee_id, status });
                }
            }

            debug!(
                start = %range.start,
                end = %range.end,
                days = days.len(),
                "Fetched attendance range"
            );
            Ok(days)
        })
    }

    fn put_day(&self, day: AttendanceDay) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                r#"
                INSERT INTO attendance_days (date, saved_at)
                VALUES (?, NOW())
                ON DUPLICATE KEY UPDATE saved_at = NOW()
                "#,
            )
            .bind(day.date)
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM attendance_entries WHERE date = ?")
                .bind(day.date)
                .execute(&mut *tx)
                .await?;

            for entry in &day.entries {
                sqlx::query(
                    "INSERT INTO attendance_entries (date, employee_id, status) VALUES (?, ?, ?)",
                )
                .bind(day.date)
                .bind(entry.employee_id)
                .bind(entry.status.to_string())
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
            Ok(())
        })
    }
}

// ---------- employees ----------

impl EmployeeRoster for MySqlStore {
    fn list_employees(&self) -> StoreFuture<'_, Vec<Employee>> {
        Box::pin(async move {
            let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
            let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
                .fetch_all(&self.pool)
                .await?;

            rows.into_iter().map(Employee::try_from).collect()
        })
    }

    fn search_employees(
        &self,
        filter: EmployeeFilter,
        page: Page,
    ) -> StoreFuture<'_, (Vec<Employee>, i64)> {
        Box::pin(async move {
            let mut conditions = Vec::new();
            let mut bindings: Vec<String> = Vec::new();

            if let Some(status) = filter.status {
                conditions.push("status = ?");
                bindings.push(status);
            }

            if let Some(search) = &filter.search {
                conditions.push("(first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)");
                let like = format!("%{}%", escape_like(search));
                bindings.extend([like.clone(), like.clone(), like]);
            }

            let where_clause = if conditions.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", conditions.join(" AND "))
            };

            let count_sql = format!("SELECT COUNT(*) FROM employees {where_clause}");
            let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
            for b in &bindings {
                count_query = count_query.bind(b);
            }
            let total = count_query.fetch_one(&self.pool).await?;

            let data_sql = format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM employees {where_clause} ORDER BY id LIMIT ? OFFSET ?"
            );
            debug!(
                sql = %data_sql,
                bindings = ?bindings,
                page = page.page,
                per_page = page.per_page,
                "Fetching employees"
            );

            let mut data_query = sqlx::query_as::<_, EmployeeRow>(&data_sql);
            for b in &bindings {
                data_query = data_query.bind(b);
            }
            let rows = data_query
                .bind(page.per_page)
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

            let employees = rows
                .into_iter()
                .map(Employee::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((employees, total))
        })
    }

    fn get_employee(&self, id: u64) -> StoreFuture<'_, Option<Employee>> {
        Box::pin(async move {
            let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
            let row = sqlx::query_as::<_, EmployeeRow>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

            row.map(Employee::try_from).transpose()
        })
    }

    fn create_employee(&self, mut employee: Employee) -> StoreFuture<'_, Employee> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                INSERT INTO employees
                (employee_code, first_name, last_name, email, phone, role, salary, salary_interval, hire_date, status)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&employee.employee_code)
            .bind(&employee.first_name)
            .bind(&employee.last_name)
            .bind(&employee.email)
            .bind(&employee.phone)
            .bind(&employee.role)
            .bind(employee.salary)
            .bind(employee.salary_interval.to_string())
            .bind(employee.hire_date)
            .bind(&employee.status)
            .execute(&self.pool)
            .await?;

            employee.id = result.last_insert_id();
            Ok(employee)
        })
    }

    fn update_employee(&self, employee: Employee) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                UPDATE employees
                SET employee_code = ?, first_name = ?, last_name = ?, email = ?, phone = ?,
                    role = ?, salary = ?, salary_interval = ?, hire_date = ?, status = ?
                WHERE id = ?
                "#,
            )
            .bind(&employee.employee_code)
            .bind(&employee.first_name)
            .bind(&employee.last_name)
            .bind(&employee.email)
            .bind(&employee.phone)
            .bind(&employee.role)
            .bind(employee.salary)
            .bind(employee.salary_interval.to_string())
            .bind(employee.hire_date)
            .bind(&employee.status)
            .bind(employee.id)
            .execute(&self.pool)
            .await?;

            // MySQL reports 0 affected rows for an unchanged row, so check existence
            if result.rows_affected() > 0 {
                return Ok(true);
            }
            let exists =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
                    .bind(employee.id)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(exists > 0)
        })
    }

    fn delete_employee(&self, id: u64) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM employees WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }
}

// ---------- salary records ----------

impl SalaryStore for MySqlStore {
    fn get_salary(
        &self,
        employee_id: u64,
        period_key: String,
    ) -> StoreFuture<'_, Option<SalaryRecord>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {SALARY_COLUMNS} FROM salary_records WHERE employee_id = ? AND period_key = ?"
            );
            let row = sqlx::query_as::<_, SalaryRow>(&sql)
                .bind(employee_id)
                .bind(&period_key)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row.map(SalaryRecord::from))
        })
    }

    fn put_salary(&self, record: SalaryRecord) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO salary_records
                (employee_id, period_key, period_start, period_end, present_count, absent_count,
                 total_working_days, computed_salary, paid, paid_date, computed_on)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    period_start = VALUES(period_start),
                    period_end = VALUES(period_end),
                    present_count = VALUES(present_count),
                    absent_count = VALUES(absent_count),
                    total_working_days = VALUES(total_working_days),
                    computed_salary = VALUES(computed_salary),
                    paid = VALUES(paid),
                    paid_date = VALUES(paid_date),
                    computed_on = VALUES(computed_on)
                "#,
            )
            .bind(record.employee_id)
            .bind(&record.period_key)
            .bind(record.period_start)
            .bind(record.period_end)
            .bind(record.present_count)
            .bind(record.absent_count)
            .bind(record.total_working_days)
            .bind(record.computed_salary)
            .bind(record.paid)
            .bind(record.paid_date)
            .bind(record.computed_on)
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn list_salaries(&self, employee_id: u64) -> StoreFuture<'_, Vec<SalaryRecord>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {SALARY_COLUMNS} FROM salary_records WHERE employee_id = ? ORDER BY period_start DESC"
            );
            let rows = sqlx::query_as::<_, SalaryRow>(&sql)
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(SalaryRecord::from).collect())
        })
    }
}

// ---------- manual payroll ----------

impl PayrollStore for MySqlStore {
    fn create_payroll(&self, mut payroll: Payroll) -> StoreFuture<'_, Payroll> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                INSERT INTO payroll
                (employee_id, month, base_salary, bonus, deductions, net_salary)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(payroll.employee_id)
            .bind(payroll.month)
            .bind(payroll.base_salary)
            .bind(payroll.bonus)
            .bind(payroll.deductions)
            .bind(payroll.net_salary)
            .execute(&self.pool)
            .await?;

            payroll.id = result.last_insert_id();
            Ok(payroll)
        })
    }

    fn update_payroll(&self, payroll: Payroll) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                UPDATE payroll
                SET base_salary = ?, bonus = ?, deductions = ?, net_salary = ?
                WHERE id = ?
                "#,
            )
            .bind(payroll.base_salary)
            .bind(payroll.bonus)
            .bind(payroll.deductions)
            .bind(payroll.net_salary)
            .bind(payroll.id)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(true);
            }
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payroll WHERE id = ?")
                .bind(payroll.id)
                .fetch_one(&self.pool)
                .await?;
            Ok(exists > 0)
        })
    }

    fn get_payroll(&self, id: u64) -> StoreFuture<'_, Option<Payroll>> {
        Box::pin(async move {
            let sql = format!("SELECT {PAYROLL_COLUMNS} FROM payroll WHERE id = ?");
            let row = sqlx::query_as::<_, PayrollRow>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row.map(Payroll::from))
        })
    }

    fn list_payrolls(
        &self,
        page: Page,
        employee_id: Option<u64>,
    ) -> StoreFuture<'_, (Vec<Payroll>, i64)> {
        Box::pin(async move {
            let where_clause = if employee_id.is_some() { "WHERE employee_id = ?" } else { "" };

            let count_sql = format!("SELECT COUNT(*) FROM payroll {where_clause}");
            let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
            if let Some(id) = employee_id {
                count_query = count_query.bind(id);
            }
            let total = count_query.fetch_one(&self.pool).await?;

            let data_sql = format!(
                "SELECT {PAYROLL_COLUMNS} FROM payroll {where_clause} ORDER BY month DESC LIMIT ? OFFSET ?"
            );
            debug!(
                sql = %data_sql,
                page = page.page,
                per_page = page.per_page,
                "Fetching payrolls"
            );

            let mut data_query = sqlx::query_as::<_, PayrollRow>(&data_sql);
            if let Some(id) = employee_id {
                data_query = data_query.bind(id);
            }
            let rows = data_query
                .bind(page.per_page)
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

            Ok((rows.into_iter().map(Payroll::from).collect(), total))
        })
    }

    fn find_payroll_for_month(
        &self,
        employee_id: u64,
        month: NaiveDate,
    ) -> StoreFuture<'_, Option<Payroll>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {PAYROLL_COLUMNS} FROM payroll WHERE employee_id = ? AND month = ? ORDER BY id DESC LIMIT 1"
            );
            let row = sqlx::query_as::<_, PayrollRow>(&sql)
                .bind(employee_id)
                .bind(month)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row.map(Payroll::from))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("ada"), "ada");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    fn row(salary_interval: &str, salary: f64) -> EmployeeRow {
        EmployeeRow {
            id: 4,
            employee_code: "EMP-004".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@company.com".into(),
            phone: None,
            role: "Accounts".into(),
            salary,
            salary_interval: salary_interval.into(),
            hire_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            status: "active".into(),
        }
    }

    #[test]
    fn employee_rows_are_validated() {
        let employee = Employee::try_from(row("monthly", 25000.0)).unwrap();
        assert_eq!(employee.salary_interval, SalaryInterval::Monthly);

        assert!(matches!(
            Employee::try_from(row("fortnightly", 25000.0)),
            Err(StoreError::InvalidRecord(_))
        ));
        assert!(matches!(
            Employee::try_from(row("daily", -5.0)),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn unknown_attendance_status_is_rejected() {
        let entry = EntryRow {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            employee_id: 1,
            status: "Late".into(),
        };
        assert!(parse_status(&entry).is_err());

        let entry = EntryRow { status: "Present".into(), ..entry };
        assert_eq!(parse_status(&entry).unwrap(), AttendanceStatus::Present);
    }
}
