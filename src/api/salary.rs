use crate::{
    api::attendance::checked_range,
    auth::auth::AuthUser,
    calc::{
        attendance::{self, AttendanceSummary},
        salary,
    },
    error::AppError,
    model::{
        employee::{Employee, SalaryInterval},
        salary_record::{SalaryReceipt, SalaryRecord},
    },
    store::Stores,
    utils::period::{DateRange, first_of_month},
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

/// Both salary figures for a period. The attendance-derived amount and the
/// operator-entered payroll are independent; the caller decides which to use.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SalaryView {
    pub employee_id: u64,
    pub name: String,
    pub base_salary: f64,
    pub salary_interval: SalaryInterval,
    pub period_key: String,
    pub attendance: AttendanceSummary,
    /// from attendance, rounded to cents
    pub computed_salary: f64,
    /// `net_salary` of the manual payroll for the period's month, if any
    pub manual_net_salary: Option<f64>,
    /// the saved record for this period, if any
    pub record: Option<SalaryRecord>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PeriodQuery {
    #[param(value_type = String, example = "2026-01-01")]
    pub start: NaiveDate,
    #[param(value_type = String, example = "2026-01-31")]
    pub end: NaiveDate,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn load_employee(stores: &Stores, employee_id: u64) -> Result<Employee, AppError> {
    stores
        .roster
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))
}

async fn load_record(
    stores: &Stores,
    employee_id: u64,
    period_key: String,
) -> Result<SalaryRecord, AppError> {
    // any spelling of the period maps to the key the record was saved under
    let key = DateRange::from_period_key(&period_key)
        .ok_or_else(|| AppError::BadRequest(format!("malformed period key {period_key:?}")))?
        .period_key();

    stores
        .salaries
        .get_salary(employee_id, key)
        .await?
        .ok_or_else(|| AppError::NotFound("Salary record not found".into()))
}

/// Salary for a period, computed from attendance
#[utoipa::path(
    get,
    path = "/api/salary/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, body = SalaryView),
        (status = 400, description = "end is before start, or range longer than 366 days"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn salary_view(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    auth.require_self_or_staff(employee_id)?;
    let range = checked_range(query.start, query.end)?;

    let employee = load_employee(&stores, employee_id).await?;
    let days = stores.attendance.get_range(range).await?;
    let summary = attendance::summarize(employee_id, range, &days);

    let computed_salary = salary::round_currency(salary::computed_salary(
        summary.present_count,
        summary.total_working_days,
        employee.salary,
        employee.salary_interval,
    ));

    let manual = stores
        .payrolls
        .find_payroll_for_month(employee_id, first_of_month(range.start))
        .await?;
    let record = stores
        .salaries
        .get_salary(employee_id, range.period_key())
        .await?;

    Ok(HttpResponse::Ok().json(SalaryView {
        employee_id,
        name: employee.full_name(),
        base_salary: employee.salary,
        salary_interval: employee.salary_interval,
        period_key: range.period_key(),
        attendance: summary,
        computed_salary,
        manual_net_salary: manual.map(|p| p.net_salary),
        record,
    }))
}

/// Compute and save the salary record for a period
#[utoipa::path(
    post,
    path = "/api/salary/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        PeriodQuery
    ),
    responses(
        (status = 201, description = "Record saved", body = SalaryRecord),
        (status = 400, description = "end is before start, or range longer than 366 days"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn save_salary(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();
    let range = checked_range(query.start, query.end)?;

    let employee = load_employee(&stores, employee_id).await?;
    let days = stores.attendance.get_range(range).await?;
    let summary = attendance::summarize(employee_id, range, &days);

    let mut record = salary::salary_record(&employee, &summary, today());

    // recomputing a period keeps its payment state
    if let Some(previous) = stores
        .salaries
        .get_salary(employee_id, record.period_key.clone())
        .await?
    {
        record.paid = previous.paid;
        record.paid_date = previous.paid_date;
    }

    stores.salaries.put_salary(record.clone()).await?;
    info!(
        employee_id,
        period = %record.period_key,
        salary = record.computed_salary,
        by = auth.user_id,
        "Salary record saved"
    );

    Ok(HttpResponse::Created().json(record))
}

/// Toggle a salary record between pending and paid
#[utoipa::path(
    put,
    path = "/api/salary/{employee_id}/{period_key}/paid",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("period_key", Path, description = "YYYY-MM, YYYY-MM-DD or YYYY-MM-DD_YYYY-MM-DD")
    ),
    responses(
        (status = 200, body = SalaryRecord),
        (status = 400, description = "Malformed period key"),
        (status = 404, description = "Salary record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn toggle_paid(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<(u64, String)>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let (employee_id, period_key) = path.into_inner();

    let mut record = load_record(&stores, employee_id, period_key).await?;
    record.toggle_paid(today());
    stores.salaries.put_salary(record.clone()).await?;

    info!(
        employee_id,
        period = %record.period_key,
        paid = record.paid,
        by = auth.user_id,
        "Salary payment state changed"
    );
    Ok(HttpResponse::Ok().json(record))
}

/// Flat pay slip data for printing
#[utoipa::path(
    get,
    path = "/api/salary/{employee_id}/{period_key}/receipt",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("period_key", Path, description = "YYYY-MM, YYYY-MM-DD or YYYY-MM-DD_YYYY-MM-DD")
    ),
    responses(
        (status = 200, body = SalaryReceipt),
        (status = 400, description = "Malformed period key"),
        (status = 404, description = "Salary record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn salary_receipt(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<(u64, String)>,
) -> Result<HttpResponse, AppError> {
    let (employee_id, period_key) = path.into_inner();
    auth.require_self_or_staff(employee_id)?;

    let record = load_record(&stores, employee_id, period_key).await?;
    let employee = load_employee(&stores, employee_id).await?;

    Ok(HttpResponse::Ok().json(record.receipt(employee.full_name())))
}

/// Saved salary records of one employee, newest first
#[utoipa::path(
    get,
    path = "/api/salary/{employee_id}/records",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, body = [SalaryRecord])
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn salary_history(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    auth.require_self_or_staff(employee_id)?;

    let records = stores.salaries.list_salaries(employee_id).await?;
    Ok(HttpResponse::Ok().json(records))
}
