use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    calc::salary::{net_salary, round_currency},
    error::AppError,
    model::payroll::Payroll,
    store::{Page, Stores},
    utils::period::first_of_month,
};

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = 1001)]
    pub employee_id: u64,

    /// any day of the month; stored as the first of that month
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub month: NaiveDate,

    #[schema(example = 50000.0)]
    pub base_salary: f64,

    #[schema(example = 5000.0)]
    pub bonus: f64,

    #[schema(example = 2000.0)]
    pub deductions: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayroll {
    #[schema(example = 52000.0)]
    pub base_salary: Option<f64>,

    #[schema(example = 6000.0)]
    pub bonus: Option<f64>,

    #[schema(example = 2500.0)]
    pub deductions: Option<f64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<Payroll>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

fn amounts_valid(amounts: &[f64]) -> Result<(), AppError> {
    if amounts.iter().all(|a| a.is_finite() && *a >= 0.0) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "amounts must be non-negative numbers".into(),
        ))
    }
}

#[utoipa::path(
    post,
    path = "/api/payroll",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll created", body = Payroll),
        (status = 400, description = "Negative amount"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    auth: AuthUser,
    stores: web::Data<Stores>,
    payload: web::Json<CreatePayroll>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    amounts_valid(&[payload.base_salary, payload.bonus, payload.deductions])?;

    if stores.roster.get_employee(payload.employee_id).await?.is_none() {
        return Err(AppError::NotFound("Employee not found".into()));
    }

    let payroll = Payroll {
        id: 0,
        employee_id: payload.employee_id,
        month: first_of_month(payload.month),
        base_salary: payload.base_salary,
        bonus: payload.bonus,
        deductions: payload.deductions,
        net_salary: round_currency(net_salary(
            payload.base_salary,
            payload.bonus,
            payload.deductions,
        )),
    };

    let payroll = stores.payrolls.create_payroll(payroll).await?;
    info!(payroll_id = payroll.id, employee_id = payroll.employee_id, "Payroll created");

    Ok(HttpResponse::Created().json(payroll))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}",
    request_body = UpdatePayroll,
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll updated", body = Payroll),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayroll>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let payroll_id = path.into_inner();
    let mut payroll = stores
        .payrolls
        .get_payroll(payroll_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payroll record not found".into()))?;

    payroll.base_salary = body.base_salary.unwrap_or(payroll.base_salary);
    payroll.bonus = body.bonus.unwrap_or(payroll.bonus);
    payroll.deductions = body.deductions.unwrap_or(payroll.deductions);
    amounts_valid(&[payroll.base_salary, payroll.bonus, payroll.deductions])?;
    payroll.net_salary =
        round_currency(net_salary(payroll.base_salary, payroll.bonus, payroll.deductions));

    if !stores.payrolls.update_payroll(payroll.clone()).await? {
        return Err(AppError::NotFound("Payroll record not found".into()));
    }
    info!(payroll_id, net_salary = payroll.net_salary, "Payroll updated");

    Ok(HttpResponse::Ok().json(payroll))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, body = Payroll),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    match stores.payrolls.get_payroll(path.into_inner()).await? {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Err(AppError::NotFound("Payroll not found".into())),
    }
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = PaginatedPayrollResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    stores: web::Data<Stores>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let (data, total) = stores
        .payrolls
        .list_payrolls(Page { page, per_page }, query.employee_id)
        .await?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data,
        page,
        per_page,
        total,
    }))
}
