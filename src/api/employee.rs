use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::employee::{Employee, SalaryInterval},
    store::{EmployeeFilter, Page, Stores},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-001", value_type = String)]
    pub employee_code: String,
    #[schema(example = "first name", value_type = String)]
    pub first_name: String,
    #[schema(example = "last name", value_type = String)]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = "Warehouse")]
    pub role: String,
    #[schema(example = 25000.0)]
    pub salary: f64,
    pub salary_interval: SalaryInterval,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    /// matches first name, last name or email
    pub search: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 5)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub employee_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub salary: Option<f64>,
    pub salary_interval: Option<SalaryInterval>,
    pub status: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: Option<NaiveDate>,
}

impl UpdateEmployee {
    fn apply(self, employee: &mut Employee) {
        if let Some(v) = self.employee_code {
            employee.employee_code = v;
        }
        if let Some(v) = self.first_name {
            employee.first_name = v;
        }
        if let Some(v) = self.last_name {
            employee.last_name = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.phone {
            employee.phone = Some(v);
        }
        if let Some(v) = self.role {
            employee.role = v;
        }
        if let Some(v) = self.salary {
            employee.salary = v;
        }
        if let Some(v) = self.salary_interval {
            employee.salary_interval = v;
        }
        if let Some(v) = self.status {
            employee.status = v;
        }
        if let Some(v) = self.hire_date {
            employee.hire_date = v;
        }
    }
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid employee fields"),
        (status = 403, description = "HR/Admin only")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    stores: web::Data<Stores>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;

    let payload = payload.into_inner();
    let employee = Employee {
        id: 0,
        employee_code: payload.employee_code,
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone: payload.phone,
        role: payload.role,
        salary: payload.salary,
        salary_interval: payload.salary_interval,
        hire_date: payload.hire_date,
        status: "active".to_string(),
    };
    employee.validate().map_err(AppError::BadRequest)?;

    let employee = stores.roster.create_employee(employee).await?;
    info!(employee_id = employee.id, by = auth.user_id, "Employee created");

    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    stores: web::Data<Stores>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let query = query.into_inner();
    let filter = EmployeeFilter {
        status: query.status,
        search: query.search,
    };
    debug!(filter = ?filter, page, per_page, "Listing employees");

    let (data, total) = stores
        .roster
        .search_employees(filter, Page { page, per_page })
        .await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Invalid employee fields"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let mut employee = stores
        .roster
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

    body.into_inner().apply(&mut employee);
    employee.validate().map_err(AppError::BadRequest)?;

    if !stores.roster.update_employee(employee.clone()).await? {
        return Err(AppError::NotFound("Employee not found".into()));
    }

    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    if !stores.roster.delete_employee(employee_id).await? {
        return Err(AppError::NotFound("Employee not found".into()));
    }

    info!(employee_id, by = auth.user_id, "Employee removed");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    auth.require_self_or_staff(employee_id)?;

    match stores.roster.get_employee(employee_id).await? {
        Some(employee) => Ok(HttpResponse::Ok().json(employee)),
        None => Err(AppError::NotFound("Employee not found".into())),
    }
}
