use crate::api::attendance::SaveAttendance;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, UpdateEmployee};
use crate::api::payroll::{CreatePayroll, PaginatedPayrollResponse, PayrollQuery, UpdatePayroll};
use crate::api::salary::SalaryView;
use crate::calc::attendance::{AttendanceSummary, DayDetail, DaySheet, SheetLine};
use crate::model::attendance::{AttendanceDay, AttendanceEntry, AttendanceStatus};
use crate::model::employee::{Employee, SalaryInterval};
use crate::model::payroll::Payroll;
use crate::model::salary_record::{SalaryReceipt, SalaryRecord};
use crate::utils::period::DateRange;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance & Payroll API",
        version = "1.0.0",
        description = r#"
## Attendance & Salary

Daily attendance sheets, present/absent summaries over any date range, and
attendance-based salary records for a small workforce.

### Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles with their salary basis
- **Attendance**
  - One sheet per date; anyone missing from a saved sheet counts as Absent
  - Range summaries with present, absent and working-day counts
- **Salary**
  - Monthly salaries prorated by attendance, daily salaries paid per present day
  - Saved salary records with a paid/pending toggle and a receipt view
- **Payroll**
  - Manually entered base salary, bonus and deductions

### Security
Every endpoint expects a **JWT Bearer** access token.
Roster, attendance entry and salary runs are limited to **Admin** and **HR**;
employees can read their own summary and salary.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::get_day_sheet,
        crate::api::attendance::save_day,
        crate::api::attendance::attendance_summary,

        crate::api::salary::salary_view,
        crate::api::salary::save_salary,
        crate::api::salary::toggle_paid,
        crate::api::salary::salary_receipt,
        crate::api::salary::salary_history,

        crate::api::payroll::create_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls
    ),
    components(
        schemas(
            CreateEmployee,
            UpdateEmployee,
            Employee,
            SalaryInterval,
            EmployeeListResponse,
            AttendanceStatus,
            AttendanceEntry,
            AttendanceDay,
            SaveAttendance,
            DateRange,
            DayDetail,
            AttendanceSummary,
            SheetLine,
            DaySheet,
            SalaryView,
            SalaryRecord,
            SalaryReceipt,
            Payroll,
            PaginatedPayrollResponse,
            CreatePayroll,
            UpdatePayroll,
            PayrollQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance sheets and summaries"),
        (name = "Salary", description = "Attendance-based salary records"),
        (name = "Payroll", description = "Manual payroll APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
