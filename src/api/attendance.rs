use std::collections::HashSet;

use crate::{
    auth::auth::AuthUser,
    calc::attendance::{self, AttendanceSummary, DaySheet},
    error::AppError,
    model::attendance::{AttendanceDay, AttendanceEntry},
    store::Stores,
    utils::period::DateRange,
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct SaveAttendance {
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RangeQuery {
    /// first day, inclusive
    #[param(value_type = String, example = "2026-01-01")]
    pub start: NaiveDate,
    /// last day, inclusive
    #[param(value_type = String, example = "2026-01-31")]
    pub end: NaiveDate,
    /// limit to one employee; required for employee-role callers
    pub employee_id: Option<u64>,
}

/// Longest range a single request may summarize.
pub const MAX_RANGE_DAYS: u32 = 366;

/// Range from query parameters; a reversed or over-long range is a client
/// error here.
pub fn checked_range(start: NaiveDate, end: NaiveDate) -> Result<DateRange, AppError> {
    if end < start {
        return Err(AppError::BadRequest("end is before start".into()));
    }
    let range = DateRange::new(start, end);
    if range.calendar_days() > MAX_RANGE_DAYS {
        return Err(AppError::BadRequest(format!(
            "range spans {} days; at most {MAX_RANGE_DAYS} allowed",
            range.calendar_days()
        )));
    }
    Ok(range)
}

/// Attendance sheet for one date
#[utoipa::path(
    get,
    path = "/api/attendance/{date}",
    params(
        ("date" = String, Path, description = "Calendar date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Every roster employee with their status; Absent where nothing was saved", body = DaySheet),
        (status = 403, description = "HR/Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_day_sheet(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let date = path.into_inner();

    let roster = stores.roster.list_employees().await?;
    let days = stores.attendance.get_range(DateRange::single(date)).await?;

    Ok(HttpResponse::Ok().json(attendance::roster_day(&roster, date, &days)))
}

/// Save attendance for one date, replacing anything saved before
#[utoipa::path(
    put,
    path = "/api/attendance/{date}",
    params(
        ("date" = String, Path, description = "Calendar date, YYYY-MM-DD")
    ),
    request_body = SaveAttendance,
    responses(
        (status = 200, description = "Attendance saved", body = AttendanceDay),
        (status = 400, description = "Duplicate or unknown employee"),
        (status = 403, description = "HR/Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn save_day(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<NaiveDate>,
    payload: web::Json<SaveAttendance>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;

    let day = AttendanceDay::new(path.into_inner(), payload.into_inner().entries);

    if let Some(employee_id) = day.duplicate_employee() {
        return Err(AppError::BadRequest(format!(
            "employee {employee_id} listed more than once"
        )));
    }

    let known: HashSet<u64> = stores
        .roster
        .list_employees()
        .await?
        .into_iter()
        .map(|e| e.id)
        .collect();
    if let Some(unknown) = day.entries.iter().find(|e| !known.contains(&e.employee_id)) {
        warn!(
            employee_id = unknown.employee_id,
            date = %day.date,
            "Attendance for unknown employee"
        );
        return Err(AppError::BadRequest(format!(
            "employee {} does not exist",
            unknown.employee_id
        )));
    }

    stores.attendance.put_day(day.clone()).await?;
    info!(date = %day.date, entries = day.entries.len(), by = auth.user_id, "Attendance saved");

    Ok(HttpResponse::Ok().json(day))
}

/// Present/absent counts over a date range
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(RangeQuery),
    responses(
        (status = 200, description = "One summary per employee in range", body = [AttendanceSummary]),
        (status = 400, description = "end is before start, or range longer than 366 days"),
        (status = 403, description = "Not allowed to view this employee")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    auth: AuthUser,
    stores: web::Data<Stores>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, AppError> {
    let range = checked_range(query.start, query.end)?;

    let summaries: Vec<AttendanceSummary> = match query.employee_id {
        Some(employee_id) => {
            auth.require_self_or_staff(employee_id)?;
            let days = stores.attendance.get_range(range).await?;
            vec![attendance::summarize(employee_id, range, &days)]
        }
        None => {
            auth.require_hr_or_admin()?;
            let roster = stores.roster.list_employees().await?;
            let days = stores.attendance.get_range(range).await?;
            attendance::summarize_roster(&roster, range, &days)
        }
    };

    Ok(HttpResponse::Ok().json(summaries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            attendance::AttendanceStatus,
            employee::{self, SalaryInterval},
            role::Role,
        },
        store::MemoryStore,
        test_support::{bearer, test_app},
    };
    use actix_web::{http::StatusCode, test};
    use serde_json::json;

    async fn stores_with_roster(n: u64) -> Stores {
        let stores = Stores::memory(MemoryStore::new());
        for id in 1..=n {
            stores
                .roster
                .create_employee(employee::sample(id, 500.0, SalaryInterval::Daily))
                .await
                .unwrap();
        }
        stores
    }

    #[actix_web::test]
    async fn saved_day_shows_on_sheet_and_resave_replaces_it() {
        let stores = stores_with_roster(2).await;
        let app = test::init_service(test_app(stores.clone())).await;
        let token = bearer(Role::Hr, None);

        for status in ["Present", "Absent"] {
            let req = test::TestRequest::put()
                .uri("/api/attendance/2026-01-05")
                .insert_header(("Authorization", token.clone()))
                .set_json(json!({ "entries": [{ "employee_id": 1, "status": status }] }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = test::TestRequest::get()
            .uri("/api/attendance/2026-01-05")
            .insert_header(("Authorization", token))
            .to_request();
        let sheet: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(sheet["recorded"], true);
        assert_eq!(sheet["lines"][0]["status"], "Absent");
        assert_eq!(sheet["lines"][1]["status"], "Absent");

        let day = stores
            .attendance
            .get_day(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(day.entries.len(), 1);
        assert_eq!(day.status_of(1), Some(AttendanceStatus::Absent));
    }

    #[actix_web::test]
    async fn rejects_unknown_and_duplicate_employees() {
        let app = test::init_service(test_app(stores_with_roster(1).await)).await;
        let token = bearer(Role::Admin, None);

        let req = test::TestRequest::put()
            .uri("/api/attendance/2026-01-05")
            .insert_header(("Authorization", token.clone()))
            .set_json(json!({ "entries": [{ "employee_id": 9, "status": "Present" }] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/api/attendance/2026-01-05")
            .insert_header(("Authorization", token))
            .set_json(json!({ "entries": [
                { "employee_id": 1, "status": "Present" },
                { "employee_id": 1, "status": "Absent" }
            ] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn summary_counts_recorded_days_only() {
        let stores = stores_with_roster(2).await;
        for (d, status) in [(5, AttendanceStatus::Present), (6, AttendanceStatus::Absent)] {
            let date = NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
            stores
                .attendance
                .put_day(AttendanceDay::new(date, vec![AttendanceEntry { employee_id: 1, status }]))
                .await
                .unwrap();
        }
        let app = test::init_service(test_app(stores)).await;

        let req = test::TestRequest::get()
            .uri("/api/attendance/summary?start=2026-01-04&end=2026-01-07")
            .insert_header(("Authorization", bearer(Role::Hr, None)))
            .to_request();
        let summaries: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(summaries.as_array().unwrap().len(), 2);
        assert_eq!(summaries[0]["present_count"], 1);
        assert_eq!(summaries[0]["absent_count"], 1);
        assert_eq!(summaries[0]["total_working_days"], 2);
        assert_eq!(summaries[0]["unrecorded_days"], 2);
        // employee 2 is on neither saved day
        assert_eq!(summaries[1]["absent_count"], 2);
    }

    #[actix_web::test]
    async fn employee_sees_only_own_summary() {
        let app = test::init_service(test_app(stores_with_roster(2).await)).await;
        let token = bearer(Role::Employee, Some(2));

        let req = test::TestRequest::get()
            .uri("/api/attendance/summary?start=2026-01-01&end=2026-01-31&employee_id=2")
            .insert_header(("Authorization", token.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/attendance/summary?start=2026-01-01&end=2026-01-31&employee_id=1")
            .insert_header(("Authorization", token.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/attendance/summary?start=2026-01-01&end=2026-01-31")
            .insert_header(("Authorization", token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn reversed_range_is_bad_request() {
        let app = test::init_service(test_app(stores_with_roster(1).await)).await;

        let req = test::TestRequest::get()
            .uri("/api/attendance/summary?start=2026-01-31&end=2026-01-01&employee_id=1")
            .insert_header(("Authorization", bearer(Role::Hr, None)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn range_longer_than_a_year_is_bad_request() {
        let app = test::init_service(test_app(stores_with_roster(5).await)).await;
        let token = bearer(Role::Hr, None);

        let req = test::TestRequest::get()
            .uri("/api/attendance/summary?start=1900-01-01&end=2099-12-31")
            .insert_header(("Authorization", token.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        // a leap year is exactly at the limit
        let req = test::TestRequest::get()
            .uri("/api/attendance/summary?start=2028-01-01&end=2028-12-31")
            .insert_header(("Authorization", token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[::core::prelude::v1::test]
    fn checked_range_bounds() {
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert!(checked_range(day(2026, 1, 1), day(2026, 1, 1)).is_ok());
        assert!(checked_range(day(2026, 1, 2), day(2026, 1, 1)).is_err());
        assert!(checked_range(day(2026, 1, 1), day(2027, 1, 1)).is_ok());
        assert!(checked_range(day(2026, 1, 1), day(2027, 1, 2)).is_err());
        assert!(checked_range(day(1, 1, 1), day(9999, 12, 31)).is_err());
    }
}
