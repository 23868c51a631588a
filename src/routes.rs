use crate::{
    api::{attendance, employee, payroll, salary},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Per-IP limiter. Falls back to the governor defaults if the builder
// rejects the quota, which only happens for a zero period or burst.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / requests_per_min as u64;
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .configure(api),
    );
}

/// Every API resource, relative to the prefix scope.
pub fn api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employee")
            // /employee
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // /employee/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(employee::update_employee))
                    .route(web::get().to(employee::get_employee))
                    .route(web::delete().to(employee::delete_employee)),
            ),
    )
    .service(
        web::scope("/attendance")
            // /attendance/summary, ahead of /{date}
            .service(
                web::resource("/summary").route(web::get().to(attendance::attendance_summary)),
            )
            // /attendance/{date}
            .service(
                web::resource("/{date}")
                    .route(web::get().to(attendance::get_day_sheet))
                    .route(web::put().to(attendance::save_day)),
            ),
    )
    .service(
        web::scope("/salary")
            // /salary/{employee_id}
            .service(
                web::resource("/{employee_id}")
                    .route(web::get().to(salary::salary_view))
                    .route(web::post().to(salary::save_salary)),
            )
            // /salary/{employee_id}/records
            .service(
                web::resource("/{employee_id}/records")
                    .route(web::get().to(salary::salary_history)),
            )
            // /salary/{employee_id}/{period_key}/paid
            .service(
                web::resource("/{employee_id}/{period_key}/paid")
                    .route(web::put().to(salary::toggle_paid)),
            )
            // /salary/{employee_id}/{period_key}/receipt
            .service(
                web::resource("/{employee_id}/{period_key}/receipt")
                    .route(web::get().to(salary::salary_receipt)),
            ),
    )
    .service(
        web::scope("/payroll")
            // /payroll
            .service(
                web::resource("")
                    .route(web::post().to(payroll::create_payroll))
                    .route(web::get().to(payroll::list_payrolls)),
            )
            // /payroll/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(payroll::get_payroll))
                    .route(web::put().to(payroll::update_payroll)),
            ),
    );
}
