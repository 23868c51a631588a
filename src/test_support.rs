use actix_web::{
    App, Error,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::from_fn,
    web,
};

use crate::{
    auth::{jwt::generate_access_token, middleware::auth_middleware},
    config::{Config, test_config},
    model::role::Role,
    routes,
    store::Stores,
};

/// The protected API as mounted in production, minus the per-IP rate
/// limiter (test requests carry no peer address).
pub fn test_app(
    stores: Stores,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let config: Config = test_config();

    App::new()
        .app_data(web::Data::new(stores))
        .app_data(web::Data::new(config.clone()))
        .service(
            web::scope(&config.api_prefix)
                .wrap(from_fn(auth_middleware))
                .configure(routes::api),
        )
}

/// `Authorization` header value for a caller with `role`.
pub fn bearer(role: Role, employee_id: Option<u64>) -> String {
    let token = generate_access_token(
        42,
        format!("{role:?}").to_lowercase(),
        role.id(),
        employee_id,
        &test_config().jwt_secret,
        900,
    );
    format!("Bearer {token}")
}
