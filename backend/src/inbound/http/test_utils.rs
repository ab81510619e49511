//! Test helpers for inbound HTTP components.

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};

use super::actor::ACTING_USER_HEADER;
use super::state::HttpState;
use super::{configure, validation::json_config};
use crate::Trace;

/// Acting user sent by [`as_user`].
pub const NURSE: &str = "nurse-1";

/// Build the `/api/v1` application around `state`, wrapped in the trace
/// middleware the server uses.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure))
}

/// Attach the [`NURSE`] acting-user header.
pub fn as_user(request: test::TestRequest) -> test::TestRequest {
    request.insert_header((ACTING_USER_HEADER, NURSE))
}
