//! HTTP inbound adapter exposing REST endpoints.
//!
//! Writes are optimistic: handlers validate the request, start the write and
//! answer `202 Accepted` with the target path. A write later rejected by the
//! store is reported on the error event bus, never in the HTTP response.

use actix_web::{HttpResponse, web};

use crate::domain::ports::WriteTicket;

pub mod actor;
pub mod cache_control;
pub mod care_entries;
pub mod error;
pub mod health;
pub mod notifications;
pub mod patients;
pub mod reports;
pub mod roles;
pub mod schemas;
pub mod staff;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use carehub::inbound::http::{configure, state::HttpState};
///
/// let _app = App::new()
///     .app_data(web::Data::new(HttpState::default()))
///     .service(web::scope("/api/v1").configure(configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(patients::register_patient)
        .service(patients::list_patients)
        .service(patients::get_patient)
        .service(patients::update_patient)
        .service(patients::remove_patient)
        .service(reports::generate_report)
        .service(care_entries::log_entry)
        .service(care_entries::list_entries)
        .service(staff::register_staff)
        .service(staff::list_staff)
        .service(staff::update_staff)
        .service(staff::remove_staff)
        .service(notifications::list_notifications)
        .service(notifications::mark_all_as_read)
        .service(notifications::mark_as_read)
        .service(roles::current_role);
}

pub(crate) fn accepted(ticket: WriteTicket) -> HttpResponse {
    HttpResponse::Accepted().json(ticket)
}
