//! Notification feed HTTP handlers for the acting user.
//!
//! ```text
//! GET  /api/v1/notifications
//! POST /api/v1/notifications/{id}/read
//! POST /api/v1/notifications/read-all
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::inbound::http::actor::ActingUser;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::schemas::{ErrorSchema, NotificationSchema, WriteTicketSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_document_id};
use crate::inbound::http::{ApiResult, accepted};

/// List the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notifications, newest first", body = [NotificationSchema]),
        (status = 401, description = "Missing acting user", body = ErrorSchema),
        (status = 403, description = "Forbidden by store rules", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    actor: ActingUser,
) -> ApiResult<HttpResponse> {
    let notifications = state.notifications_query.list(actor.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(notifications))
}

/// Mark one notification as read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Notification id")
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{id}/read")]
pub async fn mark_as_read(
    state: web::Data<HttpState>,
    actor: ActingUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(path.into_inner(), FieldName::new("notificationId"))?;
    let ticket = state
        .notifications
        .mark_as_read(actor.into_inner(), id)
        .await?;
    Ok(accepted(ticket))
}

/// Mark every unread notification as read in one batch.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema),
        (status = 403, description = "Forbidden by store rules", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[post("/notifications/read-all")]
pub async fn mark_all_as_read(
    state: web::Data<HttpState>,
    actor: ActingUser,
) -> ApiResult<HttpResponse> {
    let ticket = state
        .notifications
        .mark_all_as_read(actor.into_inner())
        .await?;
    Ok(accepted(ticket))
}
