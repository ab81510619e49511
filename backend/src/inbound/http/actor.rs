//! Acting-user extraction.
//!
//! The upstream authentication proxy verifies the caller and forwards the
//! user id in [`ACTING_USER_HEADER`]. Handlers never look at the header
//! directly; they take an [`ActingUser`] (authentication required) or an
//! [`OptionalActingUser`] (anonymous callers allowed).

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

/// Header carrying the authenticated user id.
pub const ACTING_USER_HEADER: &str = "x-user-id";

/// Authenticated caller. Extraction fails with `401 Unauthorized` when the
/// header is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser(UserId);

impl ActingUser {
    /// Borrow the user id.
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    /// Consume the extractor, yielding the user id.
    pub fn into_inner(self) -> UserId {
        self.0
    }
}

/// Caller that may be anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalActingUser(Option<UserId>);

impl OptionalActingUser {
    /// Consume the extractor, yielding the user id if one was supplied.
    pub fn into_inner(self) -> Option<UserId> {
        self.0
    }
}

fn acting_user(req: &HttpRequest) -> Option<UserId> {
    let raw = req.headers().get(ACTING_USER_HEADER)?;
    let Ok(raw) = raw.to_str() else {
        warn!("acting user header is not valid ASCII");
        return None;
    };
    match UserId::new(raw) {
        Ok(id) => Some(id),
        Err(error) => {
            warn!(%error, "invalid acting user header");
            None
        }
    }
}

impl FromRequest for ActingUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            acting_user(req)
                .map(Self)
                .ok_or_else(|| Error::unauthorized("authentication required")),
        )
    }
}

impl FromRequest for OptionalActingUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(acting_user(req))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    async fn echo(user: ActingUser) -> HttpResponse {
        HttpResponse::Ok().body(user.into_inner().to_string())
    }

    async fn echo_optional(user: OptionalActingUser) -> HttpResponse {
        let body = user
            .into_inner()
            .map_or_else(|| "anonymous".to_owned(), |id| id.to_string());
        HttpResponse::Ok().body(body)
    }

    #[actix_web::test]
    async fn extracts_user_from_header() {
        let app = test::init_service(App::new().route("/", web::get().to(echo))).await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((ACTING_USER_HEADER, "nurse-7"))
            .to_request();

        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "nurse-7");
    }

    #[rstest]
    #[case::missing(None)]
    #[case::blank(Some(""))]
    #[case::slash(Some("a/b"))]
    #[actix_web::test]
    async fn missing_or_invalid_user_is_unauthorised(#[case] header: Option<&str>) {
        let app = test::init_service(App::new().route("/", web::get().to(echo))).await;
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = header {
            req = req.insert_header((ACTING_USER_HEADER, value));
        }

        let res = test::call_service(&app, req.to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn optional_user_allows_anonymous_callers() {
        let app = test::init_service(App::new().route("/", web::get().to(echo_optional))).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "anonymous");
    }
}
