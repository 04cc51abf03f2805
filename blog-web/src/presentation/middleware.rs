use crate::application::AuthService;
use crate::domain::{BlogError, CurrentUser};
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::header::Header;
use actix_web::middleware::Next;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use std::future::{ready, Ready};
use std::sync::Arc;

/// Cookie holding the session token issued at login.
pub const SESSION_COOKIE: &str = "session";

fn session_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.request().cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    Authorization::<Bearer>::parse(req)
        .ok()
        .map(|auth| auth.into_scheme().token().to_string())
}

/// Resolves the session token, if any, into a [`CurrentUser`] stored in the
/// request extensions. Missing or invalid tokens, and tokens for users that
/// are no longer registered, leave the request anonymous.
pub async fn load_logged_in_user<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error> {
    if let Some(token) = session_token(&req) {
        let user = match req.app_data::<web::Data<Arc<AuthService>>>() {
            Some(auth_service) => auth_service.current_user(&token).await?,
            None => {
                tracing::error!("Auth service not configured");
                None
            }
        };

        if let Some(user) = user {
            req.extensions_mut().insert(user);
        }
    }

    next.call(req).await
}

/// Gate for routes that need a logged-in user: anonymous requests are
/// redirected to the login page without reaching the handler.
pub async fn login_required<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let logged_in = req.extensions().contains::<CurrentUser>();

    if !logged_in {
        tracing::debug!("Login required for {} {}", req.method(), req.path());
        let response = BlogError::Unauthenticated.error_response();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

impl FromRequest for CurrentUser {
    type Error = BlogError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or(BlogError::Unauthenticated),
        )
    }
}
