use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::presentation::routes::LOGIN_PATH;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("Post id {0} doesn't exist.")]
    NotFound(i64),

    #[error("Forbidden")]
    Forbidden,

    #[error("Login required")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("User {0} is already registered.")]
    UserAlreadyExists(String),

    #[error("Incorrect username.")]
    InvalidUsername,

    #[error("Incorrect password.")]
    InvalidPassword,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl BlogError {
    /// Errors a form handler recovers from by flashing the message and
    /// redisplaying the form.
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UserAlreadyExists(_)
                | Self::InvalidUsername
                | Self::InvalidPassword
        )
    }
}

impl From<sqlx::Error> for BlogError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl ResponseError for BlogError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unauthenticated => StatusCode::SEE_OTHER,
            Self::Validation(_) | Self::InvalidUsername | Self::InvalidPassword => {
                StatusCode::BAD_REQUEST
            }
            Self::UserAlreadyExists(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Unauthenticated => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, LOGIN_PATH))
                .finish(),
            Self::Forbidden => HttpResponse::Forbidden().finish(),
            Self::Database(detail) | Self::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                HttpResponse::InternalServerError().body("Internal server error")
            }
            other => HttpResponse::build(other.status_code()).body(other.to_string()),
        }
    }
}
