use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sup_core::ValidationError;
use thiserror::Error;
use tracing::error;

pub const BASIC_REALM: &str = r#"Basic realm="Users""#;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed query string")]
    MalformedQuery,

    #[error("Incorrect field value: {0}")]
    IncorrectValue(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(ValidationError::NoBody | ValidationError::Malformed)
            | AppError::MalformedQuery => StatusCode::BAD_REQUEST,
            AppError::Validation(_) | AppError::IncorrectValue(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::UserNotFound | AppError::MessageNotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Store(_) | AppError::Hash(_) | AppError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // i dettagli interni finiscono solo nei log
        let message = if status.is_server_error() {
            error!("request failed: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, Json(sup_core::Error::new(message))).into_response();
        if let AppError::Unauthorized = self {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_REALM));
        }
        response
    }
}
