use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AccrualError {
    #[error("A mechanic for the pattern '{0}' is already registered")]
    DuplicateMatch(String),
    #[error("The order number '{0}' is not a valid Luhn number")]
    InvalidOrderNumber(String),
}

impl ResponseError for AccrualError {
    fn status_code(&self) -> StatusCode {
        match self {
            AccrualError::DuplicateMatch(_) => StatusCode::CONFLICT,
            AccrualError::InvalidOrderNumber(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}
