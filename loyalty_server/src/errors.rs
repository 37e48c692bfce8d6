use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use loyalty_engine::traits::{AccountApiError, AuthApiError, LedgerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Auth token invalid or not provided")]
    CouldNotDeserializeAuthToken,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The order number failed validation: {0}")]
    UnprocessableOrderNumber(String),
    #[error("The order number is already registered to another user")]
    OrderConflict,
    #[error("The login is already taken")]
    LoginTaken,
    #[error("Insufficient points balance. {0}")]
    InsufficientFunds(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializeAuthToken => StatusCode::UNAUTHORIZED,
            Self::AuthenticationError(e) => match e {
                AuthError::TokenIssueError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::BadCredentials => StatusCode::UNAUTHORIZED,
            },
            Self::UnprocessableOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OrderConflict => StatusCode::CONFLICT,
            Self::LoginTaken => StatusCode::CONFLICT,
            Self::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Could not issue an access token. {0}")]
    TokenIssueError(String),
    #[error("Invalid login or password")]
    BadCredentials,
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::LoginTaken(_) => Self::LoginTaken,
            AuthApiError::BadCredentials => Self::AuthenticationError(AuthError::BadCredentials),
            AuthApiError::DatabaseError(m) => Self::BackendError(format!("Database error: {m}")),
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InvalidOrderNumber(n) => Self::UnprocessableOrderNumber(n),
            LedgerError::NonPositiveAmount(a) => {
                Self::InvalidRequestBody(format!("Withdrawal amounts must be positive, got {a}"))
            },
            LedgerError::InsufficientFunds { .. } => Self::InsufficientFunds(e.to_string()),
            LedgerError::OrderNotFound(n) => Self::NoRecordFound(format!("Order {n}")),
            LedgerError::InvalidTransition { .. } => Self::BackendError(e.to_string()),
            LedgerError::DatabaseError(m) => Self::BackendError(format!("Database error: {m}")),
            LedgerError::AccountError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::DatabaseError(m) => Self::BackendError(format!("Database error: {m}")),
        }
    }
}
