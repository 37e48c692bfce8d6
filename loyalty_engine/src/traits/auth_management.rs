use thiserror::Error;

use crate::db_types::User;

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The login '{0}' is already taken")]
    LoginTaken(String),
    #[error("Invalid login or password")]
    BadCredentials,
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

/// Storage of user credentials.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Creates a new user record. Fails with [`AuthApiError::LoginTaken`] if the login exists.
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, AuthApiError>;

    /// Fetches a user by login, or `None` if no such user exists.
    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError>;
}
