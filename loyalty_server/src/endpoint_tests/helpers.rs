use chrono::{Duration, Utc};
use loyalty_engine::db_types::User;
use lp_common::Secret;

use crate::{auth::TokenIssuer, config::AuthConfig};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Secret::new("endpoint-test-secret-0123456789".to_string()),
        token_lifetime: Duration::hours(1),
    }
}

pub fn test_user(id: i64, login: &str) -> User {
    User { id, login: login.to_string(), password_hash: String::default(), created_at: Utc::now() }
}

pub fn issue_token(user: &User) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(user).expect("Failed to sign token")
}
