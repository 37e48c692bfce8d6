//! Session tokens.
//!
//! Login and registration hand out a signed JWT carrying the user id. Every protected endpoint
//! extracts [`JwtClaims`] from the `Authorization` header; a missing or invalid token is a 401
//! before the handler body runs.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use loyalty_engine::db_types::User;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The authenticated user's id.
    pub sub: i64,
    pub login: String,
    pub exp: i64,
}

/// Issues and validates access tokens (HS256).
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: config.token_lifetime,
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let exp = (Utc::now() + self.lifetime).timestamp();
        let claims = JwtClaims { sub: user.id, login: user.login.clone(), exp };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AuthError::TokenIssueError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("TokenIssuer is not registered on the app".to_string()))?;
    let header = req.headers().get(header::AUTHORIZATION).ok_or(ServerError::CouldNotDeserializeAuthToken)?;
    let token = header.to_str().map_err(|_| ServerError::CouldNotDeserializeAuthToken)?;
    let token = token.strip_prefix("Bearer ").unwrap_or(token);
    let claims = issuer.validate_token(token)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};
    use loyalty_engine::db_types::User;
    use lp_common::Secret;

    use super::TokenIssuer;
    use crate::config::AuthConfig;

    fn test_user() -> User {
        User { id: 42, login: "alice".to_string(), password_hash: String::default(), created_at: Utc::now() }
    }

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            jwt_secret: Secret::new(secret.to_string()),
            token_lifetime: Duration::hours(1),
        })
    }

    #[test]
    fn tokens_round_trip() {
        let issuer = issuer("test-secret-do-not-reuse");
        let token = issuer.issue_token(&test_user()).unwrap();
        let claims = issuer.validate_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.login, "alice");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = issuer("secret-a").issue_token(&test_user()).unwrap();
        assert!(issuer("secret-b").validate_token(&token).is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(issuer("secret").validate_token("not.a.jwt").is_err());
    }
}
