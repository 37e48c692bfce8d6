use std::fmt::Debug;

use hmac::{Hmac, Mac};
use log::*;
use rand::RngCore;
use sha2::Sha256;

use crate::{
    db_types::User,
    traits::{AuthApiError, AuthManagement},
};

const SALT_LEN: usize = 16;

/// `AuthApi` registers users and verifies login/password pairs.
///
/// Password hashes are salted HMAC-SHA256, stored as `hex(salt)$hex(mac)`. Session token issuance
/// is the server's concern; this API only answers "who is this user".
pub struct AuthApi<B> {
    db: B,
}

impl<B> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi")
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Creates a new user account. Fails with [`AuthApiError::LoginTaken`] on a duplicate login.
    pub async fn register_user(&self, login: &str, password: &str) -> Result<User, AuthApiError> {
        let hash = hash_password(password);
        let user = self.db.create_user(login, &hash).await?;
        info!("🔐️ New user '{login}' registered with id {}", user.id);
        Ok(user)
    }

    /// Verifies the login/password pair. Unknown logins and wrong passwords are indistinguishable
    /// to the caller.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<User, AuthApiError> {
        let user = self.db.fetch_user_by_login(login).await?.ok_or(AuthApiError::BadCredentials)?;
        if verify_password(password, &user.password_hash) {
            Ok(user)
        } else {
            debug!("🔐️ Failed login attempt for '{login}'");
            Err(AuthApiError::BadCredentials)
        }
    }
}

fn hmac_hex(salt: &[u8], password: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail
    let mut mac = Hmac::<Sha256>::new_from_slice(salt).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", hex::encode(salt), hmac_hex(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, mac_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    // Constant-time comparison via the Mac verifier
    let mut mac = Hmac::<Sha256>::new_from_slice(&salt).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    let Ok(expected) = hex::decode(mac_hex) else {
        return false;
    };
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod test {
    use super::{hash_password, verify_password};

    #[test]
    fn round_trip() {
        let hash = hash_password("correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("correct horse battery stable", &hash));
    }

    #[test]
    fn salts_are_unique() {
        assert_ne!(hash_password("pw"), hash_password("pw"));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "no-dollar-sign"));
        assert!(!verify_password("pw", "zzzz$not-hex"));
    }
}
