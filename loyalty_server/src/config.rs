use std::{env, time::Duration};

use chrono::Duration as ChronoDuration;
use log::*;
use lp_common::Secret;
use rand::RngCore;

use crate::{errors::ServerError, poller::PollerConfig};

const DEFAULT_LOYALTY_HOST: &str = "127.0.0.1";
const DEFAULT_LOYALTY_PORT: u16 = 8080;
const DEFAULT_ACCRUAL_URL: &str = "http://127.0.0.1:8088";
const DEFAULT_TOKEN_LIFETIME: ChronoDuration = ChronoDuration::hours(24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Base URL of the accrual service, e.g. "http://accrual.internal:8088".
    pub accrual_url: String,
    pub poller: PollerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LOYALTY_HOST.to_string(),
            port: DEFAULT_LOYALTY_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            accrual_url: DEFAULT_ACCRUAL_URL.to_string(),
            poller: PollerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("LOYALTY_HOST").ok().unwrap_or_else(|| DEFAULT_LOYALTY_HOST.into());
        let port = env::var("LOYALTY_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for LOYALTY_PORT. {e} Using the default, {DEFAULT_LOYALTY_PORT}, \
                         instead."
                    );
                    DEFAULT_LOYALTY_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_LOYALTY_PORT);
        let database_url = env::var("LOYALTY_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ LOYALTY_DATABASE_URL is not set. Please set it to the URL for the loyalty database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let accrual_url = env::var("ACCRUAL_SYSTEM_ADDRESS").ok().unwrap_or_else(|| {
            warn!("🪛️ ACCRUAL_SYSTEM_ADDRESS is not set. Using the default, {DEFAULT_ACCRUAL_URL}.");
            DEFAULT_ACCRUAL_URL.into()
        });
        let poller = poller_config_from_env();
        Self { host, port, database_url, auth, accrual_url, poller }
    }
}

fn poller_config_from_env() -> PollerConfig {
    let defaults = PollerConfig::default();
    let poll_interval = env::var("LOYALTY_POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for LOYALTY_POLL_INTERVAL_MS. {e}"))
                .ok()
        })
        .map(Duration::from_millis)
        .unwrap_or(defaults.poll_interval);
    let workers = env::var("LOYALTY_POLL_WORKERS")
        .ok()
        .and_then(|s| {
            s.parse::<usize>().map_err(|e| warn!("🪛️ Invalid configuration value for LOYALTY_POLL_WORKERS. {e}")).ok()
        })
        .unwrap_or(defaults.workers);
    let max_backoff = env::var("LOYALTY_POLL_MAX_BACKOFF_SECS")
        .ok()
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for LOYALTY_POLL_MAX_BACKOFF_SECS. {e}"))
                .ok()
        })
        .map(Duration::from_secs)
        .unwrap_or(defaults.max_backoff);
    PollerConfig { poll_interval, workers, max_backoff }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    pub token_lifetime: ChronoDuration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session, so all \
             issued tokens will be invalidated on restart. DO NOT operate on production like this. Set \
             LOYALTY_JWT_SECRET instead. 🚨️🚨️🚨️"
        );
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self { jwt_secret: Secret::new(hex::encode(secret)), token_lifetime: DEFAULT_TOKEN_LIFETIME }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let jwt_secret =
            env::var("LOYALTY_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [LOYALTY_JWT_SECRET]")))?;
        if jwt_secret.len() < 16 {
            return Err(ServerError::ConfigurationError(
                "LOYALTY_JWT_SECRET must be at least 16 characters long.".to_string(),
            ));
        }
        let token_lifetime = env::var("LOYALTY_TOKEN_LIFETIME_HOURS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for LOYALTY_TOKEN_LIFETIME_HOURS. {e}"))
                    .ok()
            })
            .map(ChronoDuration::hours)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        Ok(Self { jwt_secret: Secret::new(jwt_secret), token_lifetime })
    }
}
