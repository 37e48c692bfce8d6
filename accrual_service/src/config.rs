use std::env;

use log::info;

pub const DEFAULT_ACCRUAL_PORT: u16 = 8088;
pub const DEFAULT_RATE_LIMIT: u32 = 60;

#[derive(Debug, Clone)]
pub struct AccrualConfig {
    pub host: String,
    pub port: u16,
    /// Status requests admitted per minute. Zero disables throttling.
    pub rate_limit: u32,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: DEFAULT_ACCRUAL_PORT, rate_limit: DEFAULT_RATE_LIMIT }
    }
}

impl AccrualConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("ACCRUAL_HOST").ok().unwrap_or_else(|| {
            info!("🪛️ ACCRUAL_HOST is not set. Using the default, 127.0.0.1");
            "127.0.0.1".into()
        });
        let port = env::var("ACCRUAL_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    info!("🪛️ {s} is not a valid port for ACCRUAL_PORT. {e} Using the default, {DEFAULT_ACCRUAL_PORT}.");
                    DEFAULT_ACCRUAL_PORT
                })
            })
            .unwrap_or(DEFAULT_ACCRUAL_PORT);
        let rate_limit = env::var("ACCRUAL_RATE_LIMIT")
            .map(|s| {
                s.parse::<u32>().unwrap_or_else(|e| {
                    info!("🪛️ {s} is not a valid value for ACCRUAL_RATE_LIMIT. {e} Using the default, {DEFAULT_RATE_LIMIT}.");
                    DEFAULT_RATE_LIMIT
                })
            })
            .unwrap_or(DEFAULT_RATE_LIMIT);
        Self { host, port, rate_limit }
    }
}
