//! Client for the accrual service.
//!
//! The poller asks the accrual service for per-order results via `GET /api/orders/{number}`. The
//! seam is the [`AccrualSource`] trait so the polling machinery can be driven by a scripted
//! source in tests.
use std::{future::Future, sync::Arc, time::Duration};

use log::*;
use loyalty_engine::db_types::OrderNumber;
use lp_common::Points;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Status vocabulary of the remote accrual service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemoteStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccrualUpdate {
    pub order: String,
    pub status: RemoteStatus,
    #[serde(default)]
    pub accrual: Option<Points>,
}

#[derive(Debug, Clone, Error)]
pub enum AccrualClientError {
    #[error("Could not initialize the accrual client. {0}")]
    Initialization(String),
    #[error("The accrual service asked us to back off for {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },
    #[error("The accrual service does not know this order yet")]
    NotRegistered,
    #[error("Accrual service response error: {0}")]
    ResponseError(String),
    #[error("Could not parse the accrual service response: {0}")]
    JsonError(String),
}

/// The polling seam between the order lifecycle and the remote accrual service.
pub trait AccrualSource: Clone + Send + Sync + 'static {
    fn order_status(
        &self,
        number: &OrderNumber,
    ) -> impl Future<Output = Result<AccrualUpdate, AccrualClientError>> + Send;
}

#[derive(Clone)]
pub struct AccrualClient {
    base_url: String,
    client: Arc<Client>,
}

impl AccrualClient {
    pub fn new(base_url: &str) -> Result<Self, AccrualClientError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AccrualClientError::Initialization(e.to_string()))?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client: Arc::new(client) })
    }
}

impl AccrualSource for AccrualClient {
    async fn order_status(&self, number: &OrderNumber) -> Result<AccrualUpdate, AccrualClientError> {
        let url = format!("{}/api/orders/{number}", self.base_url);
        trace!("📡️ Querying accrual status: {url}");
        let response =
            self.client.get(&url).send().await.map_err(|e| AccrualClientError::ResponseError(e.to_string()))?;
        match response.status() {
            StatusCode::OK => {
                let update = response
                    .json::<AccrualUpdate>()
                    .await
                    .map_err(|e| AccrualClientError::JsonError(e.to_string()))?;
                trace!("📡️ Order [{number}] is {:?} at the accrual service", update.status);
                Ok(update)
            },
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Err(AccrualClientError::NotRegistered),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                Err(AccrualClientError::RateLimited { retry_after: Duration::from_secs(retry_after) })
            },
            s => Err(AccrualClientError::ResponseError(format!("Unexpected status {s} from the accrual service"))),
        }
    }
}
