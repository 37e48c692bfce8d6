use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use lp_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------    OrderNumber      ---------------------------------------------------------
/// A Luhn-valid order number as submitted by a user. Globally unique across all users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    OrderStatus      ---------------------------------------------------------
/// The order lifecycle. Transitions run strictly forward:
/// `Registered → Processing → {Invalid | Processed}`. `Invalid` and `Processed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted from the user; not yet picked up by the poller.
    Registered,
    /// The poller is querying the accrual service for this order.
    Processing,
    /// The accrual service rejected the order. Terminal.
    Invalid,
    /// The accrual was computed and credited. Terminal.
    Processed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Invalid | OrderStatus::Processed)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!((self, next), (Registered, Processing) | (Processing, Invalid) | (Processing, Processed))
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Registered => write!(f, "Registered"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Invalid => write!(f, "Invalid"),
            OrderStatus::Processed => write!(f, "Processed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Registered" => Ok(Self::Registered),
            "Processing" => Ok(Self::Processing),
            "Invalid" => Ok(Self::Invalid),
            "Processed" => Ok(Self::Processed),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::error!("Invalid order status '{value}' read from storage. Defaulting to Registered");
            OrderStatus::Registered
        })
    }
}

//--------------------------------------       Order         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub number: OrderNumber,
    pub user_id: i64,
    pub status: OrderStatus,
    /// Zero until the order reaches `Processed`, immutable thereafter.
    pub accrual: Points,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub number: OrderNumber,
    pub user_id: i64,
}

impl NewOrder {
    pub fn new(number: OrderNumber, user_id: i64) -> Self {
        Self { number, user_id }
    }
}

//--------------------------------------   RegisterOutcome   ---------------------------------------------------------
/// The result of a registration attempt for an order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new record was created and the order is now eligible for polling.
    Created,
    /// The same user re-submitted a number they already own. No new state.
    AlreadyOwned,
    /// A different user owns this number. The registration was rejected.
    Conflict,
}

//--------------------------------------     UserBalance     ---------------------------------------------------------
/// Per-user ledger totals. `current = earned - withdrawn` and never goes negative.
#[derive(Debug, Clone, Copy, FromRow, Serialize, Deserialize)]
pub struct UserBalance {
    pub user_id: i64,
    pub earned: Points,
    pub withdrawn: Points,
}

impl UserBalance {
    pub fn zero(user_id: i64) -> Self {
        Self { user_id, earned: Points::default(), withdrawn: Points::default() }
    }

    pub fn current(&self) -> Points {
        self.earned - self.withdrawn
    }
}

//--------------------------------------     Withdrawal      ---------------------------------------------------------
/// A committed balance debit. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: i64,
    /// The Luhn-valid order number the withdrawal was made against. It need not reference a
    /// registered order.
    pub number: OrderNumber,
    pub amount: Points,
    pub processed_at: DateTime<Utc>,
}

//--------------------------------------        User         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
