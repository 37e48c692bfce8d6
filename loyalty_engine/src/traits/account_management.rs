use thiserror::Error;

use crate::db_types::{Order, OrderNumber, UserBalance, Withdrawal};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Read-only queries over orders, balances and withdrawal history.
///
/// The [`LoyaltyDatabase`](crate::traits::LoyaltyDatabase) trait handles the machinery of mutating
/// this state; `AccountManagement` only reports on it.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// All orders submitted by the user, most recent first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;

    /// The order with the given number, if it has been registered by anyone.
    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, AccountApiError>;

    /// The user's balance. Users with no credits yet have a zero balance, not an error.
    async fn fetch_balance(&self, user_id: i64) -> Result<UserBalance, AccountApiError>;

    /// All withdrawals made by the user, most recent first.
    async fn fetch_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError>;
}
