use lp_common::Points;
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatus, RegisterOutcome, Withdrawal},
    traits::{AccountApiError, AccountManagement},
};

/// The mutating contract a backend must satisfy to drive the loyalty engine.
///
/// Implementations must make each method atomic with respect to concurrent callers:
/// * `register_order` is an indivisible check-and-insert on the order number,
/// * `complete_order` commits the terminal status and (for `Processed`) the balance credit in one
///   transaction, so a `Processed` order can never be observed without its credit,
/// * `withdraw` performs the balance check and debit as one unit, so two concurrent withdrawals
///   cannot both pass the check against a stale balance.
#[allow(async_fn_in_trait)]
pub trait LoyaltyDatabase: Clone + AccountManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Registers the order number for the given user, atomically with the global uniqueness check.
    ///
    /// Returns the order record along with the outcome: `Created` for a fresh registration,
    /// `AlreadyOwned` when the same user re-submits their own number (idempotent, no new state) and
    /// `Conflict` when the number belongs to a different user (the returned record is the existing
    /// one, unchanged).
    async fn register_order(&self, order: NewOrder) -> Result<(Order, RegisterOutcome), LedgerError>;

    /// Moves an order from `Registered` to `Processing`. Called by the poller when it first picks
    /// the order up. Fails with [`LedgerError::InvalidTransition`] from any other state.
    async fn start_processing(&self, number: &OrderNumber) -> Result<Order, LedgerError>;

    /// Commits a terminal poll result: `Processing → Invalid` (accrual is ignored and recorded as
    /// zero) or `Processing → Processed` (the accrual is recorded on the order and credited to the
    /// owner's balance in the same transaction).
    ///
    /// Any other target status, or an order not currently in `Processing`, fails with
    /// [`LedgerError::InvalidTransition`] and leaves all state unchanged.
    async fn complete_order(
        &self,
        number: &OrderNumber,
        status: OrderStatus,
        accrual: Points,
    ) -> Result<Order, LedgerError>;

    /// All orders not yet in a terminal state, oldest first. Used to resume polling after restart.
    async fn fetch_unresolved_orders(&self) -> Result<Vec<Order>, LedgerError>;

    /// Debits `amount` from the user's balance and records the withdrawal, atomically.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] if `amount` exceeds the current balance; the
    /// balance is left untouched in that case.
    async fn withdraw(&self, user_id: i64, number: &OrderNumber, amount: Points) -> Result<Withdrawal, LedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Order number failed validation: {0}")]
    InvalidOrderNumber(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Illegal order transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Withdrawal of {requested} exceeds the available balance of {available}")]
    InsufficientFunds { available: Points, requested: Points },
    #[error("Withdrawal amounts must be positive, got {0}")]
    NonPositiveAmount(Points),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
