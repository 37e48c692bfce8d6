use std::fmt::Debug;

use log::*;
use lp_common::{luhn, Points};

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatus, RegisterOutcome},
    traits::{AccountApiError, AccountManagement, LedgerError, LoyaltyDatabase},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: user-facing registration and the
/// poller-facing state machine transitions.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: LoyaltyDatabase
{
    /// Registers a raw order number for the given user.
    ///
    /// The number is Luhn-validated before anything touches storage. Registration is idempotent
    /// for the owning user and rejected (via [`RegisterOutcome::Conflict`]) for anyone else.
    pub async fn register_order(&self, raw_number: &str, user_id: i64) -> Result<(Order, RegisterOutcome), LedgerError> {
        if !luhn::is_valid(raw_number) {
            return Err(LedgerError::InvalidOrderNumber(raw_number.to_string()));
        }
        let number = OrderNumber::from(raw_number.to_string());
        let (order, outcome) = self.db.register_order(NewOrder::new(number, user_id)).await?;
        debug!("🔄️📦️ Order [{}] registration for user #{user_id}: {outcome:?}", order.number);
        Ok((order, outcome))
    }

    /// Marks an order as picked up by the poller (`Registered → Processing`).
    pub async fn start_processing(&self, number: &OrderNumber) -> Result<Order, LedgerError> {
        self.db.start_processing(number).await
    }

    /// Records a terminal poll result. For `Processed`, the owner's balance is credited in the
    /// same transaction as the status change.
    pub async fn complete_order(
        &self,
        number: &OrderNumber,
        status: OrderStatus,
        accrual: Points,
    ) -> Result<Order, LedgerError> {
        let order = self.db.complete_order(number, status, accrual).await?;
        debug!("🔄️📦️ Order [{number}] reached terminal state {status}");
        Ok(order)
    }

    /// Orders still awaiting a terminal state, oldest first. Used by the poller at startup.
    pub async fn unresolved_orders(&self) -> Result<Vec<Order>, LedgerError> {
        self.db.fetch_unresolved_orders().await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: AccountManagement
{
    /// All orders submitted by the user, most recent first.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    pub async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_number(number).await
    }
}
