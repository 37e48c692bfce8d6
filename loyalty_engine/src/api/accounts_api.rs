//! Unified API for balance queries and withdrawals.
use std::fmt::Debug;

use log::*;
use lp_common::{luhn, Points};

use crate::{
    db_types::{OrderNumber, UserBalance, Withdrawal},
    traits::{AccountApiError, AccountManagement, LedgerError, LoyaltyDatabase},
};

/// The `AccountApi` owns the balance ledger: credits land here via the order flow, debits via
/// [`Self::withdraw`], and the no-overdraft invariant is enforced at debit time.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    /// The user's balance; zero for users that have never been credited.
    pub async fn balance(&self, user_id: i64) -> Result<UserBalance, AccountApiError> {
        self.db.fetch_balance(user_id).await
    }

    /// The user's withdrawal history, most recent first.
    pub async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError> {
        self.db.fetch_withdrawals(user_id).await
    }
}

impl<B> AccountApi<B>
where B: LoyaltyDatabase
{
    /// Withdraws `amount` against the given order number.
    ///
    /// The number only needs to pass the Luhn check; it does not have to reference a registered
    /// order. The balance check and debit are atomic in the backend.
    pub async fn withdraw(&self, user_id: i64, raw_number: &str, amount: Points) -> Result<Withdrawal, LedgerError> {
        if !luhn::is_valid(raw_number) {
            return Err(LedgerError::InvalidOrderNumber(raw_number.to_string()));
        }
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        let number = OrderNumber::from(raw_number.to_string());
        let withdrawal = self.db.withdraw(user_id, &number, amount).await?;
        debug!("💰️ Withdrawal of {amount} for user #{user_id} against order [{number}] committed");
        Ok(withdrawal)
    }
}
