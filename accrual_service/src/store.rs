//! In-memory accrual store.
//!
//! Keeps the registered mechanics (in registration order, for tie-breaking) and the computed total
//! for every order number that has been submitted for calculation. Totals are computed once and
//! replayed on repeat submissions, so a retried calculation request can never double-count.
use std::collections::HashMap;

use log::debug;
use lp_common::{luhn, Points};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    errors::AccrualError,
    matcher::{total_accrual, Good, Mechanic},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderState {
    Registered,
    Processing,
    Invalid,
    Processed,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    #[serde(rename = "order")]
    pub number: String,
    pub status: OrderState,
    pub accrual: Points,
}

#[derive(Default)]
struct StoreInner {
    mechanics: Vec<Mechanic>,
    orders: HashMap<String, OrderRecord>,
}

#[derive(Default)]
pub struct AccrualStore {
    inner: RwLock<StoreInner>,
}

impl AccrualStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a reward mechanic. A mechanic with the same match pattern may only be registered
    /// once; later duplicates are rejected, not overwritten.
    pub async fn register_mechanic(&self, mechanic: Mechanic) -> Result<(), AccrualError> {
        let mut inner = self.inner.write().await;
        if inner.mechanics.iter().any(|m| m.match_text == mechanic.match_text) {
            return Err(AccrualError::DuplicateMatch(mechanic.match_text));
        }
        debug!("🧮️ Mechanic registered for pattern '{}'", mechanic.match_text);
        inner.mechanics.push(mechanic);
        Ok(())
    }

    /// Computes and stores the total accrual for an order. Recomputing a known order number
    /// returns the previously stored total.
    pub async fn calculate(&self, number: &str, goods: &[Good]) -> Result<Points, AccrualError> {
        if !luhn::is_valid(number) {
            return Err(AccrualError::InvalidOrderNumber(number.to_string()));
        }
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.orders.get(number) {
            debug!("🧮️ Order [{number}] already calculated, returning stored total {}", existing.accrual);
            return Ok(existing.accrual);
        }
        let total = total_accrual(&inner.mechanics, goods);
        inner.orders.insert(
            number.to_string(),
            OrderRecord { number: number.to_string(), status: OrderState::Processed, accrual: total },
        );
        debug!("🧮️ Order [{number}] calculated: {total} over {} goods", goods.len());
        Ok(total)
    }

    /// The status and accrual for an order, or `None` if it was never submitted for calculation.
    pub async fn show_status(&self, number: &str) -> Option<OrderRecord> {
        self.inner.read().await.orders.get(number).cloned()
    }
}

#[cfg(test)]
mod test {
    use lp_common::Points;

    use super::{AccrualStore, OrderState};
    use crate::matcher::{Good, Mechanic, RewardKind};

    fn mechanic(match_text: &str, kind: RewardKind, points: i64) -> Mechanic {
        Mechanic { match_text: match_text.to_string(), reward_kind: kind, reward_points: points }
    }

    fn good(description: &str, price: i64) -> Good {
        Good { description: description.to_string(), price: Points::from(price) }
    }

    #[tokio::test]
    async fn duplicate_mechanics_are_rejected() {
        let store = AccrualStore::new();
        store.register_mechanic(mechanic("Bork", RewardKind::Percent, 10)).await.unwrap();
        let err = store.register_mechanic(mechanic("Bork", RewardKind::Points, 99)).await.unwrap_err();
        assert!(matches!(err, crate::errors::AccrualError::DuplicateMatch(m) if m == "Bork"));
    }

    #[tokio::test]
    async fn recomputation_is_idempotent() {
        let store = AccrualStore::new();
        store.register_mechanic(mechanic("Bork", RewardKind::Percent, 10)).await.unwrap();
        let goods = vec![good("Bork mixer", 1000)];
        let first = store.calculate("12345678903", &goods).await.unwrap();
        assert_eq!(first, Points::from(100));

        // A mechanic registered later must not change the stored total
        store.register_mechanic(mechanic("mixer", RewardKind::Points, 500)).await.unwrap();
        let second = store.calculate("12345678903", &goods).await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn status_is_not_found_until_submitted() {
        let store = AccrualStore::new();
        assert!(store.show_status("12345678903").await.is_none());
        store.calculate("12345678903", &[]).await.unwrap();
        let record = store.show_status("12345678903").await.unwrap();
        assert_eq!(record.status, OrderState::Processed);
        assert_eq!(record.accrual, Points::from(0));
    }

    #[tokio::test]
    async fn bad_numbers_are_rejected() {
        let store = AccrualStore::new();
        let err = store.calculate("12345678904", &[]).await.unwrap_err();
        assert!(matches!(err, crate::errors::AccrualError::InvalidOrderNumber(_)));
    }
}
