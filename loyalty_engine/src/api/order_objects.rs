//! Serialisable views of engine records, as returned by the HTTP API.
use chrono::{DateTime, Utc};
use lp_common::Points;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatus, UserBalance, Withdrawal};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub number: String,
    pub status: OrderStatus,
    pub accrual: Points,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderSummary {
    fn from(o: Order) -> Self {
        Self { number: o.number.0, status: o.status, accrual: o.accrual, uploaded_at: o.submitted_at }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub current: Points,
    pub withdrawn: Points,
}

impl From<UserBalance> for BalanceSummary {
    fn from(b: UserBalance) -> Self {
        Self { current: b.current(), withdrawn: b.withdrawn }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalSummary {
    #[serde(rename = "orderNumber")]
    pub order_number: String,
    pub amount: Points,
    #[serde(rename = "processedAt")]
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalSummary {
    fn from(w: Withdrawal) -> Self {
        Self { order_number: w.number.0, amount: w.amount, processed_at: w.processed_at }
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use lp_common::Points;

    use super::OrderSummary;
    use crate::db_types::OrderStatus;

    #[test]
    fn order_summary_wire_format() {
        let summary = OrderSummary {
            number: "12345678903".to_string(),
            status: OrderStatus::Processed,
            accrual: Points::from(500),
            uploaded_at: Utc::now(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["number"], "12345678903");
        assert_eq!(json["status"], "PROCESSED");
        assert_eq!(json["accrual"], 500);
        assert!(json.get("uploadedAt").is_some());
    }
}
