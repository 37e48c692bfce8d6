//! Request payloads for the user-facing endpoints. Response shapes live in
//! [`loyalty_engine::order_objects`].
use lp_common::Points;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    /// The order number the withdrawal is made against. Luhn-checked, but it does not have to
    /// reference a registered order.
    #[serde(rename = "orderNumber")]
    pub order_number: String,
    pub amount: Points,
}
