//! Handler-level tests against mocked storage backends. Endpoints that need the full
//! [`loyalty_engine::traits::LoyaltyDatabase`] contract (order submission, withdrawals) are
//! covered by the integration tests in `tests/`.
mod accounts;
mod auth;
mod helpers;
mod mocks;
