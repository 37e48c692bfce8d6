//! # Loyalty engine public API
//!
//! The pattern for all three APIs is the same: an API instance is created by supplying a database
//! backend that implements the storage traits it requires.
//!
//! * [`order_flow_api`] handles order registration and the poller-driven state machine.
//! * [`accounts_api`] reports balances and processes withdrawals.
//! * [`auth_api`] registers users and verifies credentials.
//! * [`order_objects`] holds the serialisable views the server returns to clients.
pub mod accounts_api;
pub mod auth_api;
pub mod order_flow_api;
pub mod order_objects;
