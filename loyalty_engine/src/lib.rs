//! Loyalty Engine
//!
//! The loyalty engine tracks user-submitted order numbers through their processing lifecycle and
//! maintains the per-user points ledger. This library contains the core logic and is
//! transport-agnostic: HTTP, sessions and the accrual poller live in the server crate.
//!
//! The library is divided into two main sections:
//! 1. Storage management ([`mod@traits`] and the SQLite backend). You should never need to access
//!    the database directly; use the public APIs instead. The exception is the record types in
//!    [`db_types`], which are public.
//! 2. The public API: [`OrderFlowApi`] for the order state machine, [`AccountApi`] for the balance
//!    ledger, and [`AuthApi`] for user credentials. Backends implement the storage traits to plug
//!    into these APIs.
mod api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{
    accounts_api::AccountApi,
    auth_api::{hash_password, verify_password, AuthApi},
    order_flow_api::OrderFlowApi,
    order_objects,
};
