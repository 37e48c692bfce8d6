//! Storage contracts for the loyalty engine.
//!
//! The engine never talks to a database directly; backends implement these traits and the public
//! APIs ([`crate::OrderFlowApi`], [`crate::AccountApi`], [`crate::AuthApi`]) are generic over them.
//!
//! * [`LoyaltyDatabase`] is the mutating contract: atomic order registration, the order state
//!   machine, balance credits and the withdrawal debit.
//! * [`AccountManagement`] provides read-only queries over orders, balances and withdrawals.
//! * [`AuthManagement`] stores user credentials.
mod account_management;
mod auth_management;
mod loyalty_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use auth_management::{AuthApiError, AuthManagement};
pub use loyalty_database::{LedgerError, LoyaltyDatabase};
