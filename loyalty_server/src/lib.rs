//! The loyalty server.
//!
//! Ties the [`loyalty_engine`] backend to the outside world: the user-facing HTTP API (accounts,
//! order submission, balance and withdrawals) and the background poller that chases the accrual
//! service for per-order results.
pub mod accrual;
pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod poller;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
