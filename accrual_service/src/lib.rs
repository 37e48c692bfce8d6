//! A standalone accrual calculation service.
//!
//! Loyalty partners register reward mechanics against goods-description patterns, orders are
//! submitted with their purchased goods, and the loyalty platform polls per-order totals over
//! HTTP. All state is held in memory; the service exists to decouple reward calculation from the
//! order lifecycle kept by the loyalty server.
pub mod config;
pub mod errors;
pub mod matcher;
pub mod rate_limit;
pub mod routes;
pub mod store;
