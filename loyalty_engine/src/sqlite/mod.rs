//! SQLite backend for the loyalty engine.
mod sqlite_impl;

pub mod db;

pub use sqlite_impl::SqliteDatabase;
