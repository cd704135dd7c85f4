//! SQLite document store for the payment gateway.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
