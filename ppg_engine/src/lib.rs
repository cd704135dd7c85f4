//! PesaPal Payment Gateway engine
//!
//! This library contains the core logic of the payment gateway: it reconciles the payment notifications (IPNs) that
//! PesaPal sends with the orders in the merchant's store. It is transport-agnostic; the HTTP layer lives in
//! `ppg_server`.
//!
//! The library is divided into three main sections:
//! 1. The storage and notification contracts ([`mod@traits`]). The engine needs a document store holding orders and
//!    notification records, and a way to email customers. Backends implement the traits in this module.
//!    [`SqliteDatabase`] is the SQLite implementation.
//! 2. The [`status_mapper`], which turns gateway status strings into [`db_types::OrderStatus`] values.
//! 3. The public API, [`ReconciliationApi`]. It applies a notification to an order and performs the side effects
//!    (customer email and notification record) that go with a status change.
//!
//! Notifications are delivered at least once. By default, the side effects are repeated for every delivery. Turning on
//! [`ReconcileOptions::dedupe_side_effects`] makes them happen once per `(tracking id, status)` pair.
pub mod db_types;
mod ppg_api;
pub mod status_mapper;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use ppg_api::{
    errors::ReconcileError,
    reconcile_objects::{EmailOutcome, NotificationOutcome, ReconcileOptions, ReconcileOutcome},
    reconciliation_api::ReconciliationApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::ReconciliationDatabase;
