//! # Backend and collaborator traits
//!
//! The reconciliation engine does not talk to a database or a mail server directly. It relies on the traits in this
//! module, so that any document store or mail transport can be plugged in, and so that the engine can be tested
//! against in-memory versions of both.
//!
//! * [`OrderStore`] reads orders and changes their status.
//! * [`NotificationStore`] appends to, and reads from, the notifications collection.
//! * [`SideEffectLedger`] remembers which `(tracking id, status)` pairs have already had their side effects.
//! * [`ReconciliationDatabase`] bundles the three store traits. It is the bound the engine and the server use.
//! * [`Notifier`] delivers emails to customers.
mod notification_store;
mod notifier;
mod order_store;
mod reconciliation_database;
mod side_effect_ledger;

use thiserror::Error;

pub use notification_store::NotificationStore;
pub use notifier::{EmailMessage, Notifier, NotifierError};
pub use order_store::OrderStore;
pub use reconciliation_database::ReconciliationDatabase;
pub use side_effect_ledger::SideEffectLedger;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}
