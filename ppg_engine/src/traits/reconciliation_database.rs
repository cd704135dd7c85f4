use crate::traits::{NotificationStore, OrderStore, SideEffectLedger};

/// The full set of storage behaviour that a backend must provide to drive the reconciliation engine.
pub trait ReconciliationDatabase: Clone + OrderStore + NotificationStore + SideEffectLedger {
    /// The url of the underlying store, for logging purposes.
    fn url(&self) -> &str;
}
