pub mod errors;
pub mod reconcile_objects;
pub mod reconciliation_api;
