use thiserror::Error;

use crate::traits::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
    #[error("The order store is unavailable. {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for ReconcileError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OrderNotFound(id) => ReconcileError::OrderNotFound(id),
            StoreError::DatabaseError(s) => ReconcileError::StoreUnavailable(s),
        }
    }
}
