//! Maps the status strings that PesaPal reports onto [`OrderStatus`].
use crate::db_types::OrderStatus;

pub const GATEWAY_COMPLETED: &str = "COMPLETED";
pub const GATEWAY_FAILED: &str = "FAILED";

/// Total over all inputs. Matching is exact, so `completed` or ` COMPLETED` map to `Pending`.
pub fn map_gateway_status(gateway_status: &str) -> OrderStatus {
    match gateway_status {
        GATEWAY_COMPLETED => OrderStatus::Paid,
        GATEWAY_FAILED => OrderStatus::Failed,
        _ => OrderStatus::Pending,
    }
}
