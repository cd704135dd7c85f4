use crate::{db_types::OrderStatus, traits::StoreError};

/// A record of which `(tracking id, status)` pairs have already had their side effects performed.
#[allow(async_fn_in_trait)]
pub trait SideEffectLedger {
    /// Atomically claims the pair. Returns `true` if this call made the claim, and `false` if it had already been
    /// claimed.
    async fn claim_side_effects(&self, tracking_id: &str, status: OrderStatus) -> Result<bool, StoreError>;

    /// Removes the claim on the pair, so that the next delivery performs the side effects again. Releasing a pair
    /// that was never claimed is not an error.
    async fn release_side_effects(&self, tracking_id: &str, status: OrderStatus) -> Result<(), StoreError>;
}
