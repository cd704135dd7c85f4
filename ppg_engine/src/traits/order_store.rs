use crate::{
    db_types::{NewOrder, Order, OrderStatus},
    traits::StoreError,
};

/// Access to the orders collection. Orders are keyed by the tracking id the gateway assigned to them.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Fetches the order with the given tracking id. If there is no such order, `None` is returned.
    async fn fetch_order(&self, tracking_id: &str) -> Result<Option<Order>, StoreError>;

    /// Sets the status of an existing order and returns the updated record.
    ///
    /// This is an update, never an upsert. If the order does not exist, [`StoreError::OrderNotFound`] is returned and
    /// nothing is written. A single update is atomic; concurrent updates to the same order are last-write-wins.
    async fn update_order_status(&self, tracking_id: &str, status: OrderStatus) -> Result<Order, StoreError>;

    /// Inserts a new order with status `Pending`, unless an order with the same tracking id already exists. The stored
    /// order is returned, along with `true` if it was inserted by this call. An existing order is left untouched.
    async fn insert_pending_order(&self, order: NewOrder) -> Result<(Order, bool), StoreError>;
}
