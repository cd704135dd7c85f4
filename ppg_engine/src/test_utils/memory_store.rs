use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use chrono::Utc;

use crate::{
    db_types::{NewNotification, NewOrder, Notification, Order, OrderStatus},
    traits::{NotificationStore, OrderStore, ReconciliationDatabase, SideEffectLedger, StoreError},
};

/// The store operations that [`MemoryStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FetchOrder,
    UpdateStatus,
    InsertOrder,
    AppendNotification,
    FetchNotifications,
    ClaimSideEffects,
    ReleaseSideEffects,
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    OnCall(usize),
}

#[derive(Debug, Default)]
struct Inner {
    orders: HashMap<String, Order>,
    notifications: Vec<Notification>,
    ledger: HashSet<(String, OrderStatus)>,
    next_order_id: i64,
    next_notification_id: i64,
    failures: HashMap<StoreOp, Failure>,
    vanishing: HashSet<String>,
    calls: HashMap<StoreOp, usize>,
}

impl Inner {
    /// Counts the call and returns an error if a failure has been injected for it.
    fn check(&mut self, op: StoreOp) -> Result<(), StoreError> {
        let count = self.calls.entry(op).or_default();
        *count += 1;
        match self.failures.get(&op) {
            Some(Failure::Always) => Err(StoreError::DatabaseError(format!("Injected failure for {op:?}"))),
            Some(Failure::OnCall(n)) if *n == *count => {
                Err(StoreError::DatabaseError(format!("Injected failure for {op:?} on call {n}")))
            },
            _ => Ok(()),
        }
    }
}

/// A document store that lives in memory. Clones share the same data, so a test can keep a handle to the store it
/// passed to the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Every subsequent call of `op` fails with a [`StoreError::DatabaseError`].
    pub fn fail_on(&self, op: StoreOp) {
        self.inner.lock().unwrap().failures.insert(op, Failure::Always);
    }

    /// Only the `n`th call of `op` (counting from 1, including calls already made) fails.
    pub fn fail_on_call(&self, op: StoreOp, n: usize) {
        self.inner.lock().unwrap().failures.insert(op, Failure::OnCall(n));
    }

    pub fn heal(&self, op: StoreOp) {
        self.inner.lock().unwrap().failures.remove(&op);
    }

    pub fn call_count(&self, op: StoreOp) -> usize {
        self.inner.lock().unwrap().calls.get(&op).copied().unwrap_or_default()
    }

    /// The order is removed from the store as soon as its status has been updated, as if another process deleted it.
    pub fn vanish_after_update(&self, tracking_id: &str) {
        self.inner.lock().unwrap().vanishing.insert(tracking_id.to_string());
    }

    pub fn is_claimed(&self, tracking_id: &str, status: OrderStatus) -> bool {
        self.inner.lock().unwrap().ledger.contains(&(tracking_id.to_string(), status))
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.lock().unwrap().notifications.clone()
    }
}

impl OrderStore for MemoryStore {
    async fn fetch_order(&self, tracking_id: &str) -> Result<Option<Order>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(StoreOp::FetchOrder)?;
        Ok(inner.orders.get(tracking_id).cloned())
    }

    async fn update_order_status(&self, tracking_id: &str, status: OrderStatus) -> Result<Order, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(StoreOp::UpdateStatus)?;
        let order =
            inner.orders.get_mut(tracking_id).ok_or_else(|| StoreError::OrderNotFound(tracking_id.to_string()))?;
        order.status = status;
        order.updated_at = Utc::now();
        let updated = order.clone();
        if inner.vanishing.remove(tracking_id) {
            inner.orders.remove(tracking_id);
        }
        Ok(updated)
    }

    async fn insert_pending_order(&self, order: NewOrder) -> Result<(Order, bool), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(StoreOp::InsertOrder)?;
        if let Some(existing) = inner.orders.get(&order.tracking_id) {
            return Ok((existing.clone(), false));
        }
        inner.next_order_id += 1;
        let now = Utc::now();
        let new_order = Order {
            id: inner.next_order_id,
            tracking_id: order.tracking_id.clone(),
            status: OrderStatus::Pending,
            user_id: order.user_id,
            user_email: order.user_email,
            payload: order.payload,
            created_at: now,
            updated_at: now,
        };
        inner.orders.insert(order.tracking_id, new_order.clone());
        Ok((new_order, true))
    }
}

impl NotificationStore for MemoryStore {
    async fn append_notification(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(StoreOp::AppendNotification)?;
        inner.next_notification_id += 1;
        let record = Notification {
            id: inner.next_notification_id,
            user_id: notification.user_id,
            message: notification.message,
            notification_type: notification.notification_type,
            created_at: Utc::now(),
        };
        inner.notifications.push(record.clone());
        Ok(record)
    }

    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(StoreOp::FetchNotifications)?;
        Ok(inner.notifications.iter().filter(|n| n.user_id.as_deref() == Some(user_id)).cloned().collect())
    }
}

impl SideEffectLedger for MemoryStore {
    async fn claim_side_effects(&self, tracking_id: &str, status: OrderStatus) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(StoreOp::ClaimSideEffects)?;
        Ok(inner.ledger.insert((tracking_id.to_string(), status)))
    }

    async fn release_side_effects(&self, tracking_id: &str, status: OrderStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(StoreOp::ReleaseSideEffects)?;
        inner.ledger.remove(&(tracking_id.to_string(), status));
        Ok(())
    }
}

impl ReconciliationDatabase for MemoryStore {
    fn url(&self) -> &str {
        "memory://"
    }
}
