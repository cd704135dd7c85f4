use std::fmt::Debug;

use log::*;
use ppg_common::non_empty;
use serde_json::Value;

use crate::{
    db_types::{NewNotification, NewOrder, Order, OrderStatus},
    ppg_api::{
        errors::ReconcileError,
        reconcile_objects::{EmailOutcome, NotificationOutcome, ReconcileOptions, ReconcileOutcome},
    },
    status_mapper::map_gateway_status,
    traits::{EmailMessage, Notifier, ReconciliationDatabase},
};

/// `ReconciliationApi` turns payment notifications from the gateway into order status changes, and performs the side
/// effects that go with them (a confirmation email for paid orders, and a notification record for every change).
///
/// Notifications are delivered at least once, so any call may be a duplicate of an earlier one. The status write is
/// idempotent. The side effects are repeated on every delivery unless [`ReconcileOptions::dedupe_side_effects`] is
/// set.
pub struct ReconciliationApi<B, N> {
    db: B,
    notifier: N,
    options: ReconcileOptions,
}

impl<B, N> Debug for ReconciliationApi<B, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({:?})", self.options)
    }
}

impl<B, N> ReconciliationApi<B, N> {
    pub fn new(db: B, notifier: N) -> Self {
        Self { db, notifier, options: ReconcileOptions::default() }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }
}

impl<B, N> ReconciliationApi<B, N>
where
    B: ReconciliationDatabase,
    N: Notifier,
{
    /// Reconciles the order with the given tracking id against the status reported by the gateway.
    ///
    /// The order's status is set to the mapped gateway status. If that fails, nothing else happens and the error is
    /// returned. Once the status is committed, the call succeeds regardless of what happens to the side effects:
    /// * if the order is now paid, a confirmation email is sent to the address on the (re-fetched) order,
    /// * a notification record is appended for the order's user.
    ///
    /// The email is attempted before the notification is appended. Failures of either are logged and reported in the
    /// returned [`ReconcileOutcome`].
    pub async fn reconcile(&self, tracking_id: &str, gateway_status: &str) -> Result<ReconcileOutcome, ReconcileError> {
        let tracking_id = non_empty(tracking_id)
            .ok_or_else(|| ReconcileError::InvalidRequest("An order tracking id is required".to_string()))?;
        let order = self
            .db
            .fetch_order(tracking_id)
            .await
            .map_err(|e| {
                error!("🔔️ Could not fetch order {tracking_id}. {e}");
                ReconcileError::from(e)
            })?
            .ok_or_else(|| {
                warn!("🔔️ Received a payment notification for order {tracking_id}, but it does not exist");
                ReconcileError::OrderNotFound(tracking_id.to_string())
            })?;
        let status = map_gateway_status(gateway_status);
        debug!("🔔️ Gateway status '{gateway_status}' for order {tracking_id} maps to {status}");
        self.db.update_order_status(tracking_id, status).await.map_err(|e| {
            error!("🔔️ Could not update the status of order {tracking_id} to {status}. {e}");
            ReconcileError::from(e)
        })?;
        info!("🔔️ Order {tracking_id} has been marked as {status}");

        if self.options.dedupe_side_effects && !self.claim_side_effects(tracking_id, status).await {
            info!("🔔️ Side effects for order {tracking_id} ({status}) have already been performed. Skipping them.");
            return Ok(ReconcileOutcome {
                tracking_id: tracking_id.to_string(),
                status,
                email: EmailOutcome::Suppressed,
                notification: NotificationOutcome::Suppressed,
            });
        }

        let (email, user_id) = match status {
            OrderStatus::Paid => self.send_confirmation(tracking_id, order.user_id).await,
            _ => (EmailOutcome::Skipped(format!("Order is {status}")), order.user_id),
        };
        let notification = self.record_notification(user_id, tracking_id, status).await;
        if self.options.dedupe_side_effects && notification == NotificationOutcome::Failed {
            self.release_side_effects(tracking_id, status).await;
        }
        let outcome = ReconcileOutcome { tracking_id: tracking_id.to_string(), status, email, notification };
        debug!("🔔️ {outcome}");
        Ok(outcome)
    }

    /// Records an order that has just been submitted to the gateway, with status `Pending`.
    ///
    /// The user id and email are read from the submitted payload (`userId`/`user_id` and `userEmail`/`user_email`,
    /// falling back to `billing_address.email_address`). If the order is already known, it is left as it is and
    /// `false` is returned alongside it.
    pub async fn record_pending_order(
        &self,
        tracking_id: &str,
        payload: &Value,
    ) -> Result<(Order, bool), ReconcileError> {
        let tracking_id = non_empty(tracking_id)
            .ok_or_else(|| ReconcileError::InvalidRequest("An order tracking id is required".to_string()))?;
        let mut order = NewOrder::new(tracking_id).with_payload(payload.clone());
        order.user_id = string_field(payload, &["userId", "user_id"]);
        order.user_email = string_field(payload, &["userEmail", "user_email"])
            .or_else(|| payload.get("billing_address").and_then(|a| string_field(a, &["email_address"])));
        let (order, inserted) = self.db.insert_pending_order(order).await.map_err(|e| {
            error!("🗃️ Could not record pending order {tracking_id}. {e}");
            ReconcileError::from(e)
        })?;
        if inserted {
            info!("🗃️ Pending order {tracking_id} recorded");
        } else {
            debug!("🗃️ Order {tracking_id} already exists with status {}. Left unchanged.", order.status);
        }
        Ok((order, inserted))
    }

    /// A ledger that cannot be read does not stop the side effects. They are performed again rather than not at all.
    async fn claim_side_effects(&self, tracking_id: &str, status: OrderStatus) -> bool {
        match self.db.claim_side_effects(tracking_id, status).await {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!("🔔️ Could not consult the side effect ledger for order {tracking_id}. {e}. Proceeding anyway.");
                true
            },
        }
    }

    /// Without a notification record the side effects are not complete, so the claim is given up and the next delivery
    /// of the same status performs them again.
    async fn release_side_effects(&self, tracking_id: &str, status: OrderStatus) {
        match self.db.release_side_effects(tracking_id, status).await {
            Ok(()) => info!("🔔️ Side effects for order {tracking_id} ({status}) will be retried on the next delivery"),
            Err(e) => error!(
                "🔔️ Could not release the side effect claim for order {tracking_id} ({status}). Its notification record \
                 will not be retried. {e}"
            ),
        }
    }

    /// Re-fetches the order and emails the customer. Returns the outcome and the user id to record the notification
    /// against.
    async fn send_confirmation(
        &self,
        tracking_id: &str,
        fallback_user_id: Option<String>,
    ) -> (EmailOutcome, Option<String>) {
        let order = match self.db.fetch_order(tracking_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!("🔔️ Order {tracking_id} disappeared after its status was updated. No email will be sent.");
                return (EmailOutcome::Skipped("The order could not be re-fetched".to_string()), fallback_user_id);
            },
            Err(e) => {
                warn!("🔔️ Could not re-fetch order {tracking_id}. No email will be sent. {e}");
                return (EmailOutcome::Skipped(format!("The order could not be re-fetched. {e}")), fallback_user_id);
            },
        };
        let email = match order.user_email.as_deref().and_then(non_empty) {
            Some(address) => {
                let message = EmailMessage::order_confirmation(address, tracking_id);
                match self.notifier.send(message).await {
                    Ok(()) => {
                        info!("📧️ Confirmation email for order {tracking_id} sent");
                        EmailOutcome::Sent
                    },
                    Err(e) => {
                        warn!("📧️ Could not send the confirmation email for order {tracking_id}. {e}");
                        EmailOutcome::Failed(e.to_string())
                    },
                }
            },
            None => {
                debug!("🔔️ Order {tracking_id} has no email address. No email will be sent.");
                EmailOutcome::Skipped("The order has no email address".to_string())
            },
        };
        (email, order.user_id)
    }

    async fn record_notification(
        &self,
        user_id: Option<String>,
        tracking_id: &str,
        status: OrderStatus,
    ) -> NotificationOutcome {
        let notification = NewNotification::status_change(user_id, tracking_id, status);
        match self.db.append_notification(notification).await {
            Ok(n) => {
                debug!("🔔️ Notification #{} recorded for order {tracking_id}", n.id);
                NotificationOutcome::Recorded(n.id)
            },
            Err(e) => {
                error!(
                    "🔔️ Order {tracking_id} was marked as {status}, but the notification record could not be saved. {e}"
                );
                NotificationOutcome::Failed
            },
        }
    }
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|k| value.get(*k)).find_map(|v| match v {
        Value::String(s) => non_empty(s).map(String::from),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
