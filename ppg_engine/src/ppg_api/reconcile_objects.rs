use std::fmt::Display;

use serde::Serialize;

use crate::db_types::OrderStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// When set, the side effects for a given `(tracking id, status)` pair are performed at most once. Otherwise every
    /// delivery of a notification sends the email and appends a notification record again.
    pub dedupe_side_effects: bool,
}

impl ReconcileOptions {
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe_side_effects = dedupe;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum EmailOutcome {
    Sent,
    Failed(String),
    Skipped(String),
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "id", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Recorded(i64),
    Failed,
    Suppressed,
}

/// What happened during a successful reconciliation. The status write has always been committed when you hold one of
/// these; the side effects may not have been.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub tracking_id: String,
    pub status: OrderStatus,
    pub email: EmailOutcome,
    pub notification: NotificationOutcome,
}

impl Display for ReconcileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {} is {}. Email: {:?}. Notification: {:?}",
            self.tracking_id, self.status, self.email, self.notification
        )
    }
}
