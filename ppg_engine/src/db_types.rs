use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use thiserror::Error;

//--------------------------------------     OrderStatus       ---------------------------------------------------------
/// The internal status of an order. Orders start out as `Pending` and move to `Paid` or `Failed` when the gateway
/// tells us about the outcome of the payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   NotificationType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Failure,
    Info,
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
            Self::Info => f.write_str("info"),
        }
    }
}

impl From<OrderStatus> for NotificationType {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Paid => Self::Success,
            OrderStatus::Failed => Self::Failure,
            OrderStatus::Pending => Self::Info,
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
/// An order, keyed by the tracking id the gateway assigned to it.
///
/// `payload` holds the order as it was submitted. The engine never looks inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub tracking_id: String,
    pub status: OrderStatus,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let payload: Option<String> = row.try_get("payload")?;
        let payload = match payload {
            Some(s) => serde_json::from_str(&s)
                .map_err(|e| sqlx::Error::ColumnDecode { index: "payload".into(), source: Box::new(e) })?,
            None => Value::Null,
        };
        Ok(Self {
            id: row.try_get("id")?,
            tracking_id: row.try_get("tracking_id")?,
            status: row.try_get("status")?,
            user_id: row.try_get("user_id")?,
            user_email: row.try_get("user_email")?,
            payload,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub tracking_id: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub payload: Value,
}

impl NewOrder {
    pub fn new<S: Into<String>>(tracking_id: S) -> Self {
        Self { tracking_id: tracking_id.into(), user_id: None, user_email: None, payload: Value::Null }
    }

    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_user_email<S: Into<String>>(mut self, user_email: S) -> Self {
        self.user_email = Some(user_email.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

//--------------------------------------     Notification      ---------------------------------------------------------
/// An entry in the append-only notifications collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: Option<String>,
    pub message: String,
    pub notification_type: NotificationType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Option<String>,
    pub message: String,
    pub notification_type: NotificationType,
}

impl NewNotification {
    /// The notification recorded when an order moves to `status`.
    pub fn status_change(user_id: Option<String>, tracking_id: &str, status: OrderStatus) -> Self {
        Self {
            user_id,
            message: format!("Your order #{tracking_id} has been marked as {status}."),
            notification_type: status.into(),
        }
    }
}
