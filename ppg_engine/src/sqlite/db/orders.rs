use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderStatus},
    traits::StoreError,
};

/// Returns the order with the given tracking id, if there is one.
pub async fn fetch_order_by_tracking_id(
    tracking_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE tracking_id = $1")
        .bind(tracking_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Sets the status of an existing order in a single statement. Nothing is inserted if the order does not exist.
pub async fn update_order_status(
    tracking_id: &str,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, updated_at = $2
            WHERE tracking_id = $3
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(Utc::now())
    .bind(tracking_id)
    .fetch_optional(conn)
    .await?;
    let order = order.ok_or_else(|| StoreError::OrderNotFound(tracking_id.to_string()))?;
    trace!("🗃️ Order {tracking_id} status set to {status}");
    Ok(order)
}

/// Inserts the order with status `pending`, returning `false` in the second parameter if the order already exists.
/// An existing order is never modified.
pub async fn idempotent_insert(order: NewOrder, conn: &mut SqliteConnection) -> Result<(Order, bool), StoreError> {
    let payload = serde_json::to_string(&order.payload).map_err(|e| StoreError::DatabaseError(e.to_string()))?;
    let now = Utc::now();
    let inserted: Option<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (tracking_id, status, user_id, user_email, payload, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (tracking_id) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(&order.tracking_id)
    .bind(OrderStatus::Pending)
    .bind(&order.user_id)
    .bind(&order.user_email)
    .bind(payload)
    .bind(now)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(o) => {
            debug!("🗃️ Order {} inserted with id {}", o.tracking_id, o.id);
            Ok((o, true))
        },
        None => {
            let existing = fetch_order_by_tracking_id(&order.tracking_id, conn)
                .await?
                .ok_or_else(|| StoreError::OrderNotFound(order.tracking_id.clone()))?;
            trace!("🗃️ Order {} already exists", existing.tracking_id);
            Ok((existing, false))
        },
    }
}
