use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::OrderStatus;

/// Returns `true` if this call inserted the `(tracking_id, status)` entry, and `false` if it was already there.
pub async fn claim(tracking_id: &str, status: OrderStatus, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO side_effect_ledger (tracking_id, status, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (tracking_id, status) DO NOTHING;
        "#,
    )
    .bind(tracking_id)
    .bind(status)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn release(tracking_id: &str, status: OrderStatus, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM side_effect_ledger WHERE tracking_id = $1 AND status = $2")
        .bind(tracking_id)
        .bind(status)
        .execute(conn)
        .await?;
    Ok(())
}
