use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewNotification, Notification};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    let record = sqlx::query_as(
        r#"
            INSERT INTO notifications (user_id, message, notification_type, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.message)
    .bind(notification.notification_type)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(record)
}

/// Notifications for the user, ordered by insertion.
pub async fn fetch_notifications_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications = sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(notifications)
}
