use crate::{
    db_types::{NewNotification, Notification},
    traits::StoreError,
};

/// The notifications collection is append-only. Records are never updated or deleted.
#[allow(async_fn_in_trait)]
pub trait NotificationStore {
    async fn append_notification(&self, notification: NewNotification) -> Result<Notification, StoreError>;

    /// All notifications for the given user, oldest first.
    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, StoreError>;
}
