//! `SqliteDatabase` is a concrete implementation of a reconciliation engine backend.
//!
//! It uses SQLite as the document store and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, migrate::MigrateError, SqlitePool};

use super::db::{ledger, new_pool, notifications, orders};
use crate::{
    db_types::{NewNotification, NewOrder, Notification, Order, OrderStatus},
    traits::{NotificationStore, OrderStore, ReconciliationDatabase, SideEffectLedger, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool to {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        debug!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderStore for SqliteDatabase {
    async fn fetch_order(&self, tracking_id: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_tracking_id(tracking_id, &mut conn).await?;
        Ok(order)
    }

    async fn update_order_status(&self, tracking_id: &str, status: OrderStatus) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(tracking_id, status, &mut conn).await
    }

    async fn insert_pending_order(&self, order: NewOrder) -> Result<(Order, bool), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(order, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }
}

impl NotificationStore for SqliteDatabase {
    async fn append_notification(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let record = notifications::insert_notification(notification, &mut conn).await?;
        trace!("🗃️ Notification #{} appended", record.id);
        Ok(record)
    }

    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let records = notifications::fetch_notifications_for_user(user_id, &mut conn).await?;
        Ok(records)
    }
}

impl SideEffectLedger for SqliteDatabase {
    async fn claim_side_effects(&self, tracking_id: &str, status: OrderStatus) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let claimed = ledger::claim(tracking_id, status, &mut conn).await?;
        Ok(claimed)
    }

    async fn release_side_effects(&self, tracking_id: &str, status: OrderStatus) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        ledger::release(tracking_id, status, &mut conn).await?;
        trace!("🗃️ Side effect claim for {tracking_id} ({status}) released");
        Ok(())
    }
}

impl ReconciliationDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}
