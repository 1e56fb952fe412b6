//! Order Status History Repository
//!
//! Append-only audit records. Entries are never updated or deleted; the
//! repository assigns a monotonic sequence number on append, seeded from the
//! stored maximum at construction so reopened databases keep the ordering.

use super::{BaseRepository, RepoError, RepoResult};
use crate::store::{HistoryStore, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{NewHistoryEntry, OrderStatus, OrderStatusHistory};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order_status_history";

#[derive(Clone)]
pub struct HistoryRepository {
    base: BaseRepository,
    seq: Arc<AtomicU64>,
}

#[derive(Debug, Serialize)]
struct HistoryContent {
    order_id: String,
    seq: u64,
    status: OrderStatus,
    notes: Option<String>,
    changed_by: Option<String>,
    created_at: i64,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    id: RecordId,
    order_id: String,
    seq: u64,
    status: OrderStatus,
    notes: Option<String>,
    changed_by: Option<String>,
    created_at: i64,
}

impl From<HistoryRow> for OrderStatusHistory {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id.key().to_string(),
            order_id: row.order_id,
            seq: row.seq,
            status: row.status,
            notes: row.notes,
            changed_by: row.changed_by,
            created_at: row.created_at,
        }
    }
}

impl HistoryRepository {
    /// Open the repository, seeding the sequence counter from stored entries
    pub async fn new(db: Surreal<Db>) -> RepoResult<Self> {
        let base = BaseRepository::new(db);
        let max_seq: Vec<u64> = base
            .db()
            .query("SELECT VALUE seq FROM order_status_history ORDER BY seq DESC LIMIT 1")
            .await?
            .take(0)?;
        let seq = max_seq.into_iter().next().unwrap_or(0);
        Ok(Self {
            base,
            seq: Arc::new(AtomicU64::new(seq)),
        })
    }

    /// Append one entry (id, seq and timestamp assigned here)
    pub async fn create(&self, entry: NewHistoryEntry) -> RepoResult<OrderStatusHistory> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let content = HistoryContent {
            order_id: entry.order_id,
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            status: entry.status,
            notes: entry.notes,
            changed_by: entry.changed_by,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        let row: Option<HistoryRow> = self.base.db().create((TABLE, id)).content(content).await?;
        row.map(Into::into)
            .ok_or_else(|| RepoError::Database("Create returned no record".to_string()))
    }

    /// All entries for one order, newest first
    pub async fn find_by_order(&self, order_id: &str) -> RepoResult<Vec<OrderStatusHistory>> {
        let rows: Vec<HistoryRow> = self
            .base
            .db()
            .query(
                "SELECT * FROM order_status_history \
                 WHERE order_id = $order_id \
                 ORDER BY created_at DESC, seq DESC",
            )
            .bind(("order_id", order_id.to_string()))
            .await?
            .take(0)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl HistoryStore for HistoryRepository {
    async fn append(&self, entry: NewHistoryEntry) -> StoreResult<OrderStatusHistory> {
        Ok(self.create(entry).await?)
    }

    async fn list_by_order(&self, order_id: &str) -> StoreResult<Vec<OrderStatusHistory>> {
        Ok(self.find_by_order(order_id).await?)
    }
}
