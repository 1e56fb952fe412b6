//! Store interfaces for orders and status history
//!
//! The engine talks to persistence through these object-safe traits so the
//! backing store (embedded SurrealDB, in-memory, or an external platform)
//! can be swapped without touching lifecycle logic.

pub mod memory;

pub use memory::{MemoryHistoryStore, MemoryOrderStore};

use async_trait::async_trait;
use shared::models::{NewHistoryEntry, Order, OrderStatus, OrderStatusHistory};
use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Revision mismatch: expected {expected}, found {found}")]
    RevisionMismatch { expected: u64, found: u64 },

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Field changes applied to an order by a status transition
///
/// `notes`: when `Some`, replaces the order's notes; when `None`, the
/// existing notes are kept.
#[derive(Debug, Clone)]
pub struct StatusPatch {
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// Unix milliseconds
    pub updated_at: i64,
}

/// Mutable current-state store for orders
///
/// No delete: orders are never hard-deleted, terminal states end the
/// lifecycle instead.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch one order by id
    async fn get(&self, id: &str) -> StoreResult<Option<Order>>;

    /// List orders, optionally filtered by owning company, newest first
    async fn list(&self, company_id: Option<&str>) -> StoreResult<Vec<Order>>;

    /// Insert a new order; rejects duplicate ids
    async fn insert(&self, order: Order) -> StoreResult<Order>;

    /// Update status fields with a compare-and-swap on `revision`
    ///
    /// Returns [`StoreError::RevisionMismatch`] when the stored revision no
    /// longer equals `expected_revision`; the caller must reload and retry.
    async fn update(
        &self,
        id: &str,
        patch: StatusPatch,
        expected_revision: u64,
    ) -> StoreResult<Order>;
}

/// Append-only store for status-change audit records
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one entry; the store assigns id, sequence number and timestamp
    async fn append(&self, entry: NewHistoryEntry) -> StoreResult<OrderStatusHistory>;

    /// All entries for one order, newest first (created_at desc, seq desc)
    async fn list_by_order(&self, order_id: &str) -> StoreResult<Vec<OrderStatusHistory>>;
}
