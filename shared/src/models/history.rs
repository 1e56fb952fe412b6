//! Order status history - immutable audit records

use super::order::OrderStatus;
use serde::{Deserialize, Serialize};

/// One immutable audit record per status transition
///
/// Entries are append-only: never updated or deleted. The sequence number is
/// assigned by the history store in insertion order and breaks timestamp ties,
/// so `(created_at, seq)` gives a strict total order per order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderStatusHistory {
    pub id: String,
    /// Order this entry belongs to
    pub order_id: String,
    /// Monotonic sequence number assigned by the history store
    pub seq: u64,
    /// The status the order entered
    pub status: OrderStatus,
    /// Reason or comment attached to the transition
    pub notes: Option<String>,
    /// Actor who triggered the transition; None for system-originated entries
    pub changed_by: Option<String>,
    /// Unix milliseconds, assigned by the history store
    pub created_at: i64,
}

/// New history entry payload (id, seq and created_at are assigned by the store)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub order_id: String,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub changed_by: Option<String>,
}

impl NewHistoryEntry {
    pub fn new(order_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            status,
            notes: None,
            changed_by: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.changed_by = actor;
        self
    }
}
