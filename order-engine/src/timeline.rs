//! Timeline reconstruction - the read side of the audit trail

use crate::engine::LifecycleError;
use crate::store::{HistoryStore, OrderStore};
use shared::models::OrderStatusHistory;
use std::sync::Arc;

/// Reconstructs an order's full audit trail for display
///
/// Pure read path: entries come back newest first, matching the user-facing
/// contract (most recent event displayed first). An existing order with no
/// recorded history yields an empty sequence, which callers must treat as
/// "history unavailable" rather than "order has no activity".
#[derive(Clone)]
pub struct TimelineReader {
    orders: Arc<dyn OrderStore>,
    history: Arc<dyn HistoryStore>,
}

impl TimelineReader {
    pub fn new(orders: Arc<dyn OrderStore>, history: Arc<dyn HistoryStore>) -> Self {
        Self { orders, history }
    }

    /// All history entries for one order, newest first
    pub async fn timeline(&self, order_id: &str) -> Result<Vec<OrderStatusHistory>, LifecycleError> {
        if self.orders.get(order_id).await?.is_none() {
            return Err(LifecycleError::NotFound(order_id.to_string()));
        }
        Ok(self.history.list_by_order(order_id).await?)
    }
}
