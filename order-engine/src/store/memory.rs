//! In-memory store backend
//!
//! Process-local implementation of the store traits, used by tests and by
//! callers embedding the engine without a database.

use super::{HistoryStore, OrderStore, StatusPatch, StoreError, StoreResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{NewHistoryEntry, Order, OrderStatusHistory};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory order store (HashMap keyed by order id)
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(self.orders.read().get(id).cloned())
    }

    async fn list(&self, company_id: Option<&str>) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read();
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| company_id.is_none_or(|c| o.company_id == c))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn insert(&self, order: Order) -> StoreResult<Order> {
        let mut orders = self.orders.write();
        if orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate(format!(
                "Order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn update(
        &self,
        id: &str,
        patch: StatusPatch,
        expected_revision: u64,
    ) -> StoreResult<Order> {
        let mut orders = self.orders.write();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("Order {} not found", id)))?;

        if order.revision != expected_revision {
            return Err(StoreError::RevisionMismatch {
                expected: expected_revision,
                found: order.revision,
            });
        }

        order.status = patch.status;
        if patch.notes.is_some() {
            order.notes = patch.notes;
        }
        order.updated_at = patch.updated_at;
        order.revision += 1;
        Ok(order.clone())
    }
}

/// In-memory append-only history store
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: RwLock<Vec<OrderStatusHistory>>,
    seq: AtomicU64,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all orders, for test assertions
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: NewHistoryEntry) -> StoreResult<OrderStatusHistory> {
        let record = OrderStatusHistory {
            id: uuid::Uuid::new_v4().simple().to_string(),
            order_id: entry.order_id,
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            status: entry.status,
            notes: entry.notes,
            changed_by: entry.changed_by,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.entries.write().push(record.clone());
        Ok(record)
    }

    async fn list_by_order(&self, order_id: &str) -> StoreResult<Vec<OrderStatusHistory>> {
        let entries = self.entries.read();
        let mut result: Vec<OrderStatusHistory> = entries
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderItem, OrderStatus};

    fn sample_order(id: &str, company: &str) -> Order {
        Order {
            id: id.to_string(),
            company_id: company.to_string(),
            customer_name: "Test Customer".to_string(),
            customer_phone: None,
            customer_email: None,
            customer_address: None,
            items: vec![OrderItem {
                product_id: "p1".to_string(),
                name: "Widget".to_string(),
                quantity: 1,
                unit_price: 9.5,
            }],
            total_amount: 9.5,
            status: OrderStatus::Pending,
            notes: None,
            revision: 0,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryOrderStore::new();
        store.insert(sample_order("o1", "c1")).await.unwrap();

        let order = store.get("o1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_rejected() {
        let store = MemoryOrderStore::new();
        store.insert(sample_order("o1", "c1")).await.unwrap();

        let err = store.insert(sample_order("o1", "c1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_company() {
        let store = MemoryOrderStore::new();
        store.insert(sample_order("o1", "c1")).await.unwrap();
        store.insert(sample_order("o2", "c2")).await.unwrap();
        store.insert(sample_order("o3", "c1")).await.unwrap();

        assert_eq!(store.list(None).await.unwrap().len(), 3);
        assert_eq!(store.list(Some("c1")).await.unwrap().len(), 2);
        assert_eq!(store.list(Some("c2")).await.unwrap().len(), 1);
        assert!(store.list(Some("c9")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_cas() {
        let store = MemoryOrderStore::new();
        store.insert(sample_order("o1", "c1")).await.unwrap();

        let patch = StatusPatch {
            status: OrderStatus::Confirmed,
            notes: Some("confirmed".to_string()),
            updated_at: 1_700_000_001_000,
        };
        let updated = store.update("o1", patch.clone(), 0).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.revision, 1);
        assert_eq!(updated.notes.as_deref(), Some("confirmed"));

        // Stale revision is rejected and leaves the record untouched
        let err = store.update("o1", patch, 0).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::RevisionMismatch {
                expected: 0,
                found: 1
            }
        ));
        let order = store.get("o1").await.unwrap().unwrap();
        assert_eq!(order.revision, 1);
    }

    #[tokio::test]
    async fn test_update_keeps_notes_when_none() {
        let store = MemoryOrderStore::new();
        store.insert(sample_order("o1", "c1")).await.unwrap();

        let first = StatusPatch {
            status: OrderStatus::Confirmed,
            notes: Some("keep me".to_string()),
            updated_at: 1,
        };
        store.update("o1", first, 0).await.unwrap();

        let second = StatusPatch {
            status: OrderStatus::Preparing,
            notes: None,
            updated_at: 2,
        };
        let updated = store.update("o1", second, 1).await.unwrap();
        assert_eq!(updated.notes.as_deref(), Some("keep me"));
    }

    #[tokio::test]
    async fn test_update_unknown_order() {
        let store = MemoryOrderStore::new();
        let patch = StatusPatch {
            status: OrderStatus::Confirmed,
            notes: None,
            updated_at: 0,
        };
        let err = store.update("missing", patch, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_history_append_assigns_sequence() {
        let store = MemoryHistoryStore::new();
        let a = store
            .append(NewHistoryEntry::new("o1", OrderStatus::Pending))
            .await
            .unwrap();
        let b = store
            .append(NewHistoryEntry::new("o1", OrderStatus::Confirmed))
            .await
            .unwrap();

        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 2);
        assert!(b.created_at >= a.created_at);
    }

    #[tokio::test]
    async fn test_history_newest_first_with_seq_tiebreak() {
        let store = MemoryHistoryStore::new();
        // Appended in the same millisecond in practice; seq must break ties
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
        ] {
            store
                .append(NewHistoryEntry::new("o1", status))
                .await
                .unwrap();
        }
        store
            .append(NewHistoryEntry::new("other", OrderStatus::Pending))
            .await
            .unwrap();

        let timeline = store.list_by_order("o1").await.unwrap();
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline[0].status, OrderStatus::Preparing);
        assert_eq!(timeline[1].status, OrderStatus::Confirmed);
        assert_eq!(timeline[2].status, OrderStatus::Pending);
        assert!(timeline[0].seq > timeline[1].seq);
    }
}
