//! Order Repository
//!
//! Current-state order records. Mutations are restricted to the status patch
//! used by the lifecycle engine; the update is a compare-and-swap on the
//! revision counter.

use super::{BaseRepository, RepoError, RepoResult};
use crate::store::{OrderStore, StatusPatch, StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderItem, OrderStatus};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

/// Stored order fields (record id lives outside the content)
#[derive(Debug, Serialize)]
struct OrderContent {
    company_id: String,
    customer_name: String,
    customer_phone: Option<String>,
    customer_email: Option<String>,
    customer_address: Option<String>,
    items: Vec<OrderItem>,
    total_amount: f64,
    status: OrderStatus,
    notes: Option<String>,
    revision: u64,
    created_at: i64,
    updated_at: i64,
}

impl From<&Order> for OrderContent {
    fn from(order: &Order) -> Self {
        Self {
            company_id: order.company_id.clone(),
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            customer_email: order.customer_email.clone(),
            customer_address: order.customer_address.clone(),
            items: order.items.clone(),
            total_amount: order.total_amount,
            status: order.status,
            notes: order.notes.clone(),
            revision: order.revision,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    id: RecordId,
    company_id: String,
    customer_name: String,
    customer_phone: Option<String>,
    customer_email: Option<String>,
    customer_address: Option<String>,
    items: Vec<OrderItem>,
    total_amount: f64,
    status: OrderStatus,
    notes: Option<String>,
    revision: u64,
    created_at: i64,
    updated_at: i64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id.key().to_string(),
            company_id: row.company_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_email: row.customer_email,
            customer_address: row.customer_address,
            items: row.items,
            total_amount: row.total_amount,
            status: row.status,
            notes: row.notes,
            revision: row.revision,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let row: Option<OrderRow> = self.base.db().select((TABLE, id)).await?;
        Ok(row.map(Into::into))
    }

    /// Find all orders, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let rows: Vec<OrderRow> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Find all orders owned by one company, newest first
    pub async fn find_by_company(&self, company_id: &str) -> RepoResult<Vec<Order>> {
        let rows: Vec<OrderRow> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE company_id = $company ORDER BY created_at DESC")
            .bind(("company", company_id.to_string()))
            .await?
            .take(0)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a new order record
    pub async fn create(&self, order: &Order) -> RepoResult<Order> {
        if self.find_by_id(&order.id).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Order {} already exists",
                order.id
            )));
        }
        let row: Option<OrderRow> = self
            .base
            .db()
            .create((TABLE, order.id.clone()))
            .content(OrderContent::from(order))
            .await?;
        row.map(Into::into)
            .ok_or_else(|| RepoError::Database("Create returned no record".to_string()))
    }

    /// Apply a status patch if the stored revision still matches
    ///
    /// Returns `Ok(None)` when the conditioned update matched no record,
    /// which means the order is either missing or at a different revision.
    async fn update_checked(
        &self,
        id: &str,
        patch: &StatusPatch,
        expected_revision: u64,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('order', $key) SET \
                    status = $status, \
                    notes = $notes ?? notes, \
                    updated_at = $updated_at, \
                    revision = revision + 1 \
                 WHERE revision = $expected RETURN AFTER",
            )
            .bind(("key", id.to_string()))
            .bind(("status", patch.status))
            .bind(("notes", patch.notes.clone()))
            .bind(("updated_at", patch.updated_at))
            .bind(("expected", expected_revision))
            .await?;
        let rows: Vec<OrderRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(Into::into))
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn get(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(self.find_by_id(id).await?)
    }

    async fn list(&self, company_id: Option<&str>) -> StoreResult<Vec<Order>> {
        let orders = match company_id {
            Some(company) => self.find_by_company(company).await?,
            None => self.find_all().await?,
        };
        Ok(orders)
    }

    async fn insert(&self, order: Order) -> StoreResult<Order> {
        Ok(self.create(&order).await?)
    }

    async fn update(
        &self,
        id: &str,
        patch: StatusPatch,
        expected_revision: u64,
    ) -> StoreResult<Order> {
        if let Some(order) = self.update_checked(id, &patch, expected_revision).await? {
            return Ok(order);
        }
        // No record matched: missing order or stale revision
        match self.find_by_id(id).await? {
            None => Err(StoreError::NotFound(format!("Order {} not found", id))),
            Some(current) => Err(StoreError::RevisionMismatch {
                expected: expected_revision,
                found: current.revision,
            }),
        }
    }
}
