//! LifecycleEngine - status transition validation and the two-write contract
//!
//! The engine is the only writer for orders. Every mutation follows the same
//! ordered pair of writes: the order record first (source of truth), the
//! history entry second (derived audit log, best-effort). A failed history
//! append after a successful order write is reported as an audit gap on an
//! otherwise-successful outcome, never rolled back.

use crate::store::{HistoryStore, OrderStore, StatusPatch, StoreError};
use crate::timeline::TimelineReader;
use shared::error::{AppError, ErrorCode};
use shared::models::{CreateOrder, NewHistoryEntry, Order, OrderStatus, OrderStatusHistory};
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;


/// Resolves the identity performing a transition
///
/// Supplied by the external auth collaborator; the engine records the value
/// opaquely and never interprets it.
pub trait ActorResolver: Send + Sync {
    fn current_actor(&self) -> Option<String>;
}

/// Resolver for system-originated transitions (no actor)
pub struct SystemActor;

impl ActorResolver for SystemActor {
    fn current_actor(&self) -> Option<String> {
        None
    }
}

/// Resolver pinned to one identity, e.g. from an authenticated session
pub struct StaticActor(pub String);

impl ActorResolver for StaticActor {
    fn current_actor(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation(msg) => AppError::validation(msg),
            LifecycleError::InvalidTransition { from, to } => AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Cannot transition order from {} to {}", from, to),
            )
            .with_detail("from", from.to_string())
            .with_detail("to", to.to_string()),
            LifecycleError::NotFound(id) => AppError::order_not_found(id),
            LifecycleError::Conflict(msg) => AppError::conflict(msg),
            LifecycleError::Store(StoreError::Duplicate(msg)) => {
                AppError::with_message(ErrorCode::AlreadyExists, msg)
            }
            LifecycleError::Store(e) => AppError::database(e.to_string()),
        }
    }
}

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Outcome of a successful create or transition
///
/// The order write succeeded; `audit_gap` is set when the follow-up history
/// append failed. Callers surface the gap as a non-fatal warning so operators
/// can reconcile the audit log manually.
#[derive(Debug)]
pub struct TransitionOutcome {
    /// The order after the write (authoritative current state)
    pub order: Order,
    /// The appended history entry, if the append succeeded
    pub history: Option<OrderStatusHistory>,
    /// Why the history append failed, when it did
    pub audit_gap: Option<String>,
}

impl TransitionOutcome {
    /// True when both the order write and the history append succeeded
    pub fn is_complete(&self) -> bool {
        self.audit_gap.is_none()
    }
}

/// Validates and applies order status transitions
///
/// Holds the two stores and the actor resolver; see the crate docs for the
/// write path. Reads go through the embedded [`TimelineReader`].
pub struct LifecycleEngine {
    orders: Arc<dyn OrderStore>,
    history: Arc<dyn HistoryStore>,
    actors: Arc<dyn ActorResolver>,
    reader: TimelineReader,
}

impl LifecycleEngine {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        history: Arc<dyn HistoryStore>,
        actors: Arc<dyn ActorResolver>,
    ) -> Self {
        let reader = TimelineReader::new(orders.clone(), history.clone());
        Self {
            orders,
            history,
            actors,
            reader,
        }
    }

    /// Create a new order in `Pending` and record the initial history entry
    ///
    /// The order row must exist before the history row is attempted, so a
    /// failed insert leaves no partial state. The initial append follows the
    /// same best-effort contract as transitions.
    pub async fn create_order(&self, input: CreateOrder) -> LifecycleResult<TransitionOutcome> {
        input
            .validate()
            .map_err(|e| LifecycleError::Validation(e.to_string()))?;

        let now = chrono::Utc::now().timestamp_millis();
        let order = Order {
            id: uuid::Uuid::new_v4().simple().to_string(),
            company_id: input.company_id,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_email: input.customer_email,
            customer_address: input.customer_address,
            items: input.items.into_iter().map(Into::into).collect(),
            total_amount: input.total_amount,
            status: OrderStatus::Pending,
            notes: input.notes,
            revision: 0,
            created_at: now,
            updated_at: now,
        };

        let order = self.orders.insert(order).await?;
        tracing::info!(order_id = %order.id, company_id = %order.company_id, "order created");

        Ok(self
            .append_history(order, OrderStatus::Pending, Some("order created".to_string()))
            .await)
    }

    /// Apply one status transition
    ///
    /// Rejects targets not reachable from the current status (including any
    /// move out of a terminal state) without writing anything. The order
    /// update uses a compare-and-swap on the revision counter; a concurrent
    /// writer surfaces as [`LifecycleError::Conflict`] and the caller must
    /// retry with fresh state.
    pub async fn transition_status(
        &self,
        order_id: &str,
        target: OrderStatus,
        notes: Option<String>,
    ) -> LifecycleResult<TransitionOutcome> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(order_id.to_string()))?;

        if !order.status.can_transition_to(target) {
            return Err(LifecycleError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let patch = StatusPatch {
            status: target,
            notes: notes.clone(),
            updated_at: chrono::Utc::now().timestamp_millis(),
        };
        let updated = self
            .orders
            .update(order_id, patch, order.revision)
            .await
            .map_err(|e| match e {
                StoreError::RevisionMismatch { .. } => LifecycleError::Conflict(format!(
                    "Order {} was modified concurrently, retry with fresh state",
                    order_id
                )),
                StoreError::NotFound(msg) => LifecycleError::NotFound(msg),
                other => LifecycleError::Store(other),
            })?;
        tracing::info!(
            order_id = %updated.id,
            from = %order.status,
            to = %target,
            "order status updated"
        );

        Ok(self.append_history(updated, target, notes).await)
    }

    /// Fetch one order's current state
    pub async fn get_order(&self, order_id: &str) -> LifecycleResult<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(order_id.to_string()))
    }

    /// List orders, optionally filtered by owning company, newest first
    pub async fn list_orders(&self, company_id: Option<&str>) -> LifecycleResult<Vec<Order>> {
        Ok(self.orders.list(company_id).await?)
    }

    /// Full audit trail for one order, newest first
    ///
    /// Fails with [`LifecycleError::NotFound`] only when the order itself is
    /// unknown; a known order with no recorded history yields an empty
    /// sequence (history unavailable, not "no activity").
    pub async fn timeline(&self, order_id: &str) -> LifecycleResult<Vec<OrderStatusHistory>> {
        self.reader.timeline(order_id).await
    }

    /// Best-effort history append after a successful order write
    async fn append_history(
        &self,
        order: Order,
        status: OrderStatus,
        notes: Option<String>,
    ) -> TransitionOutcome {
        let entry = NewHistoryEntry::new(order.id.clone(), status)
            .with_notes(notes)
            .with_actor(self.actors.current_actor());

        match self.history.append(entry).await {
            Ok(history) => TransitionOutcome {
                order,
                history: Some(history),
                audit_gap: None,
            },
            Err(e) => {
                // The order record already changed; do not roll back silently.
                tracing::warn!(
                    order_id = %order.id,
                    status = %status,
                    error = %e,
                    "history append failed after order write, audit log has a gap"
                );
                TransitionOutcome {
                    order,
                    history: None,
                    audit_gap: Some(e.to_string()),
                }
            }
        }
    }
}
