//! Order lifecycle engine
//!
//! This crate implements the order status lifecycle with an append-only
//! audit trail:
//!
//! - **store**: store interfaces (orders, history) plus an in-memory backend
//! - **db**: embedded SurrealDB repositories implementing the store traits
//! - **engine**: `LifecycleEngine` validating and applying status transitions
//! - **timeline**: read-side reconstruction of an order's audit trail
//!
//! # Write Path
//!
//! ```text
//! transition_status(order_id, target)
//!     ├─ 1. Load order (NotFound if unknown)
//!     ├─ 2. Validate transition against the state graph
//!     ├─ 3. Update order record (CAS on revision, source of truth)
//!     ├─ 4. Append history entry (best-effort audit log)
//!     └─ 5. Return outcome, flagging any audit gap
//! ```
//!
//! The order record and the history log are written by two independent
//! operations. The order write is authoritative: if the history append fails
//! afterwards, the transition still succeeded and the outcome carries the gap
//! so operators can reconcile.

pub mod db;
pub mod engine;
pub mod store;
pub mod timeline;

// Re-exports
pub use engine::{ActorResolver, LifecycleEngine, LifecycleError, StaticActor, SystemActor};
pub use engine::{LifecycleResult, TransitionOutcome};
pub use store::{HistoryStore, OrderStore, StatusPatch, StoreError, StoreResult};
pub use store::{MemoryHistoryStore, MemoryOrderStore};
pub use timeline::TimelineReader;

// Re-export shared types for convenience
pub use shared::models::{
    CreateOrder, NewHistoryEntry, Order, OrderItem, OrderItemInput, OrderStatus,
    OrderStatusHistory,
};
