//! Domain models for the order lifecycle

pub mod history;
pub mod order;

// Re-exports
pub use history::{NewHistoryEntry, OrderStatusHistory};
pub use order::{CreateOrder, Order, OrderItem, OrderItemInput, OrderStatus};
