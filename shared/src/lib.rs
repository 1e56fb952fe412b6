//! Shared types for the storefront order system
//!
//! Common types used across the engine and presentation tiers including
//! the order domain model, status-history records, error types, and the
//! unified response envelope.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    CreateOrder, NewHistoryEntry, Order, OrderItem, OrderItemInput, OrderStatus,
    OrderStatusHistory,
};
