//! Order model and status state graph

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order fulfillment status
///
/// The forward path is `Pending → Confirmed → Preparing → Ready → Delivered`.
/// `Cancelled` is reachable from every non-terminal state. `Delivered` and
/// `Cancelled` are terminal: no further transitions are permitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether this status permits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The single forward successor in the fulfillment path, if any
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Whether `target` is reachable from this status in one transition
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if target == OrderStatus::Cancelled {
            return true;
        }
        self.next() == Some(target)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Confirmed => write!(f, "CONFIRMED"),
            OrderStatus::Preparing => write!(f, "PREPARING"),
            OrderStatus::Ready => write!(f, "READY"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Order line item (product snapshot at order time)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product reference (String ID)
    pub product_id: String,
    /// Product name snapshot
    pub name: String,
    pub quantity: i32,
    /// Unit price in currency unit
    pub unit_price: f64,
}

/// Order entity
///
/// The current-state record for one customer purchase request. Mutated only
/// through the lifecycle engine; the status field is the source of truth for
/// "current status" (the history log is a derived audit trail).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Owning company reference
    pub company_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub items: Vec<OrderItem>,
    /// Total amount in currency unit
    pub total_amount: f64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// Optimistic-concurrency counter, bumped on every status update
    pub revision: u64,
    /// Unix milliseconds
    pub created_at: i64,
    /// Unix milliseconds
    pub updated_at: i64,
}

/// Line item input for order creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(length(min = 1, message = "product id is required"))]
    pub product_id: String,
    #[validate(length(min = 1, message = "product name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(min = 0.0, message = "unit price must not be negative"))]
    pub unit_price: f64,
}

impl From<OrderItemInput> for OrderItem {
    fn from(input: OrderItemInput) -> Self {
        Self {
            product_id: input.product_id,
            name: input.name,
            quantity: input.quantity,
            unit_price: input.unit_price,
        }
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrder {
    #[validate(length(min = 1, message = "company id is required"))]
    pub company_id: String,
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<OrderItemInput>,
    /// Total amount in currency unit
    #[validate(range(min = 0.0, message = "total must not be negative"))]
    pub total_amount: f64,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_forward_path() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
        ] {
            assert!(
                status.can_transition_to(OrderStatus::Cancelled),
                "{status} should allow cancellation"
            );
        }
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Preparing));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Ready));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Preparing));
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());

        for target in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Delivered.can_transition_to(target));
            assert!(!OrderStatus::Cancelled.can_transition_to(target));
        }
    }

    #[test]
    fn test_self_transition_rejected() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Confirmed));
    }

    #[test]
    fn test_status_serde_format() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");

        let status: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }

    fn valid_input() -> CreateOrder {
        CreateOrder {
            company_id: "company-1".to_string(),
            customer_name: "Ada Lovelace".to_string(),
            customer_phone: Some("+34 600 000 000".to_string()),
            customer_email: Some("ada@example.com".to_string()),
            customer_address: None,
            items: vec![OrderItemInput {
                product_id: "prod-1".to_string(),
                name: "Espresso".to_string(),
                quantity: 2,
                unit_price: 1.5,
            }],
            total_amount: 3.0,
            notes: None,
        }
    }

    #[test]
    fn test_create_order_valid() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_create_order_requires_customer_name() {
        let mut input = valid_input();
        input.customer_name = String::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_order_requires_items() {
        let mut input = valid_input();
        input.items.clear();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_order_rejects_zero_quantity() {
        let mut input = valid_input();
        input.items[0].quantity = 0;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_order_rejects_negative_total() {
        let mut input = valid_input();
        input.total_amount = -1.0;
        assert!(input.validate().is_err());
    }
}
