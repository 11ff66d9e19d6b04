use serde_json::Value;
use uuid::Uuid;

use super::errors::{DomainError, StockError};
use super::order::{NewOrderItem, Order, OrderFilter};
use super::status::OrderStatus;

/// Transactional persistence of orders and their items.
pub trait OrderStore: Send + Sync + 'static {
    /// Insert the order and all of its items atomically. Fails with
    /// `Validation` when `items` is empty or an amount does not fit the
    /// stored money columns.
    fn create(&self, user_id: i64, items: &[NewOrderItem]) -> Result<Order, DomainError>;
    fn find(&self, id: Uuid) -> Result<Order, DomainError>;
    fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, DomainError>;
    /// Unconditionally overwrite the status. Transition legality is checked by the caller.
    fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError>;
    /// `awaiting_payment -> confirmed`, failing with `InvalidState` if the
    /// order has already moved on.
    fn confirm_payment(&self, id: Uuid) -> Result<Order, DomainError>;
}

/// Remote product service stock counters.
pub trait StockClient: Send + Sync + 'static {
    /// Decrease stock by `quantity`, never below zero.
    fn reduce(&self, product_id: i64, quantity: i32) -> Result<(), StockError>;
    fn restore(&self, product_id: i64, quantity: i32) -> Result<(), StockError>;
}

/// Fire-and-forget lifecycle event sink. Implementations log delivery
/// failures and never report them to the caller.
pub trait EventPublisher: Send + Sync + 'static {
    fn publish(&self, topic: &str, key: &str, payload: &Value);
}
