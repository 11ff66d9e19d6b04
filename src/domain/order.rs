use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::status::OrderStatus;

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price captured when the order was placed.
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: i64,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    ByUser(i64),
}

/// Decimal places kept by stored money columns.
const MONEY_SCALE: i64 = 2;
/// Smallest amount that no longer fits a `NUMERIC(12,2)` column.
const MONEY_LIMIT: i64 = 10_000_000_000;

/// Reject prices and totals that the stored money columns would round or
/// overflow, so the persisted total always equals the sum of persisted lines.
pub fn check_amounts(items: &[NewOrderItem]) -> Result<(), DomainError> {
    let limit = BigDecimal::from(MONEY_LIMIT);
    for item in items {
        if item.price.with_scale(MONEY_SCALE) != item.price {
            return Err(DomainError::Validation(format!(
                "Price for product {} has more than {} decimal places: {}",
                item.product_id, MONEY_SCALE, item.price
            )));
        }
        if item.price.clone() * BigDecimal::from(item.quantity) >= limit {
            return Err(DomainError::Validation(format!(
                "Line amount for product {} is too large",
                item.product_id
            )));
        }
    }
    if order_total(items) >= limit {
        return Err(DomainError::Validation("Order total is too large".to_string()));
    }
    Ok(())
}

/// Sum of `quantity * price` over the line items.
pub fn order_total(items: &[NewOrderItem]) -> BigDecimal {
    items.iter().fold(BigDecimal::zero(), |acc, item| {
        acc + item.price.clone() * BigDecimal::from(item.quantity)
    })
}
