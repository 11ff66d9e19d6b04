use bigdecimal::BigDecimal;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::order::Order;
use super::status::OrderStatus;

pub const ORDER_CREATED: &str = "order.created";
pub const ORDER_STATUS_CHANGED: &str = "order.status_changed";
pub const ORDER_PAYMENT_CONFIRMED: &str = "order.payment_confirmed";

const PAYMENT_SUCCESS_MESSAGE: &str = "Payment successful - Order confirmed and ready for shipment";

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub user_id: i64,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    /// Number of line items.
    pub items: usize,
    pub timestamp: String,
}

impl OrderCreated {
    pub fn new(order: &Order, at: DateTime<Utc>) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            total_amount: order.total_amount.clone(),
            status: order.status,
            items: order.item_count(),
            timestamp: rfc3339(at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusChanged {
    pub order_id: Uuid,
    pub user_id: i64,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub total_amount: BigDecimal,
    pub item_count: usize,
    pub timestamp: String,
    pub message: String,
}

impl OrderStatusChanged {
    pub fn new(order: &Order, old_status: OrderStatus, new_status: OrderStatus, at: DateTime<Utc>) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            old_status,
            new_status,
            total_amount: order.total_amount.clone(),
            item_count: order.item_count(),
            timestamp: rfc3339(at),
            message: status_change_message(old_status, new_status).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentConfirmed {
    pub order_id: Uuid,
    pub user_id: i64,
    pub total_amount: BigDecimal,
    pub payment_method: String,
    pub item_count: usize,
    pub timestamp: String,
    pub message: String,
}

impl PaymentConfirmed {
    pub fn new(order: &Order, payment_method: &str, at: DateTime<Utc>) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            total_amount: order.total_amount.clone(),
            payment_method: payment_method.to_string(),
            item_count: order.item_count(),
            timestamp: rfc3339(at),
            message: PAYMENT_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Human readable summary carried by `order.status_changed`.
///
/// Cancellation of a confirmed order and return of a delivered order are the
/// two transitions that put stock back, and their wording says so.
pub fn status_change_message(old: OrderStatus, new: OrderStatus) -> &'static str {
    match (old, new) {
        (OrderStatus::AwaitingPayment, OrderStatus::Confirmed) => {
            "Order confirmed - Payment received, stock reduced"
        }
        (_, OrderStatus::Shipped) => "Order has been shipped and is on its way",
        (_, OrderStatus::Delivered) => "Order has been delivered to customer",
        (OrderStatus::Confirmed, OrderStatus::Cancelled) => {
            "Order has been cancelled and stock has been restored"
        }
        (_, OrderStatus::Cancelled) => "Order has been cancelled",
        (OrderStatus::Delivered, OrderStatus::Returned) => {
            "Order has been returned by customer and stock has been restored"
        }
        (_, OrderStatus::Returned) => "Order has been returned",
        _ => "Order status updated",
    }
}
