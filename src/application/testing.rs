//! In-memory doubles for the domain ports, shared by unit tests.

use std::sync::Mutex;

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::{DomainError, StockError};
use crate::domain::order::{order_total, NewOrderItem, Order, OrderFilter, OrderItem};
use crate::domain::ports::{EventPublisher, OrderStore, StockClient};
use crate::domain::status::OrderStatus;

/// Build an order from `(product_id, quantity)` pairs priced at 10 each.
pub fn order_with_items(lines: &[(i64, i32)]) -> Order {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|&(product_id, quantity)| OrderItem {
            id: Uuid::new_v4(),
            order_id: id,
            product_id,
            quantity,
            price: BigDecimal::from(10),
            created_at: now,
        })
        .collect();
    Order {
        id,
        user_id: 1,
        total_amount: items
            .iter()
            .map(|i| i.price.clone() * BigDecimal::from(i.quantity))
            .sum(),
        status: OrderStatus::AwaitingPayment,
        created_at: now,
        updated_at: now,
        items,
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn order_count(&self) -> usize {
        self.orders.lock().map(|o| o.len()).unwrap_or_default()
    }

    fn update<F>(&self, id: Uuid, f: F) -> Result<Order, DomainError>
    where
        F: FnOnce(&mut Order) -> Result<(), DomainError>,
    {
        let mut orders = self
            .orders
            .lock()
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;
        f(order)?;
        Ok(order.clone())
    }
}

impl OrderStore for MemoryOrderStore {
    fn create(&self, user_id: i64, items: &[NewOrderItem]) -> Result<Order, DomainError> {
        if items.is_empty() {
            return Err(DomainError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }
        let now = Utc::now();
        let id = Uuid::new_v4();
        let order = Order {
            id,
            user_id,
            total_amount: order_total(items),
            status: OrderStatus::AwaitingPayment,
            created_at: now,
            updated_at: now,
            items: items
                .iter()
                .map(|i| OrderItem {
                    id: Uuid::new_v4(),
                    order_id: id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price.clone(),
                    created_at: now,
                })
                .collect(),
        };
        self.orders
            .lock()
            .map_err(|e| DomainError::Persistence(e.to_string()))?
            .push(order.clone());
        Ok(order)
    }

    fn find(&self, id: Uuid) -> Result<Order, DomainError> {
        self.update(id, |_| Ok(()))
    }

    fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, DomainError> {
        let orders = self
            .orders
            .lock()
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        let mut matching: Vec<Order> = orders
            .iter()
            .rev()
            .filter(|o| match filter {
                OrderFilter::All => true,
                OrderFilter::ByUser(user_id) => o.user_id == user_id,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        self.update(id, |order| {
            order.status = status;
            order.updated_at = Utc::now();
            Ok(())
        })
    }

    fn confirm_payment(&self, id: Uuid) -> Result<Order, DomainError> {
        self.update(id, |order| {
            if order.status != OrderStatus::AwaitingPayment {
                return Err(DomainError::InvalidState(
                    "Order is not awaiting payment".to_string(),
                ));
            }
            order.status = OrderStatus::Confirmed;
            order.updated_at = Utc::now();
            Ok(())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockCall {
    Reduce(i64, i32),
    Restore(i64, i32),
}

/// Records every call; products listed in `failing` return a transport error.
#[derive(Default)]
pub struct RecordingStockClient {
    calls: Mutex<Vec<StockCall>>,
    failing: Vec<i64>,
}

impl RecordingStockClient {
    pub fn failing_for(product_ids: &[i64]) -> Self {
        Self {
            calls: Mutex::default(),
            failing: product_ids.to_vec(),
        }
    }

    pub fn calls(&self) -> Vec<StockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: StockCall, product_id: i64) -> Result<(), StockError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.failing.contains(&product_id) {
            return Err(StockError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

impl StockClient for RecordingStockClient {
    fn reduce(&self, product_id: i64, quantity: i32) -> Result<(), StockError> {
        self.record(StockCall::Reduce(product_id, quantity), product_id)
    }

    fn restore(&self, product_id: i64, quantity: i32) -> Result<(), StockError> {
        self.record(StockCall::Restore(product_id, quantity), product_id)
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(String, String, Value)>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<(String, String, Value)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn topics(&self) -> Vec<String> {
        self.events().into_iter().map(|(topic, _, _)| topic).collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, topic: &str, key: &str, payload: &Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push((topic.to_string(), key.to_string(), payload.clone()));
        }
    }
}
