use std::sync::Arc;
use std::time::Instant;

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::metrics::OrderMetrics;
use super::stock::StockReconciler;
use crate::domain::errors::DomainError;
use crate::domain::events::{
    OrderCreated, OrderStatusChanged, PaymentConfirmed, ORDER_CREATED, ORDER_PAYMENT_CONFIRMED,
    ORDER_STATUS_CHANGED,
};
use crate::domain::order::{check_amounts, NewOrderItem, Order, OrderFilter};
use crate::domain::ports::{EventPublisher, OrderStore, StockClient};
use crate::domain::status::{is_allowed, OrderStatus};

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn validate_items(items: &[NewOrderItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }
    for item in items {
        if item.quantity <= 0 {
            return Err(DomainError::Validation(format!(
                "Quantity for product {} must be positive, got {}",
                item.product_id, item.quantity
            )));
        }
        if item.price <= BigDecimal::zero() {
            return Err(DomainError::Validation(format!(
                "Price for product {} must be positive, got {}",
                item.product_id, item.price
            )));
        }
    }
    check_amounts(items)
}

/// Transitions that put reserved stock back into the catalog.
fn restore_reason(from: OrderStatus, to: OrderStatus) -> Option<&'static str> {
    match (from, to) {
        (OrderStatus::Confirmed, OrderStatus::Cancelled) => Some("order cancellation"),
        (OrderStatus::Delivered, OrderStatus::Returned) => Some("order return"),
        _ => None,
    }
}

/// Order lifecycle orchestration.
///
/// Every state-changing operation runs the same fixed pipeline: validate,
/// commit through the store, then adjust remote stock and publish events.
/// Nothing after the commit can fail the operation or undo the commit.
pub struct OrderService<S, C, P> {
    store: S,
    stock: StockReconciler<C>,
    publisher: P,
    metrics: Arc<OrderMetrics>,
}

impl<S, C, P> OrderService<S, C, P>
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    pub fn new(store: S, stock_client: C, publisher: P, metrics: Arc<OrderMetrics>) -> Self {
        Self {
            store,
            stock: StockReconciler::new(stock_client),
            publisher,
            metrics,
        }
    }

    pub fn metrics(&self) -> &OrderMetrics {
        &self.metrics
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stock(&self) -> &StockReconciler<C> {
        &self.stock
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn create_order(&self, user_id: i64, items: Vec<NewOrderItem>) -> Result<Order, DomainError> {
        self.metered("create_order", || {
            validate_items(&items)?;
            let order = self.timed_store(|store| store.create(user_id, &items))?;
            self.metrics.record_order_created();
            self.metrics.record_status(order.status);
            log::info!(
                "Created order {} for user {} ({} items, total {})",
                order.id,
                order.user_id,
                order.item_count(),
                order.total_amount
            );

            self.emit(ORDER_CREATED, order.id, &OrderCreated::new(&order, Utc::now()));
            Ok(order)
        })
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.metered("get_order", || self.timed_store(|store| store.find(id)))
    }

    pub fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, DomainError> {
        self.metered("list_orders", || self.timed_store(|store| store.list(filter)))
    }

    /// Move an order along the status graph. Confirmation is reserved for
    /// [`Self::confirm_payment`].
    pub fn change_status(&self, id: Uuid, requested: OrderStatus) -> Result<Order, DomainError> {
        self.metered("change_status", || {
            let current = self.timed_store(|store| store.find(id))?;
            let from = current.status;
            if !is_allowed(from, requested) {
                return Err(DomainError::InvalidTransition { from, to: requested });
            }
            if requested == OrderStatus::Confirmed {
                return Err(DomainError::InvalidState(
                    "Orders are confirmed by payment, not by status update".to_string(),
                ));
            }

            let updated = self.timed_store(|store| store.set_status(id, requested))?;
            self.metrics.record_status(requested);
            log::info!("Order {} moved from {} to {}", id, from, requested);

            if let Some(reason) = restore_reason(from, requested) {
                let report = self.stock.restore_for(&current, reason);
                self.metrics.record_stock_restored(report.succeeded as u64);
                log::info!(
                    "Restored stock for {}/{} items of order {} ({})",
                    report.succeeded,
                    report.attempted,
                    id,
                    reason
                );
            }

            self.emit(
                ORDER_STATUS_CHANGED,
                id,
                &OrderStatusChanged::new(&updated, from, requested, Utc::now()),
            );
            Ok(updated)
        })
    }

    pub fn confirm_payment(&self, id: Uuid, payment_method: &str) -> Result<Order, DomainError> {
        self.metered("confirm_payment", || {
            let current = self.timed_store(|store| store.find(id))?;
            if current.status != OrderStatus::AwaitingPayment {
                return Err(DomainError::InvalidState(
                    "Order is not awaiting payment".to_string(),
                ));
            }

            let updated = self.timed_store(|store| store.confirm_payment(id))?;
            self.metrics.record_status(OrderStatus::Confirmed);
            log::info!("Payment confirmed for order {} via {}", id, payment_method);

            let report = self.stock.reduce_for(&updated);
            if report.failed > 0 {
                log::warn!(
                    "Stock reduction incomplete for order {}: {} of {} items failed",
                    id,
                    report.failed,
                    report.attempted
                );
            }

            let now = Utc::now();
            self.emit(
                ORDER_PAYMENT_CONFIRMED,
                id,
                &PaymentConfirmed::new(&updated, payment_method, now),
            );
            self.emit(
                ORDER_STATUS_CHANGED,
                id,
                &OrderStatusChanged::new(
                    &updated,
                    OrderStatus::AwaitingPayment,
                    OrderStatus::Confirmed,
                    now,
                ),
            );
            Ok(updated)
        })
    }

    fn metered<T, F>(&self, operation: &str, f: F) -> Result<T, DomainError>
    where
        F: FnOnce() -> Result<T, DomainError>,
    {
        let started = Instant::now();
        let result = f();
        self.metrics.record_request(result.is_err(), elapsed_ms(started));
        if let Err(e) = &result {
            log::debug!("{} failed: {}", operation, e);
        }
        result
    }

    fn timed_store<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&S) -> Result<T, DomainError>,
    {
        let started = Instant::now();
        let result = f(&self.store);
        self.metrics.record_database_latency(elapsed_ms(started));
        result
    }

    fn emit<E: Serialize>(&self, topic: &str, order_id: Uuid, event: &E) {
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to serialize {} event for order {}: {}", topic, order_id, e);
                return;
            }
        };
        let started = Instant::now();
        self.publisher.publish(topic, &order_id.to_string(), &payload);
        self.metrics.record_kafka_latency(elapsed_ms(started));
    }
}
