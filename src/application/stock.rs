pub use crate::domain::errors::StockError;
use crate::domain::order::Order;
use crate::domain::ports::StockClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Best-effort stock adjustment driven by order transitions.
///
/// Each item is adjusted independently. A failed call is logged with the
/// product id, quantity and reason; there is no retry and no compensation.
pub struct StockReconciler<C> {
    client: C,
}

impl<C: StockClient> StockReconciler<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn reduce_for(&self, order: &Order) -> ReconcileReport {
        self.apply(order, "payment confirmation", |c, product_id, qty| {
            c.reduce(product_id, qty)
        })
    }

    pub fn restore_for(&self, order: &Order, reason: &str) -> ReconcileReport {
        self.apply(order, reason, |c, product_id, qty| c.restore(product_id, qty))
    }

    fn apply<F>(&self, order: &Order, reason: &str, call: F) -> ReconcileReport
    where
        F: Fn(&C, i64, i32) -> Result<(), StockError>,
    {
        let mut report = ReconcileReport::default();
        for item in &order.items {
            report.attempted += 1;
            match call(&self.client, item.product_id, item.quantity) {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    log::warn!(
                        "Failed to adjust stock for product {} (quantity {}, order {}, {}): {}",
                        item.product_id,
                        item.quantity,
                        order.id,
                        reason,
                        e
                    );
                }
            }
        }
        report
    }
}
