use thiserror::Error;

use super::status::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Order not found")]
    NotFound,
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Failure talking to the product service. Never surfaced to API callers;
/// the stock reconciler logs it and moves on.
#[derive(Debug, Error)]
pub enum StockError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("product service returned status {0}")]
    Status(u16),
    #[error("unexpected product payload: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_both_statuses() {
        let err = DomainError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Confirmed,
        };
        assert_eq!(
            err.to_string(),
            "Cannot transition from delivered to confirmed"
        );
    }

    #[test]
    fn validation_display() {
        assert_eq!(
            DomainError::Validation("no items".to_string()).to_string(),
            "Validation failed: no items"
        );
    }

    #[test]
    fn stock_status_error_names_the_code() {
        assert_eq!(
            StockError::Status(503).to_string(),
            "product service returned status 503"
        );
    }
}
