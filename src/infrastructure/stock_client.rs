use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use crate::domain::errors::StockError;
use crate::domain::ports::StockClient;

impl From<reqwest::Error> for StockError {
    fn from(e: reqwest::Error) -> Self {
        StockError::Transport(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ProductStock {
    stock: i64,
}

fn ensure_success(response: Response) -> Result<Response, StockError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StockError::Status(status.as_u16()))
    }
}

/// Product service stock endpoints over HTTP.
///
/// Every request carries the same fixed timeout; a timeout surfaces as
/// `StockError::Transport`.
pub struct HttpStockClient {
    base_url: String,
    http: Client,
}

impl HttpStockClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StockError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn product_url(&self, product_id: i64) -> String {
        format!("{}/products/{}", self.base_url, product_id)
    }
}

impl StockClient for HttpStockClient {
    /// Read-then-write: the remote side has no decrement endpoint, so a
    /// concurrent update between the two calls is lost.
    fn reduce(&self, product_id: i64, quantity: i32) -> Result<(), StockError> {
        let response = ensure_success(self.http.get(self.product_url(product_id)).send()?)?;
        let product: ProductStock = response
            .json()
            .map_err(|e| StockError::Decode(e.to_string()))?;

        let new_stock = (product.stock - i64::from(quantity)).max(0);
        ensure_success(
            self.http
                .patch(format!("{}/stock", self.product_url(product_id)))
                .json(&json!({ "stock": new_stock }))
                .send()?,
        )?;
        log::debug!(
            "Reduced stock for product {} from {} to {}",
            product_id,
            product.stock,
            new_stock
        );
        Ok(())
    }

    fn restore(&self, product_id: i64, quantity: i32) -> Result<(), StockError> {
        ensure_success(
            self.http
                .post(format!("{}/stock/restore", self.product_url(product_id)))
                .json(&json!({ "quantity": quantity }))
                .send()?,
        )?;
        log::debug!("Restored {} units of product {}", quantity, product_id);
        Ok(())
    }
}
