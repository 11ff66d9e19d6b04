pub mod metrics;
pub mod order_service;
pub mod stock;

#[cfg(test)]
pub(crate) mod testing;
