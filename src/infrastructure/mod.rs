pub mod kafka;
pub mod models;
pub mod order_store;
pub mod stock_client;
