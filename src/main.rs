use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use dotenvy::dotenv;
use order_lifecycle::application::metrics::OrderMetrics;
use order_lifecycle::application::order_service::OrderService;
use order_lifecycle::config::Config;
use order_lifecycle::infrastructure::kafka::KafkaEventPublisher;
use order_lifecycle::infrastructure::order_store::DieselOrderStore;
use order_lifecycle::infrastructure::stock_client::HttpStockClient;
use order_lifecycle::{build_server, create_pool, run_migrations, AppOrderService};

// The blocking stock client owns its own runtime, so everything is built
// before the actix system starts and dropped after it stops.
fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url)?;
    run_migrations(&pool)?;

    let stock = HttpStockClient::new(&config.product_service_url, config.stock_timeout)?;
    let publisher = KafkaEventPublisher::new(&config.kafka_brokers, Duration::from_secs(5))?;
    let service: web::Data<AppOrderService> = web::Data::new(OrderService::new(
        DieselOrderStore::new(pool),
        stock,
        publisher,
        Arc::new(OrderMetrics::new()),
    ));

    log::info!(
        "Starting order service at http://{}:{}",
        config.host,
        config.port
    );

    actix_web::rt::System::new()
        .block_on(async { build_server(service.clone(), &config.host, config.port)?.await })?;

    service.publisher().flush(Duration::from_secs(5));
    log::info!("Order service stopped");
    Ok(())
}
