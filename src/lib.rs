pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use domain::ports::{EventPublisher, OrderStore, StockClient};
use infrastructure::kafka::KafkaEventPublisher;
use infrastructure::order_store::DieselOrderStore;
use infrastructure::stock_client::HttpStockClient;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The service as wired in production.
pub type AppOrderService = OrderService<DieselOrderStore, HttpStockClient, KafkaEventPublisher>;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::list_user_orders,
        handlers::orders::update_order_status,
        handlers::orders::pay_order,
        handlers::orders::metrics_snapshot,
    ),
    components(schemas(
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderItemRequest,
        handlers::orders::UpdateStatusRequest,
        handlers::orders::PaymentRequest,
        handlers::orders::OrderResponse,
        handlers::orders::OrderItemResponse,
        domain::status::OrderStatus,
    )),
    tags(
        (name = "orders", description = "Order lifecycle"),
    )
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for migration in applied {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server<S, C, P>(
    service: web::Data<OrderService<S, C, P>>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server>
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(handlers::configure::<S, C, P>)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
