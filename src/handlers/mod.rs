pub mod health;
pub mod orders;

use actix_web::web;

use crate::domain::ports::{EventPublisher, OrderStore, StockClient};

/// Register every route against an `OrderService<S, C, P>` stored in app data.
pub fn configure<S, C, P>(cfg: &mut web::ServiceConfig)
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(orders::metrics_snapshot::<S, C, P>))
        .service(
            web::scope("/orders")
                .route("", web::post().to(orders::create_order::<S, C, P>))
                .route("", web::get().to(orders::list_orders::<S, C, P>))
                .route("/user/{user_id}", web::get().to(orders::list_user_orders::<S, C, P>))
                .route("/{id}", web::get().to(orders::get_order::<S, C, P>))
                .route("/{id}/status", web::patch().to(orders::update_order_status::<S, C, P>))
                .route("/{id}/pay", web::post().to(orders::pay_order::<S, C, P>)),
        );
}
