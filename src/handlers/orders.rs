use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrderItem, Order, OrderFilter, OrderItem};
use crate::domain::ports::{EventPublisher, OrderStore, StockClient};
use crate::domain::status::OrderStatus;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(serde_json::Number),
    Text(String),
}

/// Accept prices as JSON numbers or decimal strings. A JSON number is held
/// as `f64` and converted from its shortest decimal form, so `29.99` parses
/// as `29.99`; a string is parsed as written.
fn deserialize_price<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(n) => n.to_string(),
        RawPrice::Text(s) => s,
    };
    BigDecimal::from_str(&text)
        .map_err(|e| serde::de::Error::custom(format!("invalid price '{}': {}", text, e)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price, as a number or a decimal string, e.g. "9.99"
    #[serde(deserialize_with = "deserialize_price")]
    #[schema(value_type = f64)]
    pub price: BigDecimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: i64,
    pub quantity: i32,
    pub price: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: i64,
    pub total_amount: String,
    pub status: OrderStatus,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price.to_string(),
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total_amount: order.total_amount.to_string(),
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

type Service<S, C, P> = web::Data<OrderService<S, C, P>>;

async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??)
}

fn order_list(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order in `awaiting_payment` with all of its items in one
/// transaction, then announces it on `order.created`.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Empty or malformed item list"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order<S, C, P>(
    service: Service<S, C, P>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError>
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    let body = body.into_inner();
    let items = body
        .items
        .into_iter()
        .map(|i| NewOrderItem {
            product_id: i.product_id,
            quantity: i.quantity,
            price: i.price,
        })
        .collect();

    let order = run_blocking(move || service.create_order(body.user_id, items)).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order<S, C, P>(
    service: Service<S, C, P>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError>
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    let order_id = path.into_inner();
    let order = run_blocking(move || service.get_order(order_id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// All orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders<S, C, P>(service: Service<S, C, P>) -> Result<HttpResponse, AppError>
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    let orders = run_blocking(move || service.list_orders(OrderFilter::All)).await?;
    Ok(HttpResponse::Ok().json(order_list(orders)))
}

/// GET /orders/user/{user_id}
#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    params(
        ("user_id" = i64, Path, description = "Owning user"),
    ),
    responses(
        (status = 200, description = "The user's orders, possibly empty", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_user_orders<S, C, P>(
    service: Service<S, C, P>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError>
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    let user_id = path.into_inner();
    let orders = run_blocking(move || service.list_orders(OrderFilter::ByUser(user_id))).await?;
    Ok(HttpResponse::Ok().json(order_list(orders)))
}

/// PATCH /orders/{id}/status
///
/// Ship, deliver, cancel or return an order. Cancelling a confirmed order
/// and returning a delivered one put stock back.
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status or disallowed transition"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status<S, C, P>(
    service: Service<S, C, P>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError>
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    let order_id = path.into_inner();
    let requested = OrderStatus::from_str(&body.status)
        .map_err(|e| AppError::from(DomainError::Validation(e.to_string())))?;

    let order = run_blocking(move || service.change_status(order_id, requested)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /orders/{id}/pay
#[utoipa::path(
    post,
    path = "/orders/{id}/pay",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment confirmed", body = OrderResponse),
        (status = 400, description = "Order is not awaiting payment"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn pay_order<S, C, P>(
    service: Service<S, C, P>,
    path: web::Path<Uuid>,
    body: web::Json<PaymentRequest>,
) -> Result<HttpResponse, AppError>
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    let order_id = path.into_inner();
    let payment_method = body.into_inner().payment_method;

    let order =
        run_blocking(move || service.confirm_payment(order_id, &payment_method)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /metrics
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Point-in-time metrics snapshot"),
    ),
    tag = "metrics"
)]
pub async fn metrics_snapshot<S, C, P>(service: Service<S, C, P>) -> HttpResponse
where
    S: OrderStore,
    C: StockClient,
    P: EventPublisher,
{
    HttpResponse::Ok().json(service.metrics().snapshot())
}
