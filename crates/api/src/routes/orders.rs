//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use domain::{CreateOrderRequest, LineItem, Order, OrderService, OrderStatus, UpdateOrderRequest};
use order_store::{CatalogLookup, OrderRepository};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R, C> {
    pub order_service: OrderService<R, C>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub items: Vec<LineItemResponse>,
    pub total: f64,
    pub status: OrderStatus,
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub item_id: String,
    pub quantity: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: OrderStatus,
}

impl From<&LineItem> for LineItemResponse {
    fn from(line: &LineItem) -> Self {
        Self {
            item_id: line.item_id.to_string(),
            quantity: line.quantity,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            items: order.items.iter().map(LineItemResponse::from).collect(),
            total: order.total.as_f64(),
            status: order.status,
            customer_id: order.customer_id.to_string(),
            created_at: order.created_at,
        }
    }
}

// -- Handlers --

/// POST /orders: place a new order; responds with its id.
#[tracing::instrument(skip(state, body))]
pub async fn create<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    body: Bytes,
) -> Result<Json<String>, ApiError>
where
    R: OrderRepository + 'static,
    C: CatalogLookup + 'static,
{
    let request: Option<CreateOrderRequest> = decode_body(&body)?;
    let id = state.order_service.create_order(request).await?;
    Ok(Json(id.to_string()))
}

/// GET /orders/{id}: load an order.
#[tracing::instrument(skip(state))]
pub async fn get<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    R: OrderRepository + 'static,
    C: CatalogLookup + 'static,
{
    let order = state.order_service.get_order_info(&id).await?;
    Ok(Json(order.into()))
}

/// PUT /orders/{id}: partially update an order; responds with the modified count.
#[tracing::instrument(skip(state, body))]
pub async fn update<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<u64>, ApiError>
where
    R: OrderRepository + 'static,
    C: CatalogLookup + 'static,
{
    let request: Option<UpdateOrderRequest> = decode_body(&body)?;
    let modified = state.order_service.update_order(&id, request).await?;
    Ok(Json(modified))
}

/// POST /orders/{id}/pay: mark a created order as paid.
#[tracing::instrument(skip(state))]
pub async fn pay<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError>
where
    R: OrderRepository + 'static,
    C: CatalogLookup + 'static,
{
    state.order_service.pay_order(&id).await?;
    Ok(Json(StatusResponse {
        status: OrderStatus::Paid,
    }))
}

/// POST /orders/{id}/process: deliver a paid order.
#[tracing::instrument(skip(state))]
pub async fn process<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError>
where
    R: OrderRepository + 'static,
    C: CatalogLookup + 'static,
{
    state.order_service.process_order(&id).await?;
    Ok(Json(StatusResponse {
        status: OrderStatus::Delivered,
    }))
}

/// Decodes an optional JSON body. An empty body or `null` yields `None`.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}
