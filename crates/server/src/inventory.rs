use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use smartshelf_core::domain::alert::StockAlert;
use smartshelf_core::domain::product::{Product, ProductId, StockUpdate};
use smartshelf_core::domain::restock::{NewRestockRequest, RestockRequest, RestockRequestId};
use smartshelf_db::repositories::RepositoryError;

use crate::api::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", patch(update_product_stock))
        .route("/api/requests", get(list_requests).post(create_request))
        .route("/api/requests/{id}/mark-delivered", patch(mark_request_delivered))
        .route("/api/alerts", get(list_unresolved_alerts))
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub shelf_stock: i64,
    pub warehouse_stock: i64,
    pub total_stock: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.0,
            total_stock: product.total_stock(),
            sku: product.sku,
            name: product.name,
            category: product.category,
            shelf_stock: product.shelf_stock,
            warehouse_stock: product.warehouse_stock,
            last_updated: product.last_updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: i64,
    pub product_id: i64,
    pub district: String,
    pub status: String,
    pub requested_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl From<RestockRequest> for RequestView {
    fn from(request: RestockRequest) -> Self {
        Self {
            id: request.id.0,
            product_id: request.product_id.0,
            district: request.district,
            status: request.status.as_str().to_string(),
            requested_at: request.requested_at,
            delivered_at: request.delivered_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlertView {
    pub id: i64,
    pub product_id: i64,
    pub alert_type: String,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl From<StockAlert> for AlertView {
    fn from(alert: StockAlert) -> Self {
        Self {
            id: alert.id.0,
            product_id: alert.product_id.0,
            alert_type: alert.alert_type,
            message: alert.message,
            created_at: alert.created_at,
            resolved_at: alert.resolved_at,
            resolved_by: alert.resolved_by,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub product_id: i64,
    pub district: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedRequest {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct StockUpdated {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// Absent fields keep their stored value; the total is recomputed either way.
async fn update_product_stock(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StockUpdate>, JsonRejection>,
) -> Result<Json<StockUpdated>, ApiError> {
    let Path(id) = id?;
    let Json(update) = payload?;
    update.validate()?;

    let updated = state
        .products
        .update_stock(ProductId(id), update, Utc::now())
        .await?
        .ok_or(ApiError::NotFound("Product not found"))?;

    info!(
        event_name = "api.product.stock_updated",
        product_id = updated.id.0,
        shelf_stock = updated.shelf_stock,
        warehouse_stock = updated.warehouse_stock,
        "product stock updated"
    );

    Ok(Json(StockUpdated { success: true }))
}

async fn list_requests(State(state): State<AppState>) -> Result<Json<Vec<RequestView>>, ApiError> {
    let requests = state.requests.list().await?;
    Ok(Json(requests.into_iter().map(RequestView::from).collect()))
}

async fn create_request(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedRequest>), ApiError> {
    let Json(body) = payload?;
    let request =
        NewRestockRequest { product_id: ProductId(body.product_id), district: body.district }
            .validated()?;

    let created = state.requests.create(request).await.map_err(|error| match error {
        RepositoryError::MissingReference(_) => ApiError::NotFound("Product not found"),
        other => ApiError::from(other),
    })?;

    info!(
        event_name = "api.request.created",
        request_id = created.id.0,
        product_id = created.product_id.0,
        district = %created.district,
        "restock request created"
    );

    Ok((StatusCode::CREATED, Json(CreatedRequest { message: "Request created", id: created.id.0 })))
}

async fn mark_request_delivered(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;

    let delivered = state
        .requests
        .mark_delivered(RestockRequestId(id), Utc::now())
        .await?
        .ok_or(ApiError::NotFound("Request not found"))?;

    info!(
        event_name = "api.request.delivered",
        request_id = delivered.id.0,
        "restock request marked delivered"
    );

    Ok(Json(MessageResponse { message: "Request marked as delivered" }))
}

async fn list_unresolved_alerts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AlertView>>, ApiError> {
    let alerts = state.alerts.list_unresolved().await?;
    Ok(Json(alerts.into_iter().map(AlertView::from).collect()))
}
