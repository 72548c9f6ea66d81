//! HTTP surface of the inventory backend.
//!
//! JSON Endpoints:
//! - `POST  /api/login`                          — check employee credentials
//! - `GET   /api/products`                       — list products with stock totals
//! - `PATCH /api/products/{id}`                  — update shelf and/or warehouse stock
//! - `GET   /api/requests`                       — list restock requests
//! - `POST  /api/requests`                       — create a pending restock request
//! - `PATCH /api/requests/{id}/mark-delivered`   — mark a request delivered
//! - `GET   /api/alerts`                         — list unresolved stock alerts
//! - `POST  /agent-prompt`                       — forward a prompt to the external agent
//! - `GET   /health`                             — readiness including database status

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use smartshelf_agent::{AgentClient, AgentError};
use smartshelf_core::errors::DomainError;
use smartshelf_db::repositories::{
    EmployeeRepository, ProductRepository, RepositoryError, RestockRequestRepository,
    SqlEmployeeRepository, SqlProductRepository, SqlRestockRequestRepository,
    SqlStockAlertRepository, StockAlertRepository,
};
use smartshelf_db::DbPool;

use crate::{agent_proxy, employees, health, inventory};

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub requests: Arc<dyn RestockRequestRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub alerts: Arc<dyn StockAlertRepository>,
    pub agent: Arc<dyn AgentClient>,
}

impl AppState {
    pub fn from_pool(db_pool: DbPool, agent: Arc<dyn AgentClient>) -> Self {
        Self {
            products: Arc::new(SqlProductRepository::new(db_pool.clone())),
            requests: Arc::new(SqlRestockRequestRepository::new(db_pool.clone())),
            employees: Arc::new(SqlEmployeeRepository::new(db_pool.clone())),
            alerts: Arc::new(SqlStockAlertRepository::new(db_pool)),
            agent,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("internal database error")]
    Repository(#[source] RepositoryError),
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("internal server error")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Constraint(message) => Self::BadRequest(message),
            other => Self::Repository(other),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Repository(_) | Self::Agent(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> Value {
        let mut body = json!({ "error": self.to_string() });
        match self {
            Self::Agent(AgentError::HttpStatus { body: details, .. }) => {
                body["details"] = Value::String(details.clone());
            }
            Self::Agent(AgentError::InvalidJson { raw }) => {
                body["raw"] = Value::String(raw.clone());
            }
            _ => {}
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Repository(source) => {
                error!(
                    event_name = "api.database.failed",
                    error = %source,
                    "repository call failed"
                );
            }
            Self::Agent(source) => {
                warn!(event_name = "agent.prompt.failed", error = %source, "agent prompt failed");
            }
            Self::Internal(detail) => {
                error!(event_name = "api.internal.failed", error = %detail, "request failed");
            }
            _ => {}
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(employees::routes())
        .merge(inventory::routes())
        .merge(agent_proxy::routes())
        .with_state(state)
}

/// Full application: API routes, health endpoint and the HTTP middleware stack.
pub fn app(state: AppState, db_pool: DbPool) -> Router {
    router(state)
        .merge(health::router(db_pool))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;

    use smartshelf_agent::{AgentClient, AgentError};
    use smartshelf_core::domain::product::{NewProduct, Product, ShelfLocation};
    use smartshelf_db::repositories::{
        InMemoryEmployeeRepository, InMemoryProductRepository, InMemoryRestockRequestRepository,
        InMemoryStockAlertRepository, ProductRepository,
    };

    use super::AppState;

    /// Answers every prompt the same way.
    pub(crate) struct StubAgent {
        pub(crate) reply: Result<String, fn() -> AgentError>,
    }

    #[async_trait]
    impl AgentClient for StubAgent {
        async fn prompt(&self, message: &str) -> Result<String, AgentError> {
            match &self.reply {
                Ok(text) => Ok(format!("{text}: {message}")),
                Err(make_error) => Err(make_error()),
            }
        }
    }

    pub(crate) struct TestContext {
        pub(crate) state: AppState,
        pub(crate) products: Arc<InMemoryProductRepository>,
        pub(crate) employees: Arc<InMemoryEmployeeRepository>,
        pub(crate) alerts: Arc<InMemoryStockAlertRepository>,
    }

    pub(crate) fn context() -> TestContext {
        context_with_agent(StubAgent { reply: Ok("agent".to_string()) })
    }

    pub(crate) fn context_with_agent(agent: StubAgent) -> TestContext {
        let products = Arc::new(InMemoryProductRepository::default());
        let employees = Arc::new(InMemoryEmployeeRepository::default());
        let alerts = Arc::new(InMemoryStockAlertRepository::default());
        let state = AppState {
            products: products.clone(),
            requests: Arc::new(InMemoryRestockRequestRepository::with_products(products.clone())),
            employees: employees.clone(),
            alerts: alerts.clone(),
            agent: Arc::new(agent),
        };
        TestContext { state, products, employees, alerts }
    }

    pub(crate) async fn seed_product(
        products: &InMemoryProductRepository,
        sku: &str,
        shelf_stock: i64,
        warehouse_stock: i64,
    ) -> Product {
        products
            .create(NewProduct {
                sku: sku.to_string(),
                name: format!("Product {sku}"),
                category: "Tools".to_string(),
                description: None,
                price: Decimal::new(1999, 2),
                shelf_stock,
                warehouse_stock,
                location: ShelfLocation {
                    aisle: "1".to_string(),
                    section: "A".to_string(),
                    shelf: "2".to_string(),
                },
            })
            .await
            .expect("seed product")
    }

    pub(crate) fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-05-04T10:00:00Z")
            .expect("timestamp")
            .with_timezone(&Utc)
    }
}
