use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use smartshelf_core::domain::alert::{NewStockAlert, StockAlert};
use smartshelf_core::domain::employee::{Employee, NewEmployee};
use smartshelf_core::domain::product::{NewProduct, Product, ProductId, StockUpdate};
use smartshelf_core::domain::restock::{NewRestockRequest, RestockRequest, RestockRequestId};
use smartshelf_core::errors::DomainError;

pub mod alert;
pub mod employee;
pub mod memory;
pub mod product;
pub mod restock;

pub use alert::SqlStockAlertRepository;
pub use employee::SqlEmployeeRepository;
pub use memory::{
    InMemoryEmployeeRepository, InMemoryProductRepository, InMemoryRestockRequestRepository,
    InMemoryStockAlertRepository,
};
pub use product::SqlProductRepository;
pub use restock::SqlRestockRequestRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("referenced record does not exist: {0}")]
    MissingReference(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &error {
            sqlx::Error::Database(database_error) => match database_error.kind() {
                ErrorKind::ForeignKeyViolation => {
                    Self::MissingReference(database_error.message().to_string())
                }
                ErrorKind::UniqueViolation
                | ErrorKind::CheckViolation
                | ErrorKind::NotNullViolation => {
                    Self::Constraint(database_error.message().to_string())
                }
                _ => Self::Database(error),
            },
            _ => Self::Database(error),
        }
    }
}

impl From<DomainError> for RepositoryError {
    fn from(error: DomainError) -> Self {
        Self::Constraint(error.to_string())
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Applies a partial stock change and stamps `last_updated`.
    /// Returns `None` when the product does not exist.
    async fn update_stock(
        &self,
        id: ProductId,
        update: StockUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError>;
}

#[async_trait]
pub trait RestockRequestRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<RestockRequest>, RepositoryError>;
    async fn find_by_id(
        &self,
        id: RestockRequestId,
    ) -> Result<Option<RestockRequest>, RepositoryError>;

    /// Inserts a new request in `pending` state.
    async fn create(&self, request: NewRestockRequest) -> Result<RestockRequest, RepositoryError>;

    async fn mark_delivered(
        &self,
        id: RestockRequestId,
        at: DateTime<Utc>,
    ) -> Result<Option<RestockRequest>, RepositoryError>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_code(&self, employee_code: &str) -> Result<Option<Employee>, RepositoryError>;
    async fn create(&self, employee: NewEmployee) -> Result<Employee, RepositoryError>;
}

#[async_trait]
pub trait StockAlertRepository: Send + Sync {
    /// Alerts with no `resolved_at`, oldest first.
    async fn list_unresolved(&self) -> Result<Vec<StockAlert>, RepositoryError>;
    async fn create(&self, alert: NewStockAlert) -> Result<StockAlert, RepositoryError>;
}

pub(crate) fn parse_timestamp(
    column: &str,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    raw.map(|value| {
        DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|error| RepositoryError::Decode(format!("{column}: {error}")))
    })
    .transpose()
}

pub(crate) fn decode_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}
