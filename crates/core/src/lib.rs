pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;

pub use domain::alert::{NewStockAlert, StockAlert, StockAlertId};
pub use domain::employee::{Employee, EmployeeCategory, EmployeeId, NewEmployee};
pub use domain::product::{NewProduct, Product, ProductId, ShelfLocation, StockUpdate};
pub use domain::restock::{NewRestockRequest, RequestStatus, RestockRequest, RestockRequestId};
pub use errors::DomainError;
