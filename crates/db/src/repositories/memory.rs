use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use smartshelf_core::domain::alert::{NewStockAlert, StockAlert, StockAlertId};
use smartshelf_core::domain::employee::{Employee, EmployeeId, NewEmployee};
use smartshelf_core::domain::product::{NewProduct, Product, ProductId, StockUpdate};
use smartshelf_core::domain::restock::{
    NewRestockRequest, RequestStatus, RestockRequest, RestockRequestId,
};

use super::{
    EmployeeRepository, ProductRepository, RepositoryError, RestockRequestRepository,
    StockAlertRepository,
};

/// Rows keyed by id with a monotonically increasing id sequence.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), next_id: 1 }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Table<Product>>,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.rows.get(&id.0).cloned())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        product.validate()?;
        let mut products = self.products.write().await;
        if products.rows.values().any(|existing| existing.sku == product.sku) {
            return Err(RepositoryError::Constraint(format!("duplicate sku `{}`", product.sku)));
        }

        let id = ProductId(products.allocate_id());
        let created = Product {
            id,
            sku: product.sku,
            name: product.name,
            category: product.category,
            description: product.description,
            price: product.price,
            shelf_stock: product.shelf_stock,
            warehouse_stock: product.warehouse_stock,
            location: product.location,
            last_updated: Some(Utc::now()),
        };
        products.rows.insert(id.0, created.clone());
        Ok(created)
    }

    async fn update_stock(
        &self,
        id: ProductId,
        update: StockUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut products = self.products.write().await;
        let Some(stored) = products.rows.get_mut(&id.0) else {
            return Ok(None);
        };

        let mut updated = stored.clone();
        updated.apply_stock_update(update, at)?;
        *stored = updated.clone();
        Ok(Some(updated))
    }
}

#[derive(Default)]
pub struct InMemoryRestockRequestRepository {
    requests: RwLock<Table<RestockRequest>>,
    products: Option<Arc<InMemoryProductRepository>>,
}

impl InMemoryRestockRequestRepository {
    /// Rejects requests whose product is missing from `products`, like the
    /// foreign key on the SQL table.
    pub fn with_products(products: Arc<InMemoryProductRepository>) -> Self {
        Self { requests: RwLock::default(), products: Some(products) }
    }
}

#[async_trait::async_trait]
impl RestockRequestRepository for InMemoryRestockRequestRepository {
    async fn list(&self) -> Result<Vec<RestockRequest>, RepositoryError> {
        let requests = self.requests.read().await;
        Ok(requests.rows.values().cloned().collect())
    }

    async fn find_by_id(
        &self,
        id: RestockRequestId,
    ) -> Result<Option<RestockRequest>, RepositoryError> {
        let requests = self.requests.read().await;
        Ok(requests.rows.get(&id.0).cloned())
    }

    async fn create(&self, request: NewRestockRequest) -> Result<RestockRequest, RepositoryError> {
        let request = request.validated()?;
        if let Some(products) = &self.products {
            if products.find_by_id(request.product_id).await?.is_none() {
                return Err(RepositoryError::MissingReference(format!(
                    "product {}",
                    request.product_id.0
                )));
            }
        }
        let mut requests = self.requests.write().await;

        let id = RestockRequestId(requests.allocate_id());
        let created = RestockRequest {
            id,
            product_id: request.product_id,
            requested_at: Some(Utc::now()),
            district: request.district,
            status: RequestStatus::Pending,
            handled_by: None,
            scanned_at: None,
            delivered_at: None,
        };
        requests.rows.insert(id.0, created.clone());
        Ok(created)
    }

    async fn mark_delivered(
        &self,
        id: RestockRequestId,
        at: DateTime<Utc>,
    ) -> Result<Option<RestockRequest>, RepositoryError> {
        let mut requests = self.requests.write().await;
        Ok(requests.rows.get_mut(&id.0).map(|request| {
            request.mark_delivered(at);
            request.clone()
        }))
    }
}

#[derive(Default)]
pub struct InMemoryEmployeeRepository {
    employees: RwLock<Table<Employee>>,
}

#[async_trait::async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn find_by_code(&self, employee_code: &str) -> Result<Option<Employee>, RepositoryError> {
        let employees = self.employees.read().await;
        Ok(employees
            .rows
            .values()
            .find(|employee| employee.employee_code == employee_code)
            .cloned())
    }

    async fn create(&self, employee: NewEmployee) -> Result<Employee, RepositoryError> {
        employee.validate()?;
        let mut employees = self.employees.write().await;
        if employees.rows.values().any(|existing| existing.employee_code == employee.employee_code)
        {
            return Err(RepositoryError::Constraint(format!(
                "duplicate employee_code `{}`",
                employee.employee_code
            )));
        }

        let id = EmployeeId(employees.allocate_id());
        let created = Employee {
            id,
            employee_code: employee.employee_code,
            name: employee.name,
            surname: employee.surname,
            password_hash: employee.password_hash,
            category: employee.category,
            created_at: Some(Utc::now()),
        };
        employees.rows.insert(id.0, created.clone());
        Ok(created)
    }
}

#[derive(Default)]
pub struct InMemoryStockAlertRepository {
    alerts: RwLock<Table<StockAlert>>,
}

impl InMemoryStockAlertRepository {
    /// Marks an alert resolved. Alerts are resolved outside the API, so this only
    /// exists for test setups that need a resolved row.
    pub async fn resolve(&self, id: StockAlertId, resolved_by: &str, at: DateTime<Utc>) -> bool {
        let mut alerts = self.alerts.write().await;
        match alerts.rows.get_mut(&id.0) {
            Some(alert) => {
                alert.resolved_at = Some(at);
                alert.resolved_by = Some(resolved_by.to_string());
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl StockAlertRepository for InMemoryStockAlertRepository {
    async fn list_unresolved(&self) -> Result<Vec<StockAlert>, RepositoryError> {
        let alerts = self.alerts.read().await;
        Ok(alerts.rows.values().filter(|alert| !alert.is_resolved()).cloned().collect())
    }

    async fn create(&self, alert: NewStockAlert) -> Result<StockAlert, RepositoryError> {
        alert.validate()?;
        let mut alerts = self.alerts.write().await;

        let id = StockAlertId(alerts.allocate_id());
        let created = StockAlert {
            id,
            product_id: alert.product_id,
            alert_type: alert.alert_type.trim().to_string(),
            message: alert.message,
            created_at: Some(Utc::now()),
            resolved_at: None,
            resolved_by: None,
        };
        alerts.rows.insert(id.0, created.clone());
        Ok(created)
    }
}
