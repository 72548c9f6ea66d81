//! Deterministic demo dataset for local development and smoke checks.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use smartshelf_core::auth::hash_password;
use smartshelf_core::domain::alert::NewStockAlert;
use smartshelf_core::domain::employee::{EmployeeCategory, NewEmployee};
use smartshelf_core::domain::product::{NewProduct, ShelfLocation};
use smartshelf_core::domain::restock::NewRestockRequest;

use crate::connection::DbPool;
use crate::repositories::{
    EmployeeRepository, ProductRepository, RepositoryError, RestockRequestRepository,
    SqlEmployeeRepository, SqlProductRepository, SqlRestockRequestRepository,
    SqlStockAlertRepository, StockAlertRepository,
};

/// Password for every demo employee.
pub const DEMO_PASSWORD: &str = "smartshelf-demo";

struct DemoProduct {
    sku: &'static str,
    name: &'static str,
    category: &'static str,
    price_cents: i64,
    shelf_stock: i64,
    warehouse_stock: i64,
    location: (&'static str, &'static str, &'static str),
}

const DEMO_EMPLOYEES: &[(&str, &str, &str, EmployeeCategory)] = &[
    ("EMP-001", "Maria", "Lopez", EmployeeCategory::Garden),
    ("EMP-002", "Tom", "Becker", EmployeeCategory::Diy),
    ("EMP-003", "Aisha", "Khan", EmployeeCategory::Tools),
];

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        sku: "GRD-HOSE-25",
        name: "Garden hose 25m",
        category: "Garden",
        price_cents: 3499,
        shelf_stock: 6,
        warehouse_stock: 40,
        location: ("12", "C", "2"),
    },
    DemoProduct {
        sku: "DIY-PAINT-WHT",
        name: "Interior paint white 10L",
        category: "DIY",
        price_cents: 5999,
        shelf_stock: 0,
        warehouse_stock: 18,
        location: ("5", "A", "1"),
    },
    DemoProduct {
        sku: "TLS-DRILL-18V",
        name: "Cordless drill 18V",
        category: "Tools",
        price_cents: 12900,
        shelf_stock: 2,
        warehouse_stock: 3,
        location: ("8", "B", "3"),
    },
    DemoProduct {
        sku: "CON-CEMENT-25",
        name: "Cement 25kg",
        category: "Construction",
        price_cents: 850,
        shelf_stock: 30,
        warehouse_stock: 120,
        location: ("20", "D", "1"),
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub employees: usize,
    pub products: usize,
    pub requests: usize,
    pub alerts: usize,
    pub already_present: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

pub struct DemoDataset;

impl DemoDataset {
    /// Loads the dataset unless one of its products already exists. Employees whose
    /// code is already taken are left as they are.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let products = SqlProductRepository::new(pool.clone());
        let existing = products.list().await?;
        let demo_sku = |sku: &str| DEMO_PRODUCTS.iter().any(|demo| demo.sku == sku);
        if existing.iter().any(|product| demo_sku(&product.sku)) {
            info!(event_name = "db.seed.skipped", "demo dataset already present");
            return Ok(SeedResult {
                employees: 0,
                products: 0,
                requests: 0,
                alerts: 0,
                already_present: true,
            });
        }

        let employees = SqlEmployeeRepository::new(pool.clone());
        let password_hash =
            hash_password(DEMO_PASSWORD).map_err(|e| RepositoryError::Constraint(e.to_string()))?;
        let mut inserted_employees = 0;
        for (code, name, surname, category) in DEMO_EMPLOYEES {
            if employees.find_by_code(code).await?.is_some() {
                info!(
                    event_name = "db.seed.employee_kept",
                    employee_code = *code,
                    "demo employee code already provisioned"
                );
                continue;
            }
            employees
                .create(NewEmployee {
                    employee_code: code.to_string(),
                    name: name.to_string(),
                    surname: surname.to_string(),
                    password_hash: password_hash.clone(),
                    category: *category,
                })
                .await?;
            inserted_employees += 1;
        }

        let mut created = Vec::with_capacity(DEMO_PRODUCTS.len());
        for demo in DEMO_PRODUCTS {
            let (aisle, section, shelf) = demo.location;
            created.push(
                products
                    .create(NewProduct {
                        sku: demo.sku.to_string(),
                        name: demo.name.to_string(),
                        category: demo.category.to_string(),
                        description: None,
                        price: Decimal::new(demo.price_cents, 2),
                        shelf_stock: demo.shelf_stock,
                        warehouse_stock: demo.warehouse_stock,
                        location: ShelfLocation {
                            aisle: aisle.to_string(),
                            section: section.to_string(),
                            shelf: shelf.to_string(),
                        },
                    })
                    .await?,
            );
        }

        let requests = SqlRestockRequestRepository::new(pool.clone());
        let pending = requests
            .create(NewRestockRequest {
                product_id: created[1].id,
                district: "Central".to_string(),
            })
            .await?;
        let delivered = requests
            .create(NewRestockRequest { product_id: created[2].id, district: "North".to_string() })
            .await?;
        requests.mark_delivered(delivered.id, Utc::now()).await?;

        let alerts = SqlStockAlertRepository::new(pool.clone());
        alerts
            .create(NewStockAlert {
                product_id: created[1].id,
                alert_type: "out_of_stock".to_string(),
                message: format!("{} has no shelf stock", created[1].name),
            })
            .await?;
        let low_stock = alerts
            .create(NewStockAlert {
                product_id: created[2].id,
                alert_type: "low_stock".to_string(),
                message: format!("{} is running low", created[2].name),
            })
            .await?;
        sqlx::query("UPDATE stock_alerts SET resolved_at = ?, resolved_by = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(DEMO_EMPLOYEES[2].0)
            .bind(low_stock.id.0)
            .execute(pool)
            .await?;

        info!(
            event_name = "db.seed.loaded",
            pending_request_id = pending.id.0,
            "demo dataset loaded"
        );

        Ok(SeedResult {
            employees: inserted_employees,
            products: DEMO_PRODUCTS.len(),
            requests: 2,
            alerts: 2,
            already_present: false,
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let employees = SqlEmployeeRepository::new(pool.clone());
        let mut employees_present = true;
        for (code, ..) in DEMO_EMPLOYEES {
            employees_present &= employees.find_by_code(code).await?.is_some();
        }
        checks.push(("employees", employees_present));

        let products = SqlProductRepository::new(pool.clone()).list().await?;
        let products_present = DEMO_PRODUCTS
            .iter()
            .all(|demo| products.iter().any(|product| product.sku == demo.sku));
        checks.push(("products", products_present));

        let requests = SqlRestockRequestRepository::new(pool.clone()).list().await?;
        checks.push(("requests", requests.len() >= 2));

        let unresolved = SqlStockAlertRepository::new(pool.clone()).list_unresolved().await?;
        checks.push(("unresolved-alerts", !unresolved.is_empty()));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}
