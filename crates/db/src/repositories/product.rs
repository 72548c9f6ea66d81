use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use smartshelf_core::domain::product::{
    NewProduct, Product, ProductId, ShelfLocation, StockUpdate,
};

use super::{decode_error, parse_timestamp, ProductRepository, RepositoryError};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, sku, name, category, description, price, shelf_stock,
     warehouse_stock, aisle, section, shelf, last_updated";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let price_str: String = row.try_get("price").map_err(decode_error)?;
    let price = Decimal::from_str(&price_str)
        .map_err(|e| RepositoryError::Decode(format!("price `{price_str}`: {e}")))?;
    let last_updated: Option<String> = row.try_get("last_updated").map_err(decode_error)?;

    Ok(Product {
        id: ProductId(row.try_get("id").map_err(decode_error)?),
        sku: row.try_get("sku").map_err(decode_error)?,
        name: row.try_get("name").map_err(decode_error)?,
        category: row.try_get("category").map_err(decode_error)?,
        description: row.try_get("description").map_err(decode_error)?,
        price,
        shelf_stock: row.try_get("shelf_stock").map_err(decode_error)?,
        warehouse_stock: row.try_get("warehouse_stock").map_err(decode_error)?,
        location: ShelfLocation {
            aisle: row.try_get("aisle").map_err(decode_error)?,
            section: row.try_get("section").map_err(decode_error)?,
            shelf: row.try_get("shelf").map_err(decode_error)?,
        },
        last_updated: parse_timestamp("last_updated", last_updated)?,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_product).collect()
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        product.validate()?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO products (sku, name, category, description, price, shelf_stock,
                                   warehouse_stock, total_stock, aisle, section, shelf,
                                   last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(product.shelf_stock)
        .bind(product.warehouse_stock)
        .bind(product.total_stock())
        .bind(&product.location.aisle)
        .bind(&product.location.section)
        .bind(&product.location.shelf)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: ProductId(result.last_insert_rowid()),
            sku: product.sku,
            name: product.name,
            category: product.category,
            description: product.description,
            price: product.price,
            shelf_stock: product.shelf_stock,
            warehouse_stock: product.warehouse_stock,
            location: product.location,
            last_updated: Some(now),
        })
    }

    async fn update_stock(
        &self,
        id: ProductId,
        update: StockUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        update.validate()?;

        // Single statement so concurrent writers queue on the busy timeout
        // instead of failing a read-to-write lock upgrade.
        let row = sqlx::query(&format!(
            "UPDATE products
             SET shelf_stock = COALESCE(?, shelf_stock),
                 warehouse_stock = COALESCE(?, warehouse_stock),
                 total_stock = COALESCE(?, shelf_stock) + COALESCE(?, warehouse_stock),
                 last_updated = ?
             WHERE id = ?
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(update.shelf_stock)
        .bind(update.warehouse_stock)
        .bind(update.shelf_stock)
        .bind(update.warehouse_stock)
        .bind(at.to_rfc3339())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_product).transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use smartshelf_core::domain::product::{NewProduct, ProductId, ShelfLocation, StockUpdate};

    use super::SqlProductRepository;
    use crate::repositories::{ProductRepository, RepositoryError};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn new_product(sku: &str, shelf_stock: i64, warehouse_stock: i64) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            category: "Tools".to_string(),
            description: Some("demo".to_string()),
            price: Decimal::new(1999, 2),
            shelf_stock,
            warehouse_stock,
            location: ShelfLocation {
                aisle: "7".to_string(),
                section: "A".to_string(),
                shelf: "1".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn create_then_list_reports_total_stock() {
        let repo = SqlProductRepository::new(setup().await);

        repo.create(new_product("X1", 3, 5)).await.expect("create");
        let products = repo.list().await.expect("list");

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].sku, "X1");
        assert_eq!(products[0].price, Decimal::new(1999, 2));
        assert_eq!(products[0].total_stock(), 8);
        assert!(products[0].last_updated.is_some());
    }

    #[tokio::test]
    async fn update_stock_keeps_untouched_field_and_recomputes_total() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool.clone());
        let created = repo.create(new_product("X1", 3, 5)).await.expect("create");
        let at = Utc::now();

        let updated = repo
            .update_stock(created.id, StockUpdate { shelf_stock: Some(12), warehouse_stock: None }, at)
            .await
            .expect("update")
            .expect("product exists");

        assert_eq!(updated.shelf_stock, 12);
        assert_eq!(updated.warehouse_stock, 5);

        let (stored_total,): (i64,) =
            sqlx::query_as("SELECT total_stock FROM products WHERE id = ?")
                .bind(created.id.0)
                .fetch_one(&pool)
                .await
                .expect("read total");
        assert_eq!(stored_total, 17);

        let reloaded = repo.find_by_id(created.id).await.expect("find").expect("exists");
        assert_eq!(reloaded.warehouse_stock, 5);
        assert_eq!(reloaded.last_updated.map(|dt| dt.timestamp()), Some(at.timestamp()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_stock_updates_all_succeed_and_last_write_wins() {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("shelf.db").display());
        let pool = connect_with_settings(&url, 5, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = Arc::new(SqlProductRepository::new(pool.clone()));
        let created = repo.create(new_product("X1", 3, 5)).await.expect("create");

        let tasks: Vec<_> = (0..40)
            .map(|shelf_stock| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.update_stock(
                        created.id,
                        StockUpdate { shelf_stock: Some(shelf_stock), warehouse_stock: None },
                        Utc::now(),
                    )
                    .await
                })
            })
            .collect();

        for task in tasks {
            let updated = task.await.expect("join").expect("update").expect("product exists");
            assert_eq!(updated.warehouse_stock, 5);
        }

        let (shelf, total): (i64, i64) =
            sqlx::query_as("SELECT shelf_stock, total_stock FROM products WHERE id = ?")
                .bind(created.id.0)
                .fetch_one(&pool)
                .await
                .expect("read stock");
        assert!((0..40).contains(&shelf));
        assert_eq!(total, shelf + 5);
        pool.close().await;
    }

    #[tokio::test]
    async fn update_stock_on_missing_product_returns_none() {
        let repo = SqlProductRepository::new(setup().await);

        let result = repo
            .update_stock(ProductId(404), StockUpdate { shelf_stock: Some(1), warehouse_stock: None }, Utc::now())
            .await
            .expect("update");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn negative_stock_is_rejected_and_not_persisted() {
        let repo = SqlProductRepository::new(setup().await);
        let created = repo.create(new_product("X1", 3, 5)).await.expect("create");

        let error = repo
            .update_stock(created.id, StockUpdate { shelf_stock: Some(-1), warehouse_stock: None }, Utc::now())
            .await
            .expect_err("negative stock must fail");
        assert!(matches!(error, RepositoryError::Constraint(_)));

        let reloaded = repo.find_by_id(created.id).await.expect("find").expect("exists");
        assert_eq!(reloaded.shelf_stock, 3);
    }

    #[tokio::test]
    async fn duplicate_sku_is_a_constraint_violation() {
        let repo = SqlProductRepository::new(setup().await);
        repo.create(new_product("X1", 1, 1)).await.expect("first create");

        let error = repo.create(new_product("X1", 2, 2)).await.expect_err("duplicate sku");

        assert!(matches!(error, RepositoryError::Constraint(_)));
    }

    #[tokio::test]
    async fn database_check_constraint_backs_up_domain_validation() {
        let pool = setup().await;

        let error = sqlx::query(
            "INSERT INTO products (sku, name, category, price, shelf_stock, warehouse_stock,
                                   aisle, section, shelf)
             VALUES ('BAD', 'Bad', 'Tools', '1.00', -1, 0, '1', 'A', '1')",
        )
        .execute(&pool)
        .await
        .expect_err("check constraint should reject negative stock");

        assert!(matches!(RepositoryError::from(error), RepositoryError::Constraint(_)));
    }
}
