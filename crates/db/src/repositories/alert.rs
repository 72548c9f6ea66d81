use chrono::Utc;
use sqlx::Row;

use smartshelf_core::domain::alert::{NewStockAlert, StockAlert, StockAlertId};
use smartshelf_core::domain::product::ProductId;

use super::{decode_error, parse_timestamp, RepositoryError, StockAlertRepository};
use crate::DbPool;

pub struct SqlStockAlertRepository {
    pool: DbPool,
}

impl SqlStockAlertRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_alert(row: &sqlx::sqlite::SqliteRow) -> Result<StockAlert, RepositoryError> {
    Ok(StockAlert {
        id: StockAlertId(row.try_get("id").map_err(decode_error)?),
        product_id: ProductId(row.try_get("product_id").map_err(decode_error)?),
        alert_type: row.try_get("alert_type").map_err(decode_error)?,
        message: row.try_get("message").map_err(decode_error)?,
        created_at: parse_timestamp("created_at", row.try_get("created_at").map_err(decode_error)?)?,
        resolved_at: parse_timestamp(
            "resolved_at",
            row.try_get("resolved_at").map_err(decode_error)?,
        )?,
        resolved_by: row.try_get("resolved_by").map_err(decode_error)?,
    })
}

#[async_trait::async_trait]
impl StockAlertRepository for SqlStockAlertRepository {
    async fn list_unresolved(&self) -> Result<Vec<StockAlert>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, product_id, alert_type, message, created_at, resolved_at, resolved_by
             FROM stock_alerts
             WHERE resolved_at IS NULL
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_alert).collect()
    }

    async fn create(&self, alert: NewStockAlert) -> Result<StockAlert, RepositoryError> {
        alert.validate()?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO stock_alerts (product_id, alert_type, message, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(alert.product_id.0)
        .bind(alert.alert_type.trim())
        .bind(&alert.message)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(StockAlert {
            id: StockAlertId(result.last_insert_rowid()),
            product_id: alert.product_id,
            alert_type: alert.alert_type.trim().to_string(),
            message: alert.message,
            created_at: Some(now),
            resolved_at: None,
            resolved_by: None,
        })
    }
}
