use chrono::{DateTime, Utc};
use sqlx::Row;

use smartshelf_core::domain::employee::EmployeeId;
use smartshelf_core::domain::product::ProductId;
use smartshelf_core::domain::restock::{
    NewRestockRequest, RequestStatus, RestockRequest, RestockRequestId,
};

use super::{decode_error, parse_timestamp, RepositoryError, RestockRequestRepository};
use crate::DbPool;

const REQUEST_COLUMNS: &str =
    "id, product_id, requested_at, district, status, handled_by, scanned_at, delivered_at";

pub struct SqlRestockRequestRepository {
    pool: DbPool,
}

impl SqlRestockRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> Result<RestockRequest, RepositoryError> {
    let status: String = row.try_get("status").map_err(decode_error)?;
    let handled_by: Option<i64> = row.try_get("handled_by").map_err(decode_error)?;

    Ok(RestockRequest {
        id: RestockRequestId(row.try_get("id").map_err(decode_error)?),
        product_id: ProductId(row.try_get("product_id").map_err(decode_error)?),
        requested_at: parse_timestamp(
            "requested_at",
            row.try_get("requested_at").map_err(decode_error)?,
        )?,
        district: row.try_get("district").map_err(decode_error)?,
        status: status
            .parse::<RequestStatus>()
            .map_err(|e| RepositoryError::Decode(e.to_string()))?,
        handled_by: handled_by.map(EmployeeId),
        scanned_at: parse_timestamp("scanned_at", row.try_get("scanned_at").map_err(decode_error)?)?,
        delivered_at: parse_timestamp(
            "delivered_at",
            row.try_get("delivered_at").map_err(decode_error)?,
        )?,
    })
}

#[async_trait::async_trait]
impl RestockRequestRepository for SqlRestockRequestRepository {
    async fn list(&self) -> Result<Vec<RestockRequest>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM requests ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_request).collect()
    }

    async fn find_by_id(
        &self,
        id: RestockRequestId,
    ) -> Result<Option<RestockRequest>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_request).transpose()
    }

    async fn create(&self, request: NewRestockRequest) -> Result<RestockRequest, RepositoryError> {
        let request = request.validated()?;
        let now = Utc::now();
        let status = RequestStatus::Pending;

        let result = sqlx::query(
            "INSERT INTO requests (product_id, requested_at, district, status)
             VALUES (?, ?, ?, ?)",
        )
        .bind(request.product_id.0)
        .bind(now.to_rfc3339())
        .bind(&request.district)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(RestockRequest {
            id: RestockRequestId(result.last_insert_rowid()),
            product_id: request.product_id,
            requested_at: Some(now),
            district: request.district,
            status,
            handled_by: None,
            scanned_at: None,
            delivered_at: None,
        })
    }

    async fn mark_delivered(
        &self,
        id: RestockRequestId,
        at: DateTime<Utc>,
    ) -> Result<Option<RestockRequest>, RepositoryError> {
        let result = sqlx::query("UPDATE requests SET status = ?, delivered_at = ? WHERE id = ?")
            .bind(RequestStatus::Delivered.as_str())
            .bind(at.to_rfc3339())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
