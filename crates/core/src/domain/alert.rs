use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::ProductId;
use crate::errors::DomainError;

pub const MAX_ALERT_TYPE_LEN: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockAlertId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: StockAlertId,
    pub product_id: ProductId,
    pub alert_type: String,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl StockAlert {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewStockAlert {
    pub product_id: ProductId,
    pub alert_type: String,
    pub message: String,
}

impl NewStockAlert {
    pub fn validate(&self) -> Result<(), DomainError> {
        let alert_type = self.alert_type.trim();
        if alert_type.is_empty() {
            return Err(DomainError::BlankField("alert_type"));
        }
        if alert_type.chars().count() > MAX_ALERT_TYPE_LEN {
            return Err(DomainError::InvariantViolation(format!(
                "alert_type must be at most {MAX_ALERT_TYPE_LEN} characters"
            )));
        }
        if self.message.trim().is_empty() {
            return Err(DomainError::BlankField("message"));
        }
        Ok(())
    }
}
