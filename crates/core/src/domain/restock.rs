use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::employee::EmployeeId;
use super::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RestockRequestId(pub i64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Picked,
    InTransit,
    Delivered,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Picked => "picked",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "picked" => Ok(Self::Picked),
            "in_transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            other => Err(DomainError::UnknownRequestStatus(other.to_string())),
        }
    }
}

/// A request to move stock of one product to a district.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockRequest {
    pub id: RestockRequestId,
    pub product_id: ProductId,
    pub requested_at: Option<DateTime<Utc>>,
    pub district: String,
    pub status: RequestStatus,
    pub handled_by: Option<EmployeeId>,
    pub scanned_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl RestockRequest {
    pub fn mark_delivered(&mut self, at: DateTime<Utc>) {
        self.status = RequestStatus::Delivered;
        self.delivered_at = Some(at);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRestockRequest {
    pub product_id: ProductId,
    pub district: String,
}

impl NewRestockRequest {
    /// Trims the district and rejects blank ones.
    pub fn validated(self) -> Result<Self, DomainError> {
        let district = self.district.trim();
        if district.is_empty() {
            return Err(DomainError::BlankField("district"));
        }
        Ok(Self { product_id: self.product_id, district: district.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{NewRestockRequest, RequestStatus, RestockRequest, RestockRequestId};
    use crate::domain::product::ProductId;
    use crate::errors::DomainError;

    #[test]
    fn status_round_trips_through_storage_spelling() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Picked,
            RequestStatus::InTransit,
            RequestStatus::Delivered,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>(), Ok(status));
        }
        assert_eq!(
            "lost".parse::<RequestStatus>(),
            Err(DomainError::UnknownRequestStatus("lost".to_string()))
        );
    }

    #[test]
    fn new_requests_default_to_pending() {
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
    }

    #[test]
    fn mark_delivered_sets_status_and_timestamp() {
        let mut request = RestockRequest {
            id: RestockRequestId(1),
            product_id: ProductId(2),
            requested_at: Some(Utc::now()),
            district: "North".to_string(),
            status: RequestStatus::InTransit,
            handled_by: None,
            scanned_at: None,
            delivered_at: None,
        };
        let now = Utc::now();

        request.mark_delivered(now);

        assert_eq!(request.status, RequestStatus::Delivered);
        assert_eq!(request.delivered_at, Some(now));
    }

    #[test]
    fn district_is_trimmed_and_required() {
        let ok = NewRestockRequest { product_id: ProductId(1), district: "  East ".to_string() }
            .validated()
            .expect("valid district");
        assert_eq!(ok.district, "East");

        let blank = NewRestockRequest { product_id: ProductId(1), district: " ".to_string() }
            .validated();
        assert_eq!(blank, Err(DomainError::BlankField("district")));
    }
}
