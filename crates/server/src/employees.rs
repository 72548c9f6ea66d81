use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use smartshelf_core::auth::verify_password;
use smartshelf_core::domain::employee::{Employee, EmployeeCategory};

use crate::api::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/login", post(login))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub employee_code: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct EmployeeView {
    pub id: i64,
    pub employee_code: String,
    pub name: String,
    pub surname: String,
    pub category: EmployeeCategory,
}

impl From<Employee> for EmployeeView {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id.0,
            employee_code: employee.employee_code,
            name: employee.name,
            surname: employee.surname,
            category: employee.category,
        }
    }
}

/// Unknown codes and wrong passwords get the same answer.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<EmployeeView>, ApiError> {
    let Json(credentials) = payload?;

    let Some(employee) = state.employees.find_by_code(&credentials.employee_code).await? else {
        warn!(event_name = "api.login.rejected", reason = "unknown_code", "login rejected");
        return Err(ApiError::InvalidCredentials);
    };

    let stored_hash = employee.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || {
        verify_password(&stored_hash, &credentials.password)
    })
    .await
    .map_err(|error| ApiError::Internal(error.to_string()))?;

    if !verified {
        warn!(
            event_name = "api.login.rejected",
            reason = "password_mismatch",
            employee_id = employee.id.0,
            "login rejected"
        );
        return Err(ApiError::InvalidCredentials);
    }

    info!(event_name = "api.login.succeeded", employee_id = employee.id.0, "employee logged in");
    Ok(Json(EmployeeView::from(employee)))
}
