use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use super::ApiSuccess;
use crate::domain::health::service::HealthService;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HealthResponseData {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Ping every backing store
#[utoipa::path(
    get,
    path = "/healthcheck",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthResponseData),
        (status = 500, description = "At least one dependency unreachable", body = HealthResponseData)
    ),
    tag = "health"
)]
pub async fn healthcheck(State(health): State<HealthService>) -> ApiSuccess<HealthResponseData> {
    let report = health.check().await;

    if report.is_healthy() {
        ApiSuccess::new(
            StatusCode::OK,
            HealthResponseData {
                message: "OK".to_string(),
                errors: Vec::new(),
            },
        )
    } else {
        ApiSuccess::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            HealthResponseData {
                message: "healthcheck failed".to_string(),
                errors: report.errors,
            },
        )
    }
}
