use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use serde::Deserialize;
use utoipa::IntoParams;

use super::ApiError;
use super::ApiSuccess;
use super::MessageResponse;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GreetingParams {
    /// Who to greet; defaults to `World`.
    name: Option<String>,
}

/// Public greeting
#[utoipa::path(
    get,
    path = "/",
    params(GreetingParams),
    responses(
        (status = 200, description = "Greeting", body = MessageResponse)
    ),
    tag = "greeting"
)]
pub async fn root(
    params: Result<Query<GreetingParams>, QueryRejection>,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    let Query(params) = params?;
    Ok(greeting(params))
}

/// Authenticated greeting
#[utoipa::path(
    get,
    path = "/api/v1/",
    params(GreetingParams),
    responses(
        (status = 200, description = "Greeting", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "greeting"
)]
pub async fn api_root(
    params: Result<Query<GreetingParams>, QueryRejection>,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    let Query(params) = params?;
    Ok(greeting(params))
}

fn greeting(params: GreetingParams) -> ApiSuccess<MessageResponse> {
    let name = params
        .name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "World".to_string());

    ApiSuccess::new(
        StatusCode::OK,
        MessageResponse::new(format!("Hello, {}!", name)),
    )
}
