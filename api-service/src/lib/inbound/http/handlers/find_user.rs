use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use utoipa::IntoParams;

use super::create_user::UserResponseData;
use super::ApiError;
use super::ApiSuccess;
use super::MessageResponse;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindUserParams {
    /// Exact email to look up.
    email: String,
    /// Only match users with this active flag.
    active: Option<bool>,
}

/// Look up a user by email
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(FindUserParams),
    responses(
        (status = 200, description = "User found", body = UserResponseData),
        (status = 400, description = "Missing email parameter", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 404, description = "No user with this email", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn find_user(
    State(state): State<AppState>,
    params: Result<Query<FindUserParams>, QueryRejection>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let Query(params) = params?;

    state
        .user_store
        .find_by_email(&params.email, params.active)
        .await?
        .map(|user| ApiSuccess::new(StatusCode::OK, (&user).into()))
        .ok_or_else(|| ApiError::NotFound(format!("user with email {} not found", params.email)))
}
