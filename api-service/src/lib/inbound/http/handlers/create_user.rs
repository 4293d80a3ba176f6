use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use utoipa::ToSchema;

use super::ApiError;
use super::ApiSuccess;
use super::MessageResponse;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponseData),
        (status = 400, description = "Invalid body or missing password", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 409, description = "Email already registered", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .user_store
        .insert(body.into())
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::CREATED, (&user).into()))
}

/// HTTP request body for creating a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    /// Defaults to `true`.
    active: Option<bool>,
}

impl From<CreateUserRequest> for CreateUserCommand {
    fn from(request: CreateUserRequest) -> Self {
        CreateUserCommand {
            email: request.email,
            password: request.password,
            description: request.description,
            first_name: request.first_name,
            last_name: request.last_name,
            active: request.active.unwrap_or(true),
        }
    }
}

/// Public representation of a user; the password hash is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserResponseData {
    pub id: String,
    pub email: String,
    pub description: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.to_string(),
            description: user.description.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
