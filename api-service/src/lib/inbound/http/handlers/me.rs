use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use super::ApiSuccess;
use super::MessageResponse;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Identity of the caller as resolved from the access token
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Caller identity", body = MeResponseData),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn me(user: AuthenticatedUser) -> ApiSuccess<MeResponseData> {
    ApiSuccess::new(StatusCode::OK, user.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MeResponseData {
    pub user_id: String,
    pub email: String,
}

impl From<AuthenticatedUser> for MeResponseData {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
        }
    }
}
