use auth::AuthenticationError;
use auth::ValidatedClaims;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::Extensions;
use axum::middleware::Next;
use axum::response::Response;
use thiserror::Error;

use super::handlers::ApiError;
use super::router::AppState;

/// Identity of the caller, attached by [`user_context`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    /// Empty when the token carries no email claim.
    pub email: String,
}

impl From<&ValidatedClaims> for AuthenticatedUser {
    fn from(claims: &ValidatedClaims) -> Self {
        Self {
            user_id: claims.user_id().to_string(),
            email: claims.user_email().to_string(),
        }
    }
}

/// Request context lookups made before the authentication layers ran.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("no auth claims found in context")]
    MissingClaims,

    #[error("no user ID found in context")]
    MissingUserId,
}

/// Verifies the bearer token and stores the validated claims in the
/// request extensions. Any failure is a 401 carrying the error text.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| rejected(AuthenticationError::MalformedHeader))?
                .to_owned(),
        ),
        None => None,
    };

    let claims = state
        .authenticator
        .authenticate(authorization.as_deref())
        .await
        .map_err(rejected)?;

    tracing::debug!(user_id = %claims.user_id(), "Request authenticated");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

fn rejected(err: AuthenticationError) -> ApiError {
    tracing::warn!(error = %err, "Authentication failed");
    ApiError::Unauthorized(err.to_string())
}

/// Turns the validated claims into a typed [`AuthenticatedUser`].
pub async fn user_context(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let user = claims_value(req.extensions()).map(AuthenticatedUser::from)?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Validated claims of the current request.
pub fn claims_value(extensions: &Extensions) -> Result<&ValidatedClaims, ContextError> {
    extensions
        .get::<ValidatedClaims>()
        .ok_or(ContextError::MissingClaims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ContextError::MissingUserId.into())
    }
}

#[cfg(test)]
mod tests {
    use auth::CustomClaims;

    use super::*;

    #[test]
    fn test_claims_value_missing() {
        let extensions = Extensions::new();
        assert_eq!(
            claims_value(&extensions).unwrap_err(),
            ContextError::MissingClaims
        );
    }

    #[test]
    fn test_authenticated_user_from_claims() {
        let claims = CustomClaims::new()
            .with_claim("sub", "auth0|1")
            .with_claim("https://example.com/email", "a@b.com")
            .validate()
            .unwrap();

        let mut extensions = Extensions::new();
        extensions.insert(claims);

        let user = claims_value(&extensions).map(AuthenticatedUser::from).unwrap();
        assert_eq!(
            user,
            AuthenticatedUser {
                user_id: "auth0|1".to_string(),
                email: "a@b.com".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_extractor_without_context() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();

        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(
            result.unwrap_err(),
            ApiError::Unauthorized("no user ID found in context".to_string())
        );
    }
}
