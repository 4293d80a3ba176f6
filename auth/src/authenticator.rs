use std::sync::Arc;

use reqwest::Url;

use crate::jwt::CachingJwksProvider;
use crate::jwt::JwtError;
use crate::jwt::KeySource;
use crate::jwt::TokenValidator;
use crate::jwt::ValidatedClaims;

const BEARER_SCHEME: &str = "bearer";

/// Bearer token authentication against an external identity provider.
///
/// Extracts the token from an `Authorization` header value, verifies it
/// against the provider's signing keys and validates the custom claims.
pub struct Authenticator {
    validator: TokenValidator,
    issuer: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("authorization header is missing")]
    MissingToken,

    #[error("authorization header format must be Bearer {{token}}")]
    MalformedHeader,

    #[error("failed to parse the issuer url: {0}")]
    InvalidIssuer(String),

    #[error("at least one audience must be configured")]
    MissingAudience,

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator for a provider domain.
    ///
    /// The issuer is `https://<domain>/` and keys are fetched from
    /// `jwks_url`, or the issuer's well-known JWKS location when `None`,
    /// with a five minute cache.
    ///
    /// # Errors
    /// * `InvalidIssuer` - Domain does not form a valid URL
    /// * `MissingAudience` - `audience` is empty
    pub fn for_domain(
        domain: &str,
        audience: &[String],
        jwks_url: Option<&str>,
    ) -> Result<Self, AuthenticationError> {
        let issuer = issuer_url(domain)?;
        require_audience(audience)?;
        let key_source = match jwks_url {
            Some(url) => {
                CachingJwksProvider::new(url, CachingJwksProvider::DEFAULT_REFRESH_INTERVAL)
            }
            None => CachingJwksProvider::for_issuer(&issuer),
        };

        tracing::info!(
            issuer = %issuer,
            jwks_url = %key_source.jwks_url(),
            "Authenticator configured"
        );

        Ok(Self::from_parts(issuer, audience, Arc::new(key_source)))
    }

    /// Create an authenticator with an explicit key source.
    ///
    /// # Errors
    /// * `InvalidIssuer` - Domain does not form a valid URL
    /// * `MissingAudience` - `audience` is empty
    pub fn with_key_source(
        domain: &str,
        audience: &[String],
        key_source: Arc<dyn KeySource>,
    ) -> Result<Self, AuthenticationError> {
        let issuer = issuer_url(domain)?;
        require_audience(audience)?;
        Ok(Self::from_parts(issuer, audience, key_source))
    }

    fn from_parts(issuer: String, audience: &[String], key_source: Arc<dyn KeySource>) -> Self {
        Self {
            validator: TokenValidator::new(key_source, &issuer, audience),
            issuer,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Authenticate a request from its `Authorization` header value.
    ///
    /// # Errors
    /// * `MissingToken` - No header value
    /// * `MalformedHeader` - Value is not `Bearer <token>`
    /// * `Jwt` - Token verification or claims validation failed
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<ValidatedClaims, AuthenticationError> {
        let token = bearer_token(authorization)?;
        Ok(self.validator.validate(token).await?)
    }
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthenticationError> {
    let value = authorization.ok_or(AuthenticationError::MissingToken)?;
    if value.is_empty() {
        return Err(AuthenticationError::MissingToken);
    }

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(AuthenticationError::MalformedHeader),
    }
}

fn require_audience(audience: &[String]) -> Result<(), AuthenticationError> {
    if audience.iter().all(|aud| aud.trim().is_empty()) {
        return Err(AuthenticationError::MissingAudience);
    }
    Ok(())
}

fn issuer_url(domain: &str) -> Result<String, AuthenticationError> {
    Url::parse(&format!("https://{}/", domain))
        .map(String::from)
        .map_err(|e| AuthenticationError::InvalidIssuer(e.to_string()))
}
