use std::sync::Arc;

use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use super::claims::CustomClaims;
use super::claims::ValidatedClaims;
use super::errors::JwtError;
use super::jwks::KeySource;

/// RS256 access token verification against an issuer's published keys.
pub struct TokenValidator {
    key_source: Arc<dyn KeySource>,
    validation: Validation,
}

impl TokenValidator {
    /// Tolerated clock skew, in seconds.
    pub const DEFAULT_LEEWAY: u64 = 60;

    /// `audience` must not be empty; [`crate::Authenticator`] enforces this.
    pub fn new(key_source: Arc<dyn KeySource>, issuer: &str, audience: &[String]) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = Self::DEFAULT_LEEWAY;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.set_audience(audience);

        Self {
            key_source,
            validation,
        }
    }

    /// Verify signature, expiry, issuer and audience, then validate the
    /// custom claims.
    ///
    /// # Errors
    /// * `MissingKeyId` / `UnknownKeyId` - Token does not name a known key
    /// * `KeySetUnavailable` - Keys could not be fetched
    /// * `TokenExpired` / `InvalidIssuer` / `InvalidAudience` / `InvalidToken`
    /// * `Claims` - Custom claims failed validation
    pub async fn validate(&self, token: &str) -> Result<ValidatedClaims, JwtError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(JwtError::MissingKeyId)?;

        let keys = self.key_source.key_set().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| JwtError::UnknownKeyId(kid.clone()))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| JwtError::InvalidKey(e.to_string()))?;

        let token_data = decode::<CustomClaims>(token, &key, &self.validation)?;

        Ok(token_data.claims.validate()?)
    }
}
