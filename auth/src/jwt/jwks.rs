use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::RwLock;

use super::errors::JwtError;

/// Source of the public keys used to verify token signatures.
#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    /// Current signing key set.
    ///
    /// # Errors
    /// * `KeySetUnavailable` - Keys could not be retrieved
    async fn key_set(&self) -> Result<Arc<JwkSet>, JwtError>;
}

/// Fixed key set, for local development and tests.
pub struct StaticKeySource {
    keys: Arc<JwkSet>,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Parse a JWKS document.
    ///
    /// # Errors
    /// * `InvalidKey` - Document is not a valid JWKS
    pub fn from_json(document: &str) -> Result<Self, JwtError> {
        serde_json::from_str(document)
            .map(Self::new)
            .map_err(|e| JwtError::InvalidKey(e.to_string()))
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn key_set(&self) -> Result<Arc<JwkSet>, JwtError> {
        Ok(Arc::clone(&self.keys))
    }
}

struct CachedKeySet {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

/// Remote JWKS endpoint with a time-bounded cache.
///
/// The key set is fetched lazily and reused until `refresh_interval` has
/// elapsed, which bounds the number of calls to the identity provider.
pub struct CachingJwksProvider {
    client: reqwest::Client,
    jwks_url: String,
    refresh_interval: Duration,
    cache: RwLock<Option<CachedKeySet>>,
}

impl CachingJwksProvider {
    pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

    pub fn new(jwks_url: impl Into<String>, refresh_interval: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            jwks_url: jwks_url.into(),
            refresh_interval,
            cache: RwLock::new(None),
        }
    }

    /// Provider for the well-known JWKS location of an issuer URL.
    pub fn for_issuer(issuer: &str) -> Self {
        let jwks_url = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));
        Self::new(jwks_url, Self::DEFAULT_REFRESH_INTERVAL)
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    async fn cached(&self) -> Option<Arc<JwkSet>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.refresh_interval)
            .map(|cached| Arc::clone(&cached.keys))
    }

    async fn fetch(&self) -> Result<JwkSet, JwtError> {
        tracing::debug!(url = %self.jwks_url, "Fetching signing keys");

        self.client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| JwtError::KeySetUnavailable(e.to_string()))?
            .json::<JwkSet>()
            .await
            .map_err(|e| JwtError::KeySetUnavailable(e.to_string()))
    }
}

#[async_trait]
impl KeySource for CachingJwksProvider {
    async fn key_set(&self) -> Result<Arc<JwkSet>, JwtError> {
        if let Some(keys) = self.cached().await {
            return Ok(keys);
        }

        // No lock is held while the request is in flight.
        let keys = Arc::new(self.fetch().await?);
        tracing::info!(
            url = %self.jwks_url,
            keys = keys.keys.len(),
            "Signing keys refreshed"
        );

        *self.cache.write().await = Some(CachedKeySet {
            keys: Arc::clone(&keys),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }
}
