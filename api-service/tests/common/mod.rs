#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use api_service::domain::health::ports::HealthProbe;
use api_service::domain::health::service::HealthService;
use api_service::domain::user::models::NewUser;
use api_service::domain::user::models::User;
use api_service::domain::user::models::UserId;
use api_service::domain::user::service::UserService;
use api_service::inbound::http::router::create_health_router;
use api_service::inbound::http::router::create_router;
use api_service::user::errors::UserError;
use api_service::user::ports::UserRepository;
use async_trait::async_trait;
use auth::Authenticator;
use auth::StaticKeySource;
use axum::Router;
use chrono::Utc;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use serde_json::json;
use serde_json::Value;

pub const DOMAIN: &str = "example.eu.auth0.com";
pub const ISSUER: &str = "https://example.eu.auth0.com/";
pub const AUDIENCE: &str = "https://example.com";
const KEY_ID: &str = "test-key-1";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the REST router in a background task
    pub async fn spawn() -> Self {
        let repository = Arc::new(InMemoryUserRepository::default());
        let user_store = Arc::new(UserService::new(repository));

        let key_source = StaticKeySource::from_json(include_str!("../fixtures/jwks.json"))
            .expect("Failed to load test JWKS");
        let authenticator = Arc::new(
            Authenticator::with_key_source(DOMAIN, &[AUDIENCE.to_string()], Arc::new(key_source))
                .expect("Failed to create authenticator"),
        );

        Self::serve(create_router(user_store, authenticator)).await
    }

    /// Spawn the healthcheck router with the given probes
    pub async fn spawn_health(probes: Vec<Arc<dyn HealthProbe>>) -> Self {
        Self::serve(create_health_router(HealthService::new(probes))).await
    }

    async fn serve(router: Router) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address: format!("http://127.0.0.1:{}", port),
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }
}

/// Sign `claims` with the test key, filling in the standard claims
/// unless they are already present.
pub fn sign_token(mut claims: Value) -> String {
    let now = Utc::now().timestamp();
    let defaults = json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
    });

    if let (Some(claims), Some(defaults)) = (claims.as_object_mut(), defaults.as_object()) {
        for (key, value) in defaults {
            claims.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    let mut header = Header::new(jsonwebtoken::Algorithm::RS256);
    header.kid = Some(KEY_ID.to_string());
    let key = EncodingKey::from_rsa_pem(include_bytes!("../fixtures/test_rsa_private.pem"))
        .expect("Failed to load test signing key");

    jsonwebtoken::encode(&header, &claims, &key).expect("Failed to sign token")
}

/// Token for a regular caller.
pub fn user_token() -> String {
    sign_token(json!({
        "sub": "auth0|alice",
        "https://example.com/email": "alice@example.com",
    }))
}

/// User store keyed by email, assigning sequential ids.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        let email = user.email.to_string();
        if users.contains_key(&email) {
            return Err(UserError::Conflict(email));
        }

        let id = UserId::new((users.len() + 1).to_string());
        let user = user.into_user(id, Utc::now());
        users.insert(email, user.clone());
        Ok(user)
    }

    async fn find_by_email(
        &self,
        email: &str,
        active: Option<bool>,
    ) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .get(email)
            .filter(|user| active.map_or(true, |active| user.active == active))
            .cloned())
    }
}

/// Probe with a fixed outcome.
pub struct StubProbe {
    pub name: &'static str,
    pub healthy: bool,
}

impl StubProbe {
    pub fn healthy(name: &'static str) -> Arc<dyn HealthProbe> {
        Arc::new(Self {
            name,
            healthy: true,
        })
    }

    pub fn failing(name: &'static str) -> Arc<dyn HealthProbe> {
        Arc::new(Self {
            name,
            healthy: false,
        })
    }
}

#[async_trait]
impl HealthProbe for StubProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn ping(&self) -> anyhow::Result<()> {
        if self.healthy {
            Ok(())
        } else {
            anyhow::bail!("connection refused")
        }
    }
}
