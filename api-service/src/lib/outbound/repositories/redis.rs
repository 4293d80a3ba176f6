use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::Deserialize;
use serde::Serialize;

use crate::config::RedisConfig;
use crate::domain::health::ports::HealthProbe;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const ID_SEQUENCE_KEY: &str = "users:id_seq";

/// Users stored as JSON values keyed by email.
#[derive(Clone)]
pub struct RedisUserRepository {
    manager: ConnectionManager,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRecord {
    id: i64,
    email: String,
    password: String,
    description: String,
    first_name: String,
    last_name: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = UserError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(record.id.to_string()),
            email: EmailAddress::new(record.email)?,
            password_hash: record.password,
            description: record.description,
            first_name: record.first_name,
            last_name: record.last_name,
            active: record.active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl RedisUserRepository {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    pub async fn connect(config: &RedisConfig) -> anyhow::Result<Self> {
        let client = redis::Client::open(config.url())?;
        let manager = ConnectionManager::new(client).await?;
        tracing::info!(
            host = %config.host,
            port = config.port,
            database = config.database,
            "Redis connection manager created"
        );

        Ok(Self::new(manager))
    }

    fn key(email: &str) -> String {
        format!("users:email:{email}")
    }
}

fn database_error(e: impl ToString) -> UserError {
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for RedisUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut conn = self.manager.clone();
        let key = Self::key(user.email.as_str());

        // Skip the id allocation for emails that are already taken; SET NX
        // below still settles concurrent inserts.
        let taken: bool = conn.exists(&key).await.map_err(database_error)?;
        if taken {
            return Err(UserError::Conflict(user.email.to_string()));
        }

        let id: i64 = conn.incr(ID_SEQUENCE_KEY, 1).await.map_err(database_error)?;
        let now = Utc::now();
        let record = UserRecord {
            id,
            email: user.email.to_string(),
            password: user.password_hash,
            description: user.description,
            first_name: user.first_name,
            last_name: user.last_name,
            active: user.active,
            created_at: now,
            updated_at: now,
        };
        let payload = serde_json::to_string(&record).map_err(database_error)?;

        // NX makes the write the uniqueness check.
        let stored: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(payload)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(database_error)?;

        if stored.is_none() {
            return Err(UserError::Conflict(record.email));
        }

        record.try_into()
    }

    async fn find_by_email(
        &self,
        email: &str,
        active: Option<bool>,
    ) -> Result<Option<User>, UserError> {
        let mut conn = self.manager.clone();
        let key = Self::key(email);
        tracing::debug!(key = %key, active = ?active, "Finding user by email");

        let raw: Option<String> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(database_error)?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let record: UserRecord = serde_json::from_str(&raw).map_err(database_error)?;
        if active.is_some_and(|active| active != record.active) {
            return Ok(None);
        }

        record.try_into().map(Some)
    }
}

#[async_trait]
impl HealthProbe for RedisUserRepository {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
