use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::postgres::PgSslMode;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::config::PostgresConfig;
use crate::domain::health::ports::HealthProbe;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str =
    "id, email, password, description, first_name, last_name, active, created_at, updated_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct UserRow {
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

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(row.id.to_string()),
            email: EmailAddress::new(row.email)?,
            password_hash: row.password,
            description: row.description,
            first_name: row.first_name,
            last_name: row.last_name,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and run the embedded migrations.
    pub async fn connect(config: &PostgresConfig) -> anyhow::Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .ssl_mode(config.ssl_mode.parse::<PgSslMode>()?);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        tracing::info!(
            host = %config.host,
            port = config.port,
            max_connections = config.max_connections,
            database = "postgresql",
            "Database connection pool created"
        );

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(database = "postgresql", "Database migrations completed");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let query = format!(
            "INSERT INTO users (email, password, description, first_name, last_name, active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );
        tracing::debug!(query = %query, "Inserting user");

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.email.as_str())
            .bind(&user.password_hash)
            .bind(&user.description)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key")
                    {
                        return UserError::Conflict(user.email.to_string());
                    }
                }
                UserError::DatabaseError(e.to_string())
            })?;

        row.try_into()
    }

    async fn find_by_email(
        &self,
        email: &str,
        active: Option<bool>,
    ) -> Result<Option<User>, UserError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE email = $1 AND ($2::BOOLEAN IS NULL OR active = $2)"
        );
        tracing::debug!(query = %query, active = ?active, "Finding user by email");

        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .bind(active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl HealthProbe for PostgresUserRepository {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
