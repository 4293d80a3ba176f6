//! Storage adapter tests against real Postgres, MongoDB and Redis servers.
//!
//! Connection settings come from `config/default.toml` and the usual
//! `POSTGRES__*`, `MONGO__*` and `REDIS__*` overrides. Run with
//! `cargo test -- --ignored` once the stores are up.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use api_service::config::Config;
use api_service::domain::user::models::EmailAddress;
use api_service::domain::user::models::NewUser;
use api_service::repositories::MongoUserRepository;
use api_service::repositories::PostgresUserRepository;
use api_service::repositories::RedisUserRepository;
use api_service::user::errors::UserError;
use api_service::user::ports::UserRepository;
use auth::PasswordHasher;
use chrono::Utc;
use sqlx::postgres::PgConnectOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;

static SEQUENCE: AtomicUsize = AtomicUsize::new(0);

/// Name unique to this test process and call.
fn unique_name(prefix: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        prefix,
        std::process::id(),
        Utc::now().timestamp_micros(),
        SEQUENCE.fetch_add(1, Ordering::SeqCst)
    )
}

fn load_config() -> Config {
    Config::load().expect("Failed to load configuration")
}

fn new_user(email: &str, active: bool) -> NewUser {
    NewUser {
        email: EmailAddress::new(email.to_string()).expect("Invalid test email"),
        password_hash: PasswordHasher::new()
            .hash("pass_word!")
            .expect("Failed to hash password"),
        description: "first programmer".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        active,
    }
}

async fn assert_duplicate_is_conflict(repository: &dyn UserRepository, email: &str) {
    let first = repository
        .create(new_user(email, true))
        .await
        .expect("First insert should succeed");
    assert!(!first.id.as_str().is_empty());

    let second = repository.create(new_user(email, true)).await;
    match second {
        Err(UserError::Conflict(conflicting)) => assert_eq!(conflicting, email),
        other => panic!("Expected conflict, got {:?}", other),
    }
}

async fn assert_concurrent_duplicates_conflict(repository: &dyn UserRepository, email: &str) {
    let (first, second) = tokio::join!(
        repository.create(new_user(email, true)),
        repository.create(new_user(email, true)),
    );

    let conflicts = [&first, &second]
        .iter()
        .filter(|result| matches!(result, Err(UserError::Conflict(_))))
        .count();
    assert!(first.is_ok() || second.is_ok(), "one insert should succeed");
    assert_eq!(conflicts, 1);
}

async fn assert_active_filter(repository: &dyn UserRepository, email: &str) {
    repository
        .create(new_user(email, false))
        .await
        .expect("Insert should succeed");

    let any = repository.find_by_email(email, None).await.unwrap();
    let inactive = repository.find_by_email(email, Some(false)).await.unwrap();
    let active = repository.find_by_email(email, Some(true)).await.unwrap();

    assert!(any.is_some());
    assert!(inactive.is_some());
    assert!(active.is_none());
}

async fn assert_round_trip(repository: &dyn UserRepository, email: &str) {
    let created = repository
        .create(new_user(email, true))
        .await
        .expect("Insert should succeed");

    let found = repository
        .find_by_email(email, None)
        .await
        .unwrap()
        .expect("User should be found");

    assert_eq!(found, created);
    assert_eq!(found.email.as_str(), email);
    assert_eq!(found.description, "first programmer");
    assert_eq!(found.first_name, "Ada");
    assert_eq!(found.last_name, "Lovelace");
    assert!(found.active);
    assert_ne!(found.password_hash, "pass_word!");
    assert!(PasswordHasher::new()
        .verify("pass_word!", &found.password_hash)
        .unwrap());
}

async fn assert_missing_is_none(repository: &dyn UserRepository) {
    let email = format!("{}@example.com", unique_name("ghost"));
    assert!(repository.find_by_email(&email, None).await.unwrap().is_none());
}

/// Fresh Postgres database per test, migrated on connect.
struct TestPostgres {
    config: Config,
    admin_database: String,
    repository: PostgresUserRepository,
}

impl TestPostgres {
    async fn new() -> Self {
        let mut config = load_config();
        let admin_database = config.postgres.database.clone();

        let db_name = unique_name("test_api_service");
        let mut conn = PgConnection::connect_with(&admin_options(&config, &admin_database))
            .await
            .expect("Failed to connect to Postgres");
        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        config.postgres.database = db_name;
        let repository = PostgresUserRepository::connect(&config.postgres)
            .await
            .expect("Failed to connect to test database");

        Self {
            config,
            admin_database,
            repository,
        }
    }

    async fn cleanup(self) {
        let options = admin_options(&self.config, &self.admin_database);
        drop(self.repository);

        if let Ok(mut conn) = PgConnection::connect_with(&options).await {
            let _ = conn
                .execute(
                    format!(
                        r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE);"#,
                        self.config.postgres.database
                    )
                    .as_str(),
                )
                .await;
        }
    }
}

fn admin_options(config: &Config, database: &str) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.postgres.host)
        .port(config.postgres.port)
        .username(&config.postgres.user)
        .password(&config.postgres.password)
        .database(database)
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_postgres_duplicate_email_is_conflict() {
    let db = TestPostgres::new().await;

    assert_duplicate_is_conflict(&db.repository, "ada@example.com").await;

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_postgres_concurrent_duplicates_conflict() {
    let db = TestPostgres::new().await;

    assert_concurrent_duplicates_conflict(&db.repository, "ada@example.com").await;

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_postgres_active_filter() {
    let db = TestPostgres::new().await;

    assert_active_filter(&db.repository, "ada@example.com").await;
    assert_missing_is_none(&db.repository).await;

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_postgres_round_trip() {
    let db = TestPostgres::new().await;

    assert_round_trip(&db.repository, "ada@example.com").await;

    db.cleanup().await;
}

/// MongoDB repository over a throwaway database.
async fn mongo_repository() -> (MongoUserRepository, mongodb::Database) {
    let mut config = load_config();
    config.mongo.database = unique_name("test_api_service");

    let repository = MongoUserRepository::connect(&config.mongo)
        .await
        .expect("Failed to connect to MongoDB");

    let mut options = mongodb::options::ClientOptions::parse(format!(
        "mongodb://{}:{}",
        config.mongo.host, config.mongo.port
    ))
    .await
    .expect("Failed to parse MongoDB address");
    let mut credential = mongodb::options::Credential::default();
    credential.username = Some(config.mongo.user.clone());
    credential.password = Some(config.mongo.password.clone());
    options.credential = Some(credential);
    let database = mongodb::Client::with_options(options)
        .expect("Failed to create MongoDB client")
        .database(&config.mongo.database);

    (repository, database)
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_mongo_duplicate_email_is_conflict() {
    let (repository, database) = mongo_repository().await;

    assert_duplicate_is_conflict(&repository, "ada@example.com").await;

    database.drop(None).await.expect("Failed to drop test database");
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_mongo_concurrent_duplicates_conflict() {
    let (repository, database) = mongo_repository().await;

    assert_concurrent_duplicates_conflict(&repository, "ada@example.com").await;

    database.drop(None).await.expect("Failed to drop test database");
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_mongo_active_filter() {
    let (repository, database) = mongo_repository().await;

    assert_active_filter(&repository, "ada@example.com").await;
    assert_missing_is_none(&repository).await;

    database.drop(None).await.expect("Failed to drop test database");
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_mongo_round_trip() {
    let (repository, database) = mongo_repository().await;

    assert_round_trip(&repository, "ada@example.com").await;

    database.drop(None).await.expect("Failed to drop test database");
}

/// Redis repository plus an email no other test uses.
async fn redis_repository() -> (RedisUserRepository, String) {
    let config = load_config();
    let repository = RedisUserRepository::connect(&config.redis)
        .await
        .expect("Failed to connect to Redis");

    (repository, format!("{}@example.com", unique_name("user")))
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_duplicate_email_is_conflict() {
    let (repository, email) = redis_repository().await;

    assert_duplicate_is_conflict(&repository, &email).await;
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_concurrent_duplicates_conflict() {
    let (repository, email) = redis_repository().await;

    assert_concurrent_duplicates_conflict(&repository, &email).await;
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_active_filter() {
    let (repository, email) = redis_repository().await;

    assert_active_filter(&repository, &email).await;
    assert_missing_is_none(&repository).await;
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_round_trip() {
    let (repository, email) = redis_repository().await;

    assert_round_trip(&repository, &email).await;
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_conflict_keeps_id_sequence() {
    // Own logical database so no other test moves the sequence.
    let mut config = load_config();
    config.redis.database = 15;
    let repository = RedisUserRepository::connect(&config.redis)
        .await
        .expect("Failed to connect to Redis");
    let email = format!("{}@example.com", unique_name("user"));

    let first = repository
        .create(new_user(&email, true))
        .await
        .expect("First insert should succeed");
    let duplicate = repository.create(new_user(&email, true)).await;
    assert!(matches!(duplicate, Err(UserError::Conflict(_))));

    let other = format!("{}@example.com", unique_name("user"));
    let next = repository
        .create(new_user(&other, true))
        .await
        .expect("Second insert should succeed");

    let first_id: i64 = first.id.as_str().parse().unwrap();
    let next_id: i64 = next.id.as_str().parse().unwrap();
    assert_eq!(next_id, first_id + 1);
}
