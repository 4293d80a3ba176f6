use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub rest: RestConfig,
    pub healthcheck: HealthcheckConfig,
    pub swagger: SwaggerConfig,
    pub postgres: PostgresConfig,
    pub mongo: MongoConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub users: UsersConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RestConfig {
    pub port: u16,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HealthcheckConfig {
    pub port: u16,
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self { port: 8081 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SwaggerConfig {
    pub enable: bool,
    pub port: u16,
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            enable: true,
            port: 8085,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5433,
            user: "replaceme".to_string(),
            password: "replaceme".to_string(),
            database: "replaceme".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 27017,
            user: "root".to_string(),
            password: "root".to_string(),
            database: "mongo_db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub database: i64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: String::new(),
            database: 0,
        }
    }
}

impl RedisConfig {
    /// Connection URL in the `redis://[:password@]host:port/db` form.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.database)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                self.password, self.host, self.port, self.database
            )
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Identity provider tenant domain; the issuer is `https://<domain>/`.
    pub domain: String,
    pub audience: Vec<String>,
    /// Overrides the issuer's well-known JWKS location.
    pub jwks_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: "replaceme.eu.auth0.com".to_string(),
            audience: vec!["https://replaceme.com".to_string()],
            jwks_url: None,
        }
    }
}

/// Store that backs the user endpoints.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserBackend {
    #[default]
    Postgres,
    Mongo,
    Redis,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UsersConfig {
    pub backend: UserBackend,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (POSTGRES__HOST, AUTH__AUDIENCE=a,b, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.audience"),
            )
            .build()?;

        configuration.try_deserialize()
    }
}
