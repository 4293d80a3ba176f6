use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use bson::Document;
use chrono::Utc;
use mongodb::error::ErrorKind;
use mongodb::error::WriteFailure;
use mongodb::options::ClientOptions;
use mongodb::options::Credential;
use mongodb::options::IndexOptions;
use mongodb::Client;
use mongodb::Collection;
use mongodb::Database;
use mongodb::IndexModel;
use serde::Deserialize;
use serde::Serialize;

use crate::config::MongoConfig;
use crate::domain::health::ports::HealthProbe;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const COLLECTION: &str = "users";
const DUPLICATE_KEY: i32 = 11000;

pub struct MongoUserRepository {
    database: Database,
    users: Collection<UserDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    email: String,
    password: String,
    description: String,
    first_name: String,
    last_name: String,
    active: bool,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl TryFrom<UserDocument> for User {
    type Error = UserError;

    fn try_from(document: UserDocument) -> Result<Self, Self::Error> {
        let id = document
            .id
            .ok_or_else(|| UserError::DatabaseError("user document has no _id".to_string()))?;

        Ok(User {
            id: UserId::new(id.to_hex()),
            email: EmailAddress::new(document.email)?,
            password_hash: document.password,
            description: document.description,
            first_name: document.first_name,
            last_name: document.last_name,
            active: document.active,
            created_at: document.created_at.to_chrono(),
            updated_at: document.updated_at.to_chrono(),
        })
    }
}

impl MongoUserRepository {
    pub fn new(database: Database) -> Self {
        let users = database.collection::<UserDocument>(COLLECTION);
        Self { database, users }
    }

    /// Connect and make sure the unique email index exists.
    pub async fn connect(config: &MongoConfig) -> anyhow::Result<Self> {
        let mut options =
            ClientOptions::parse(format!("mongodb://{}:{}", config.host, config.port)).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let mut credential = Credential::default();
        credential.username = Some(config.user.clone());
        credential.password = Some(config.password.clone());
        options.credential = Some(credential);

        let client = Client::with_options(options)?;
        let repository = Self::new(client.database(&config.database));

        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("users_email_key".to_string())
                    .build(),
            )
            .build();
        repository.users.create_index(index, None).await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "MongoDB client connected"
        );

        Ok(repository)
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let mut document = UserDocument {
            id: None,
            email: user.email.to_string(),
            password: user.password_hash,
            description: user.description,
            first_name: user.first_name,
            last_name: user.last_name,
            active: user.active,
            created_at: now,
            updated_at: now,
        };

        let result = self
            .users
            .insert_one(&document, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    UserError::Conflict(user.email.to_string())
                } else {
                    UserError::DatabaseError(e.to_string())
                }
            })?;

        document.id = result.inserted_id.as_object_id();
        document.try_into()
    }

    async fn find_by_email(
        &self,
        email: &str,
        active: Option<bool>,
    ) -> Result<Option<User>, UserError> {
        let mut filter: Document = doc! { "email": email };
        if let Some(active) = active {
            filter.insert("active", active);
        }
        tracing::debug!(filter = %filter, "Finding user by email");

        self.users
            .find_one(filter, None)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl HealthProbe for MongoUserRepository {
    fn name(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
