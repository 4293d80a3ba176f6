use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserStore;

/// Domain service implementation for user operations.
///
/// Backend-agnostic: validation, hashing and the uniqueness check live here
/// and the repository only reads and writes.
pub struct UserService<R>
where
    R: UserRepository + ?Sized,
{
    repository: Arc<R>,
    password_hasher: auth::PasswordHasher,
}

impl<R> UserService<R>
where
    R: UserRepository + ?Sized,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<R> UserStore for UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn insert(&self, command: CreateUserCommand) -> Result<User, UserError> {
        if command.password.is_empty() {
            return Err(UserError::PasswordRequired);
        }

        let command = command.sanitized();
        let email = EmailAddress::new(command.email)?;
        let password_hash = self.password_hasher.hash(&command.password)?;

        if self
            .repository
            .find_by_email(email.as_str(), None)
            .await?
            .is_some()
        {
            return Err(UserError::Conflict(email.to_string()));
        }

        let user = self
            .repository
            .create(NewUser {
                email,
                password_hash,
                description: command.description,
                first_name: command.first_name,
                last_name: command.last_name,
                active: command.active,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User created");

        Ok(user)
    }

    async fn find_by_email(
        &self,
        email: &str,
        active: Option<bool>,
    ) -> Result<Option<User>, UserError> {
        self.repository.find_by_email(email, active).await
    }
}
