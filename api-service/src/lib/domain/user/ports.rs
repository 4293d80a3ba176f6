use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Raw registration data, plaintext password included
    ///
    /// # Returns
    /// Persisted user with its store-assigned identifier
    ///
    /// # Errors
    /// * `PasswordRequired` - Password is empty (checked before anything else)
    /// * `InvalidEmail` - Email is not a valid address after trimming
    /// * `Conflict` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn insert(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Look up a user by exact email.
    ///
    /// # Arguments
    /// * `email` - Email to match
    /// * `active` - Restrict to users with this active flag, if given
    ///
    /// # Returns
    /// `None` when no user matches
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_email(
        &self,
        email: &str,
        active: Option<bool>,
    ) -> Result<Option<User>, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Arguments
    /// * `user` - Validated user with hashed password
    ///
    /// # Returns
    /// Stored user, with identifier and timestamps assigned by the store
    ///
    /// # Errors
    /// * `Conflict` - Storage-level uniqueness violation on email
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Arguments
    /// * `email` - Email address string
    /// * `active` - Optional active flag filter
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(
        &self,
        email: &str,
        active: Option<bool>,
    ) -> Result<Option<User>, UserError>;
}
