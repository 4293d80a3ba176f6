use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::EmailError;

/// User aggregate entity.
///
/// Only the password hash is ever held; the plaintext lives in
/// [`CreateUserCommand`] until the service hashes it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub description: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store-assigned user identifier.
///
/// Opaque to the domain: a Postgres sequence value, a MongoDB ObjectId or a
/// Redis counter, always carried in string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to register a new user, exactly as received.
#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub email: String,
    pub password: String,
    pub description: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
}

impl CreateUserCommand {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            description: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            active: true,
        }
    }

    /// Trim surrounding whitespace from every free text field.
    pub fn sanitized(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            password: self.password,
            description: self.description.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            active: self.active,
        }
    }
}

/// Validated, hashed user ready to be written by a repository.
///
/// The repository assigns the identifier and both timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: String,
    pub description: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
}

impl NewUser {
    /// Materialize the persisted record.
    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            description: self.description,
            first_name: self.first_name,
            last_name: self.last_name,
            active: self.active,
            created_at: now,
            updated_at: now,
        }
    }
}
