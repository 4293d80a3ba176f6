//! Authentication utilities library
//!
//! Provides the authentication building blocks of the API service:
//! - Password hashing (Argon2id)
//! - Custom claims validation with type-state (`CustomClaims` -> `ValidatedClaims`)
//! - RS256 token validation against a cached remote JWKS
//! - Bearer header authentication (`Authenticator`)
//!
//! The service owns the HTTP wiring; this crate has no web framework
//! dependency.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Claims Validation
//! ```
//! use auth::CustomClaims;
//!
//! let claims = CustomClaims::new()
//!     .with_claim("sub", "auth0|123")
//!     .with_claim("https://example.com/email", "alice@example.com");
//!
//! let validated = claims.validate().unwrap();
//! assert_eq!(validated.user_id(), "auth0|123");
//! assert_eq!(validated.user_email(), "alice@example.com");
//! ```
//!
//! ## Bearer Authentication
//! ```no_run
//! use auth::Authenticator;
//!
//! # async fn run() -> Result<(), auth::AuthenticationError> {
//! let audience = vec!["https://api.example.com".to_string()];
//! let authenticator = Authenticator::for_domain("example.eu.auth0.com", &audience, None)?;
//!
//! let claims = authenticator.authenticate(Some("Bearer eyJ...")).await?;
//! println!("Authenticated {}", claims.user_id());
//! # Ok(())
//! # }
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::bearer_token;
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::ClaimsError;
pub use jwt::CustomClaims;
pub use jwt::JwtError;
pub use jwt::KeySource;
pub use jwt::StaticKeySource;
pub use jwt::ValidatedClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
