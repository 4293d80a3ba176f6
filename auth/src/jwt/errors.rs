use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Claim-shape validation failure.
///
/// Holds every problem found in a single pass so that one response can
/// report all of them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to validate token claims: {}", .problems.join(", "))]
pub struct ClaimsError {
    problems: Vec<String>,
}

impl ClaimsError {
    pub(crate) fn new(problems: Vec<String>) -> Self {
        Self { problems }
    }

    /// Individual validation problems, in detection order.
    pub fn problems(&self) -> &[String] {
        &self.problems
    }
}

/// Error type for token verification.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("token header has no key ID")]
    MissingKeyId,

    #[error("no signing key found for key ID '{0}'")]
    UnknownKeyId(String),

    #[error("failed to fetch signing keys: {0}")]
    KeySetUnavailable(String),

    #[error("signing key is unusable: {0}")]
    InvalidKey(String),

    #[error("token is expired")]
    TokenExpired,

    #[error("token issuer is invalid")]
    InvalidIssuer,

    #[error("token audience is invalid")]
    InvalidAudience,

    #[error("token is invalid: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Claims(#[from] ClaimsError),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
            ErrorKind::InvalidAudience => JwtError::InvalidAudience,
            _ => JwtError::InvalidToken(error.to_string()),
        }
    }
}
