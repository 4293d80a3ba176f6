use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::errors::ClaimsError;

const SUBJECT_CLAIM: &str = "sub";
const EMAIL_SUFFIX: &str = "email";

/// Custom claims decoded from an already verified token.
///
/// Identity providers namespace their custom claims (for example
/// `https://example.com/email`), so the claims are kept as a raw map and the
/// interesting values are located by [`CustomClaims::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomClaims(Map<String, Value>);

impl CustomClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim (builder style).
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Validate the claim shape and resolve the user identity.
    ///
    /// Requires a string `sub`. The email is taken from the key `email` when
    /// present, otherwise from the lexicographically smallest key ending in
    /// `email`; no such key resolves to an empty email. All problems are
    /// collected before failing.
    ///
    /// # Errors
    /// * `ClaimsError` - One or more claims are missing or mistyped
    pub fn validate(self) -> Result<ValidatedClaims, ClaimsError> {
        let mut problems = Vec::new();

        let user_id = match self.0.get(SUBJECT_CLAIM) {
            None => {
                problems.push("no user ID found in claims".to_string());
                None
            }
            Some(Value::String(user_id)) => Some(user_id.clone()),
            Some(other) => {
                problems.push(format!(
                    "user ID '{}' from claims has unexpected type: expected 'string', got '{}'",
                    other,
                    type_name(other)
                ));
                None
            }
        };

        let email = match self.email_claim() {
            None => Some(String::new()),
            Some(Value::String(email)) => Some(email.clone()),
            Some(other) => {
                problems.push(format!(
                    "email '{}' from claims has unexpected type: expected 'string', got '{}'",
                    other,
                    type_name(other)
                ));
                None
            }
        };

        match (user_id, email) {
            (Some(user_id), Some(email)) => Ok(ValidatedClaims {
                claims: self,
                user_id,
                email,
            }),
            _ => Err(ClaimsError::new(problems)),
        }
    }

    fn email_claim(&self) -> Option<&Value> {
        if let Some(value) = self.0.get(EMAIL_SUFFIX) {
            return Some(value);
        }

        // Map iteration order depends on serde_json features, so pick explicitly.
        self.0
            .iter()
            .filter(|(key, _)| key.ends_with(EMAIL_SUFFIX))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, value)| value)
    }
}

/// Claims that passed [`CustomClaims::validate`], with the parsed identity
/// cached next to the raw map.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedClaims {
    claims: CustomClaims,
    user_id: String,
    email: String,
}

impl ValidatedClaims {
    /// Subject of the token (the durable user identifier of the issuer).
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Parsed email; empty when the token carries no email claim.
    pub fn user_email(&self) -> &str {
        &self.email
    }

    pub fn claims(&self) -> &CustomClaims {
        &self.claims
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
