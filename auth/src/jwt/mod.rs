pub mod claims;
pub mod errors;
pub mod jwks;
pub mod validator;

pub use claims::CustomClaims;
pub use claims::ValidatedClaims;
pub use errors::ClaimsError;
pub use errors::JwtError;
pub use jwks::CachingJwksProvider;
pub use jwks::KeySource;
pub use jwks::StaticKeySource;
pub use validator::TokenValidator;
