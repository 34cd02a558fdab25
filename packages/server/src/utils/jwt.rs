use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use jsonwebtoken::errors::Error as JwtError;

/// Claims of a short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid, // User ID
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

/// Claims of a refresh token. Carries nothing but the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid, // User ID
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

/// Sign claims with HS256.
pub fn sign<C: Serialize>(claims: &C, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry, then decode the claims.
pub fn verify<C: DeserializeOwned>(token: &str, secret: &str) -> Result<C, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);
    let token_data = decode::<C>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
