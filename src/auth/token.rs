use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by an issued token.
///
/// `jti` is a fresh random value per token so two tokens minted for the same
/// account within the same second still differ.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: i64,
    pub iat: i64,
    pub jti: Uuid,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Covers malformed, expired and forged tokens alike. Callers are not
    /// told which check failed.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("token could not be signed")]
    TokenCreation,
}

/// Issues and verifies HMAC-SHA256 signed identity tokens.
///
/// Stateless: a token is valid iff its signature matches the configured
/// secret and its expiry has not passed. Signature comparison is done by
/// `jsonwebtoken` via MAC verification, not string equality.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        let mut validation = Validation::default();
        // Default leeway is 60s; expiry here is exact
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry: Duration::hours(expiry_hours as i64),
        }
    }

    /// Issue a token for an account, valid for the configured horizon.
    pub fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        self.issue_with_expiry(user_id, self.expiry)
    }

    /// Issue a token with an explicit lifetime. A negative duration produces
    /// an already-expired token, which tests use to exercise rejection.
    pub fn issue_with_expiry(
        &self,
        user_id: i64,
        expires_in: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            tracing::error!("token signing failed: {}", e);
            AuthError::TokenCreation
        })
    }

    /// Verify a token and return the account key it asserts.
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            // The reason stays out of responses; collapse everything
            tracing::debug!("token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        Ok(data.claims.sub)
    }
}
