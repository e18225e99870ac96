use crate::error::AppError;
use crate::store::SessionRecord;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// The user the session belongs to.
    pub sub: Uuid,
    /// Server-side session id; the token is only honoured while that row exists.
    pub sid: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// HS256 keys for signing and verifying session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for `session`, expiring together with it.
    ///
    /// Returns `AppError::InternalServerError` if encoding fails.
    pub fn sign(&self, session: &SessionRecord) -> Result<String, AppError> {
        let claims = SessionClaims {
            sub: session.user_id,
            sid: session.id,
            iat: session.created_at.timestamp().max(0) as usize,
            exp: session.expires_at.timestamp().max(0) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to sign session: {}", e)))
    }

    /// Verifies the signature and expiry of `token` and decodes its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature
    /// is invalid, or it has expired.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
