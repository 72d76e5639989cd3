//! Stateless bearer tokens.
//!
//! Tokens are compact HS256 JWTs: `base64url(header).base64url(claims).base64url(mac)`
//! with unpadded segments. Verification needs only the secret, so there is no
//! session table and no way to revoke a token before it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use reporter_types::api::Claims;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not three dot-separated segments")]
    Malformed,
    #[error("token signature mismatch")]
    InvalidSignature,
    #[error("token payload is not valid claims: {0}")]
    InvalidPayload(String),
    #[error("token expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expired means expired; no grace period.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Signs with the codec's configured lifetime.
    pub fn issue(&self, claims: Claims) -> Result<String, TokenError> {
        self.sign(claims, self.ttl)
    }

    /// Signs `claims` valid for `ttl` from now. Any `iat`/`exp` already on
    /// the claims is replaced.
    pub fn sign(&self, mut claims: Claims, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        claims.iat = now.timestamp();
        claims.exp = (now + ttl).timestamp();

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Checks the MAC, then decodes the claims, then checks expiry. Claims
    /// are only returned when every step passes.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidToken => TokenError::Malformed,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::InvalidPayload(err.to_string()),
    }
}
