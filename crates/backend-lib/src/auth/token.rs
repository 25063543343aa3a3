// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Access-token signing and opaque refresh-token generation.
//!
//! Access tokens are stateless HS256 JWTs verified purely by signature and
//! expiry; refresh tokens are opaque random strings that only mean anything
//! to the refresh-token ledger.

use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refresh-token size in bytes (32 bytes = 256 bits of entropy)
const REFRESH_TOKEN_BYTES: usize = 32;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user id
    sub: String,
    /// Expiry, seconds since the Unix epoch
    exp: i64,
    /// Issued-at, seconds since the Unix epoch
    iat: i64,
}

/// Stateless signer/verifier for short-lived access tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
        }
    }

    /// Issue an access token for `subject`, expiring `access_ttl` from now.
    pub fn issue_access_token(&self, subject: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + self.access_ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Verify an access token and return its subject.
    ///
    /// Purely computational: signature and expiry only, never a store
    /// lookup. Any malformed, tampered, or expired token is `InvalidToken`.
    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::InvalidToken)?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::InvalidToken)
    }
}

/// Generate an opaque refresh token from OS entropy.
///
/// Base64 URL-safe without padding; structurally unrelated to the JWT so it
/// cannot be decoded or confused with an access token.
pub fn generate_refresh_token() -> String {
    let mut buffer = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}
