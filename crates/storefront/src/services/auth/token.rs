//! Signed, short-lived access tokens.
//!
//! Tokens are HS256 JWTs carrying the account ID and role. Verification is
//! stateless: nothing is stored server-side, so a token stays valid until it
//! expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use online_shop_core::{AccountId, Role};

/// How long an issued token stays valid.
pub const TOKEN_TTL: Duration = Duration::minutes(15);

/// Errors from issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The signing key is empty.
    #[error("token signing key is not configured")]
    MissingKey,

    /// Bad signature, malformed token or expired.
    #[error("invalid token")]
    Invalid,

    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account the token was issued to.
    pub sub: AccountId,
    /// Role at the time of issue.
    pub role: Role,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

/// Issues and verifies access tokens with one immutable HMAC key.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a token service from the signing secret.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::MissingKey` if the secret is empty.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let key = secret.expose_secret().as_bytes();
        if key.is_empty() {
            return Err(TokenError::MissingKey);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // jsonwebtoken only counts a string `sub` as present. Ours is numeric,
        // and `Claims` deserialization already rejects a token without it.
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        })
    }

    /// Issue a token valid for [`TOKEN_TTL`] from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue(&self, account_id: AccountId, role: Role) -> Result<String, TokenError> {
        self.issue_at(account_id, role, Utc::now())
    }

    /// Issue a token as if it were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue_at(
        &self,
        account_id: AccountId,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: account_id,
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + TOKEN_TTL).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verify a token's signature, structure and expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if any check fails.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                TokenError::Invalid
            })
    }
}
