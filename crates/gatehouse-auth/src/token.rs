//! Session token signing and verification
//!
//! Tokens are HS256 JWTs bound to an account id. The signing key is fixed
//! when the [`TokenCodec`] is built at startup; changing it invalidates every
//! outstanding token. There is no revocation list, so expiry is the only
//! lifecycle bound.

use chrono::{DateTime, TimeZone, Utc};
use gatehouse_core::AuthConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - account id
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: u64,
    /// Expiration (Unix seconds)
    pub exp: u64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token lifetime of {0}s is out of range")]
    InvalidLifetime(u64),

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// A freshly minted token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with one process-wide secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: u64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

fn now_secs() -> Result<u64, TokenError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_secret(&config.jwt_secret, &config.issuer, config.token_ttl_secs)
    }

    pub fn with_secret(secret: &str, issuer: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.to_string(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Mint a token for `subject`, valid for the configured lifetime from now
    pub fn issue(&self, subject: Uuid) -> Result<IssuedToken, TokenError> {
        let now = now_secs()?;
        let exp = now
            .checked_add(self.ttl_secs)
            .ok_or(TokenError::InvalidLifetime(self.ttl_secs))?;
        let expires_at = i64::try_from(exp)
            .ok()
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
            .ok_or(TokenError::InvalidLifetime(self.ttl_secs))?;

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            iat: now,
            exp,
        };
        let token = self.encode(&claims)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Sign an arbitrary claim set
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?)
    }

    /// Check signature, issuer and expiry and return the claims.
    ///
    /// A token is expired once `exp <= now`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::InvalidToken,
            },
        )?;

        if token_data.claims.exp <= now_secs()? {
            return Err(TokenError::ExpiredToken);
        }

        Ok(token_data.claims)
    }

    /// Verify and return the bound account id
    pub fn verify_subject(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims = self.verify(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| TokenError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::with_secret("test-secret", "gatehouse", 86400)
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = codec();
        let user_id = Uuid::new_v4();

        let issued = codec.issue(user_id).unwrap();
        assert_eq!(issued.token.split('.').count(), 3);

        let claims = codec.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "gatehouse");
        assert_eq!(claims.exp - claims.iat, 86400);
        assert_eq!(issued.expires_at.timestamp() as u64, claims.exp);

        assert_eq!(codec.verify_subject(&issued.token).unwrap(), user_id);
    }

    #[test]
    fn test_invalid_token() {
        let codec = codec();
        assert!(matches!(
            codec.verify("invalid.token.here"),
            Err(TokenError::InvalidToken)
        ));
        assert!(codec.verify("").is_err());
        assert!(codec.verify("no-dots-at-all").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let other = TokenCodec::with_secret("other-secret", "gatehouse", 86400);
        let token = other.issue(Uuid::new_v4()).unwrap().token;

        assert!(matches!(
            codec().verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_payload() {
        let codec = codec();
        let token = codec.issue(Uuid::new_v4()).unwrap().token;
        let forged_claims = codec
            .issue(Uuid::new_v4())
            .unwrap()
            .token
            .split('.')
            .nth(1)
            .unwrap()
            .to_string();

        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_claims;
        let tampered = parts.join(".");

        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let now = now_secs().unwrap();

        let token = codec
            .encode(&Claims {
                iss: "gatehouse".to_string(),
                sub: Uuid::new_v4().to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::ExpiredToken)));
    }

    #[test]
    fn test_token_expiring_now_is_rejected() {
        let codec = codec();
        let now = now_secs().unwrap();

        let token = codec
            .encode(&Claims {
                iss: "gatehouse".to_string(),
                sub: Uuid::new_v4().to_string(),
                iat: now - 60,
                exp: now,
            })
            .unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::ExpiredToken)));
    }

    #[test]
    fn test_wrong_issuer() {
        let foreign = TokenCodec::with_secret("test-secret", "someone-else", 86400);
        let token = foreign.issue(Uuid::new_v4()).unwrap().token;
        assert!(matches!(codec().verify(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let now = now_secs().unwrap();
        let claims = Claims {
            iss: "gatehouse".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(codec().verify(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_unrepresentable_lifetime_rejected() {
        let codec = TokenCodec::with_secret("test-secret", "gatehouse", u64::MAX);
        assert!(matches!(
            codec.issue(Uuid::new_v4()),
            Err(TokenError::InvalidLifetime(u64::MAX))
        ));

        let codec = TokenCodec::with_secret("test-secret", "gatehouse", i64::MAX as u64);
        assert!(matches!(
            codec.issue(Uuid::new_v4()),
            Err(TokenError::InvalidLifetime(_))
        ));
    }

    #[test]
    fn test_non_uuid_subject() {
        let codec = codec();
        let now = now_secs().unwrap();
        let token = codec
            .encode(&Claims {
                iss: "gatehouse".to_string(),
                sub: "admin".to_string(),
                iat: now,
                exp: now + 60,
            })
            .unwrap();

        assert!(codec.verify(&token).is_ok());
        assert!(matches!(
            codec.verify_subject(&token),
            Err(TokenError::InvalidToken)
        ));
    }
}
