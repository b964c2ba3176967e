use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SigningKeyError {
    #[error("auth.jwt_secret is not valid base64: {0}")]
    NotBase64(#[from] base64::DecodeError),
    #[error("auth.jwt_secret must decode to at least {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Issues and checks HS256 bearer tokens whose subject is the user's email.
///
/// Expiry is checked against the injected clock rather than the library's
/// own wall-clock read.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// 256 bits.
    pub const MIN_KEY_BYTES: usize = 32;

    pub fn from_base64(
        secret: &str,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SigningKeyError> {
        let key = base64::engine::general_purpose::STANDARD.decode(secret.trim())?;
        Self::new(&key, ttl, clock)
    }

    pub fn new(key: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, SigningKeyError> {
        if key.len() < Self::MIN_KEY_BYTES {
            return Err(SigningKeyError::TooShort {
                min: Self::MIN_KEY_BYTES,
                actual: key.len(),
            });
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            ttl,
            clock,
        })
    }

    pub fn generate(&self, subject: &str) -> AppResult<String> {
        let now = self.clock.now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
    }

    /// False for malformed, tampered or expired tokens.
    pub fn validate(&self, token: &str) -> bool {
        self.claims(token).is_ok()
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.claims(token).map(|claims| claims.sub)
    }

    fn claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?
            .claims;

        if self.clock.now().timestamp() > claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_default();
            tracing::debug!(subject = %claims.sub, %expired_at, "rejected expired token");
            return Err(TokenError::Expired(expired_at));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service_at(at: DateTime<Utc>) -> TokenService {
        TokenService::new(SECRET, Duration::hours(24), Arc::new(FixedClock(at))).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_round_trip_subject() {
        let tokens = service_at(noon());
        let token = tokens.generate("a@x.com").unwrap();
        assert!(tokens.validate(&token));
        assert_eq!(tokens.extract_subject(&token).unwrap(), "a@x.com");
    }

    #[test]
    fn test_token_expires_after_a_day() {
        let token = service_at(noon()).generate("a@x.com").unwrap();

        let almost = service_at(noon() + Duration::hours(24));
        assert!(almost.validate(&token));

        let later = service_at(noon() + Duration::hours(24) + Duration::seconds(1));
        assert!(!later.validate(&token));
        assert!(matches!(later.extract_subject(&token), Err(TokenError::Expired(_))));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let token = service_at(noon()).generate("a@x.com").unwrap();
        let other = TokenService::new(
            b"ffffffffffffffffffffffffffffffff",
            Duration::hours(24),
            Arc::new(FixedClock(noon())),
        )
        .unwrap();
        assert!(!other.validate(&token));
        assert!(!other.validate("not.a.token"));
    }

    #[test]
    fn test_short_key_is_fatal() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(noon()));
        let short = base64::engine::general_purpose::STANDARD.encode(b"too-short");
        assert!(matches!(
            TokenService::from_base64(&short, Duration::hours(24), clock.clone()),
            Err(SigningKeyError::TooShort { min: 32, actual: 9 })
        ));
        assert!(matches!(
            TokenService::from_base64("***", Duration::hours(24), clock),
            Err(SigningKeyError::NotBase64(_))
        ));
    }
}
