//! HS256 bearer tokens. The subject is the user id; nothing else in the
//! token is trusted.

use chrono::Utc;
use domains::{DomainError, Result, Session, TokenVerifier};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

pub struct JwtTokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_seconds: i64,
}

impl JwtTokenVerifier {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Signs a token for `user_id`. Used by the seed tool and tests; real
    /// deployments receive tokens from the identity provider.
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now.saturating_add(self.ttl_seconds),
            iat: now,
            iss: self.issuer.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| DomainError::Unauthorized(format!("could not sign token: {err}")))
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<Session> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            tracing::debug!(error = %err, "rejected bearer token");
            DomainError::Unauthorized("invalid or expired token".to_string())
        })?;
        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| DomainError::Unauthorized("token subject is not a user id".to_string()))?;
        Ok(Session::new(user_id))
    }
}
