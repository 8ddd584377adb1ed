use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    dto::auth::{Claims, TokenPurpose},
    error::{AppError, AppResult},
    models::Role,
};

/// Signs and verifies HS256 bearer tokens.
///
/// Session and verification tokens share the secret but carry their purpose
/// as a claim, so one can never stand in for the other.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    session_ttl: Duration,
    verification_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenService {
    pub fn new(secret: &str, session_ttl: Duration, verification_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl,
            verification_ttl,
        }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
        purpose: TokenPurpose,
    ) -> AppResult<IssuedToken> {
        let ttl = match purpose {
            TokenPurpose::Session => self.session_ttl,
            TokenPurpose::Verification => self.verification_ttl,
        };
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.as_str().to_string(),
            purpose,
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Bad signature, malformed input, expiry and wrong purpose all fail the same way.
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> AppResult<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let decoded = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            tracing::debug!(error = %err, "token rejected");
            AppError::unauthenticated()
        })?;

        if decoded.claims.purpose != purpose {
            tracing::debug!(expected = ?purpose, got = ?decoded.claims.purpose, "token purpose mismatch");
            return Err(AppError::unauthenticated());
        }
        Ok(decoded.claims)
    }
}

impl Claims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::unauthenticated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::days(7), Duration::days(1))
    }

    #[test]
    fn session_token_round_trips_claims() {
        let tokens = service();
        let id = Uuid::new_v4();
        let issued = tokens
            .issue(id, "ann@x.com", Role::Customer, TokenPurpose::Session)
            .unwrap();

        let claims = tokens.verify(&issued.token, TokenPurpose::Session).unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.role, "customer");
        assert_eq!(claims.email, "ann@x.com");
        assert!(issued.expires_at > Utc::now() + Duration::days(6));
    }

    #[test]
    fn verification_ttl_is_shorter() {
        let issued = service()
            .issue(Uuid::new_v4(), "a@b.io", Role::Customer, TokenPurpose::Verification)
            .unwrap();
        assert!(issued.expires_at < Utc::now() + Duration::days(2));
    }

    #[test]
    fn purpose_is_enforced() {
        let tokens = service();
        let issued = tokens
            .issue(Uuid::new_v4(), "a@b.io", Role::Customer, TokenPurpose::Verification)
            .unwrap();
        let err = tokens.verify(&issued.token, TokenPurpose::Session).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn rejects_foreign_signature_garbage_and_expiry() {
        let other = TokenService::new("other-secret", Duration::days(7), Duration::days(1));
        let issued = other
            .issue(Uuid::new_v4(), "a@b.io", Role::Admin, TokenPurpose::Session)
            .unwrap();
        assert!(service().verify(&issued.token, TokenPurpose::Session).is_err());
        assert!(service().verify("not-a-token", TokenPurpose::Session).is_err());

        let expired = TokenService::new("test-secret", Duration::seconds(-30), Duration::days(1));
        let issued = expired
            .issue(Uuid::new_v4(), "a@b.io", Role::Customer, TokenPurpose::Session)
            .unwrap();
        assert!(service().verify(&issued.token, TokenPurpose::Session).is_err());
    }
}
