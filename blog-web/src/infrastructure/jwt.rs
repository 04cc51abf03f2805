use crate::domain::{BlogError, CurrentUser};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: usize,
}

/// Signs and verifies the session tokens that identify the current user.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, ttl_hours: i64) -> Result<Self, BlogError> {
        tracing::debug!(
            "Initializing JwtService with secret length: {}",
            secret.len()
        );

        if secret.is_empty() {
            return Err(BlogError::Internal("JWT secret must not be empty".to_string()));
        }

        if secret.len() < 32 {
            tracing::warn!(
                "JWT secret is too short ({} chars). Minimum recommended is 32 chars.",
                secret.len()
            );
        }

        let ttl = Duration::try_hours(ttl_hours)
            .filter(|ttl| *ttl > Duration::zero())
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                BlogError::Internal(format!(
                    "Session lifetime must be a positive number of hours, got {}",
                    ttl_hours
                ))
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn generate_token(&self, user: &CurrentUser) -> Result<String, BlogError> {
        tracing::debug!(
            "Generating token for user_id: {}, username: {}",
            user.id,
            user.username
        );

        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| BlogError::Internal("Token expiry out of range".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {}", e);
            BlogError::Internal(format!("Failed to generate token: {}", e))
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<CurrentUser, BlogError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                tracing::debug!("Token verified for user_id: {}", token_data.claims.user_id);
                Ok(CurrentUser {
                    id: token_data.claims.user_id,
                    username: token_data.claims.username,
                })
            }
            Err(e) => {
                tracing::debug!("Token verification failed: {}", e);
                Err(BlogError::Unauthenticated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn alice() -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "alice".to_string(),
        }
    }

    #[test]
    fn issued_token_identifies_the_user() {
        let jwt = JwtService::new(SECRET, 24).unwrap();
        let token = jwt.generate_token(&alice()).unwrap();

        assert_eq!(jwt.verify_token(&token).unwrap(), alice());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let issuer = JwtService::new("another-secret-another-secret-xx", 24).unwrap();
        let token = issuer.generate_token(&alice()).unwrap();

        let jwt = JwtService::new(SECRET, 24).unwrap();
        assert!(matches!(
            jwt.verify_token(&token),
            Err(BlogError::Unauthenticated)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the 60s of leeway the default validation allows.
        let claims = Claims {
            user_id: 1,
            username: "alice".to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let jwt = JwtService::new(SECRET, 24).unwrap();
        assert!(matches!(
            jwt.verify_token(&token),
            Err(BlogError::Unauthenticated)
        ));
    }

    #[test]
    fn session_lifetime_must_be_positive_and_in_range() {
        for ttl_hours in [0, -1, i64::MIN, i64::MAX, 1_000_000_000_000] {
            assert!(
                matches!(
                    JwtService::new(SECRET, ttl_hours),
                    Err(BlogError::Internal(_))
                ),
                "ttl {} accepted",
                ttl_hours
            );
        }
        assert!(JwtService::new(SECRET, 1).is_ok());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(JwtService::new("", 24).is_err());
    }
}
