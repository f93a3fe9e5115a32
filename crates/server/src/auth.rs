//! Password hashing and bearer tokens.
//!
//! Passwords are stored as Argon2id PHC strings. Tokens are HS256 JWTs whose
//! claims carry everything needed to build an [`engine::Caller`].

use argon2::Argon2;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use engine::{Caller, User};

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Claims embedded in every token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub name: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn caller(&self) -> Caller {
        Caller::new(self.sub, self.is_admin)
    }
}

#[derive(Clone, Debug)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }

    #[must_use]
    pub fn ttl_minutes(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }
}

/// Hash a plaintext password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(AuthError::Hash)?;
    Ok(hash.to_string())
}

/// `Ok(false)` when the password does not match the stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(AuthError::Hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AuthError::Hash(err)),
    }
}

pub fn issue_token(user: &User, config: &TokenConfig) -> Result<String, AuthError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        name: user.username.clone(),
        is_admin: user.is_admin,
        profile_picture: user.profile_picture.clone(),
        exp: now + config.ttl_minutes * 60,
        iat: now,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?)
}

/// Check signature and expiry and return the claims.
pub fn verify_token(token: &str, config: &TokenConfig) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(is_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            is_admin,
            profile_picture: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn every_hash_gets_a_fresh_salt() {
        let first = hash_password("hunter22").unwrap();
        let second = hash_password("hunter22").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("hunter22", &second).unwrap());
    }

    #[test]
    fn token_round_trip_keeps_caller() {
        let config = TokenConfig::new("test-secret");
        let user = user(true);
        let token = issue_token(&user, &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.caller(), Caller::admin(user.id));
        assert_eq!(claims.name, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = issue_token(&user(false), &TokenConfig::new("secret-a")).unwrap();
        assert!(verify_token(&token, &TokenConfig::new("secret-b")).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = TokenConfig::new("test-secret").ttl_minutes(-10);
        let token = issue_token(&user(false), &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
