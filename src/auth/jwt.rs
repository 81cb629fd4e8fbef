//! Signed session token handling

use crate::auth::models::{AccountInfo, Role};
use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Account email
    pub email: String,
    /// Access level
    pub role: String,
    /// Token ID, used for server-side revocation
    pub jti: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

impl Claims {
    /// Create claims for an account's public projection
    pub fn new(account: &AccountInfo, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: account.id.clone(),
            email: account.email.clone(),
            role: account.role.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        }
    }

    /// Get the access level carried by the token
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    /// Whether the token may perform mutating dashboard actions
    pub fn can_write(&self) -> bool {
        matches!(self.role(), Role::Admin | Role::User)
    }

    /// Whether the token belongs to an administrator
    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.exp
    }
}

/// Sign an already-built set of claims
pub fn sign_claims(claims: &Claims, secret: &[u8]) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| Error::Internal(format!("Failed to create token: {}", e)))
}

/// Create a signed session token
pub fn create_token(account: &AccountInfo, secret: &[u8], ttl: Duration) -> Result<String> {
    sign_claims(&Claims::new(account, ttl), secret)
}

/// Validate signature and expiry of a session token and decode its claims
pub fn validate_token(token: &str, secret: &[u8]) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| Error::Token(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &[u8] = b"test-secret";

    fn account() -> AccountInfo {
        let now = Utc::now();
        AccountInfo {
            id: "a1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Admin,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_and_validate_token() {
        let token = create_token(&account(), SECRET, Duration::from_secs(3600)).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "a1");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role(), Role::Admin);
        assert!(!claims.is_expired());
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&account(), SECRET, Duration::from_secs(3600)).unwrap();
        assert!(validate_token(&token, b"other-secret").is_err());
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!(validate_token("invalid.token.here", SECRET).is_err());
        assert!(validate_token("not-a-token", SECRET).is_err());
    }

    #[test]
    fn test_token_never_carries_password_material() {
        let token = create_token(&account(), SECRET, Duration::from_secs(3600)).unwrap();
        // the payload is base64 of the claims JSON
        assert!(!token.contains("password"));
        let claims = validate_token(&token, SECRET).unwrap();
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_tokens_have_unique_ids() {
        let t1 = create_token(&account(), SECRET, Duration::from_secs(3600)).unwrap();
        let t2 = create_token(&account(), SECRET, Duration::from_secs(3600)).unwrap();
        let c1 = validate_token(&t1, SECRET).unwrap();
        let c2 = validate_token(&t2, SECRET).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }
}
