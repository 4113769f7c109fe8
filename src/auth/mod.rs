pub mod claims;
pub mod mode;
pub mod token;

pub use claims::{ClaimSet, Role, TenantRoles};
pub use mode::{authorize, AppMode, GateDecision};
pub use token::TokenPolicy;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// One `masjid_roles` entry as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasjidRoleClaim {
    pub masjid_id: Uuid,
    pub roles: Vec<String>,
}

/// Payload of tokens minted by this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    #[serde(default)]
    pub roles_global: Vec<String>,
    #[serde(default)]
    pub masjid_roles: Vec<MasjidRoleClaim>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_masjid_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

impl TokenClaims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            roles_global: Vec::new(),
            masjid_roles: Vec::new(),
            active_masjid_id: None,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn with_masjid_role(mut self, masjid_id: Uuid, roles: &[&str]) -> Self {
        self.masjid_roles.push(MasjidRoleClaim {
            masjid_id,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        });
        self
    }

    pub fn with_active_masjid(mut self, masjid_id: Uuid) -> Self {
        self.active_masjid_id = Some(masjid_id);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Sign claims with the configured secret
pub fn generate_jwt(claims: &TokenClaims) -> Result<String, JwtError> {
    generate_jwt_with_secret(claims, &config::config().security.jwt_secret)
}

pub fn generate_jwt_with_secret(claims: &TokenClaims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}
