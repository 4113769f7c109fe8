use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use super::StoreError;

/// Answers whether a raw bearer token has been revoked (logout, forced sign-out)
#[async_trait]
pub trait RevocationCheck: Send + Sync {
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError>;
}

/// Blacklist stored in `token_blacklist`, keyed by SHA-256 of the raw token
#[derive(Clone)]
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Hex SHA-256 of the token; raw tokens are never stored
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl RevocationCheck for PgRevocationStore {
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM token_blacklist
             WHERE token_hash = $1 AND deleted_at IS NULL AND expired_at > NOW()",
        )
        .bind(token_fingerprint(token))
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }
}
