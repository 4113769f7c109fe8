use uuid::Uuid;

use crate::auth::AppMode;
use crate::services::StoreError;

/// Reasons the masjid context pipeline rejects a request.
///
/// Rendered to HTTP through `ApiError`: credential problems are 401, bad or
/// missing masjid references 400, role failures 403, store failures 500.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("missing bearer token")]
    MissingCredential,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has been revoked")]
    TokenRevoked,

    #[error("malformed masjid id header: {0}")]
    MalformedTenantId(String),

    #[error("masjid not resolved from context")]
    TenantNotResolved,

    #[error("caller lacks {mode} role for masjid {tenant_id}")]
    Forbidden { tenant_id: Uuid, mode: AppMode },

    #[error("store lookup failed: {0}")]
    Lookup(#[from] StoreError),
}
