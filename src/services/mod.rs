pub mod revocation;
pub mod tenant_store;

pub use revocation::{PgRevocationStore, RevocationCheck};
pub use tenant_store::{PgTenantStore, TenantStore};

/// Failure of a backing store itself, as opposed to "no such row"
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
