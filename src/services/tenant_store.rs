use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::database::models::MasjidRecord;

/// Lookup capability used by context resolution.
///
/// Every method returns only active (not soft-deleted) masjids. `Ok(None)` means
/// "no such masjid"; `Err` is reserved for the store itself failing.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MasjidRecord>, StoreError>;

    /// Case-insensitive exact slug match
    async fn find_by_slug(&self, slug: &str) -> Result<Option<MasjidRecord>, StoreError>;

    /// Case-insensitive exact custom domain match
    async fn find_by_domain(&self, domain: &str) -> Result<Option<MasjidRecord>, StoreError>;
}

/// Postgres-backed masjid lookups against the `masjids` table
#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_ACTIVE: &str = r#"
    SELECT masjid_id, masjid_slug, masjid_domain
    FROM masjids
    WHERE masjid_deleted_at IS NULL
"#;

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MasjidRecord>, StoreError> {
        let query = format!("{} AND masjid_id = $1 LIMIT 1", SELECT_ACTIVE);
        let row = sqlx::query_as::<_, MasjidRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<MasjidRecord>, StoreError> {
        let query = format!("{} AND LOWER(masjid_slug) = LOWER($1) LIMIT 1", SELECT_ACTIVE);
        let row = sqlx::query_as::<_, MasjidRecord>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<MasjidRecord>, StoreError> {
        let query = format!("{} AND LOWER(masjid_domain) = LOWER($1) LIMIT 1", SELECT_ACTIVE);
        let row = sqlx::query_as::<_, MasjidRecord>(&query)
            .bind(domain)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
