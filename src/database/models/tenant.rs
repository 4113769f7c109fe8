use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Minimal projection of a masjid row used for context resolution.
/// Rows are only ever loaded with `masjid_deleted_at IS NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MasjidRecord {
    #[sqlx(rename = "masjid_id")]
    pub id: Uuid,
    #[sqlx(rename = "masjid_slug")]
    pub slug: Option<String>,
    #[sqlx(rename = "masjid_domain")]
    pub domain: Option<String>,
}
