//! In-memory collaborators for unit tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::auth::ClaimSet;
use crate::database::models::MasjidRecord;
use crate::services::{StoreError, TenantStore};

pub fn claims_from(payload: Value) -> ClaimSet {
    ClaimSet::from_claims(payload.as_object().expect("claims payload must be an object"))
}

/// Masjid table double that records the lookups made against it
#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<MasjidRecord>,
    deleted: HashSet<Uuid>,
    fail: bool,
    lookups: AtomicUsize,
    slug_queries: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: Uuid, slug: Option<&str>, domain: Option<&str>) -> Self {
        self.rows.push(MasjidRecord {
            id,
            slug: slug.map(str::to_string),
            domain: domain.map(str::to_string),
        });
        self
    }

    pub fn deleted(mut self, id: Uuid) -> Self {
        self.deleted.insert(id);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn slug_queries(&self) -> Vec<String> {
        self.slug_queries.lock().unwrap().clone()
    }

    fn find(&self, pred: impl Fn(&MasjidRecord) -> bool) -> Result<Option<MasjidRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .rows
            .iter()
            .filter(|row| !self.deleted.contains(&row.id))
            .find(|row| pred(row))
            .cloned())
    }
}

fn eq_ci(stored: &Option<String>, wanted: &str) -> bool {
    stored.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(wanted))
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MasjidRecord>, StoreError> {
        self.find(|row| row.id == id)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<MasjidRecord>, StoreError> {
        self.slug_queries.lock().unwrap().push(slug.to_string());
        self.find(|row| eq_ci(&row.slug, slug))
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<MasjidRecord>, StoreError> {
        self.find(|row| eq_ci(&row.domain, domain))
    }
}
