use axum::http::{header, HeaderMap, Method};
use serde::Serialize;
use uuid::Uuid;

use super::host::{is_local_or_ip, normalize_host, subdomain_slug};
use crate::auth::mode::is_safe_read;
use crate::auth::{AppMode, ClaimSet};
use crate::database::models::MasjidRecord;
use crate::middleware::ContextError;
use crate::services::TenantStore;

pub const MASJID_ID_HEADERS: [&str; 2] = ["x-masjid-id", "x-tenant-id"];
pub const MASJID_SLUG_HEADERS: [&str; 2] = ["x-masjid-slug", "x-tenant-slug"];

/// Explicit masjid signals carried by one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionInput {
    pub header_id: Option<String>,
    pub header_slug: Option<String>,
    pub route_slug: Option<String>,
    /// Already normalized with [`normalize_host`]
    pub host: Option<String>,
}

impl ResolutionInput {
    pub fn from_request(headers: &HeaderMap, route_slug: Option<String>) -> Self {
        Self {
            header_id: first_id_header(headers),
            header_slug: first_header(headers, &MASJID_SLUG_HEADERS),
            route_slug: route_slug.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            host: headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(normalize_host)
                .filter(|h| !h.is_empty()),
        }
    }
}

fn first_header(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Id headers are read byte-wise so a non-ASCII value still surfaces and
/// fails UUID parsing instead of looking absent.
fn first_id_header(headers: &HeaderMap) -> Option<String> {
    MASJID_ID_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .find(|v| !v.is_empty())
}

/// Which signal produced the active masjid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    HeaderId,
    HeaderSlug,
    RouteSlug,
    TokenHint,
    Subdomain,
    CustomDomain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub masjid: MasjidRecord,
    pub source: ResolutionSource,
}

/// Picks the active masjid for a request by walking the precedence chain:
/// id header, slug header / route slug, token hint, then request host.
pub struct TenantResolver<'a> {
    store: &'a dyn TenantStore,
    root_domain: Option<&'a str>,
}

impl<'a> TenantResolver<'a> {
    pub fn new(store: &'a dyn TenantStore, root_domain: Option<&'a str>) -> Self {
        Self { store, root_domain }
    }

    /// Resolve for a route group. A request that resolves nothing is only let
    /// through for public groups serving anonymous safe reads.
    pub async fn resolve_for(
        &self,
        input: &ResolutionInput,
        claims: &ClaimSet,
        mode: AppMode,
        method: &Method,
        allow_public_no_auth: bool,
    ) -> Result<Option<Resolution>, ContextError> {
        if let Some(resolution) = self.resolve(input, claims).await? {
            return Ok(Some(resolution));
        }

        if mode.allows_public_reads() && allow_public_no_auth && is_safe_read(method) {
            tracing::debug!("No masjid signal; continuing without masjid scope");
            return Ok(None);
        }

        Err(ContextError::TenantNotResolved)
    }

    /// Walk the chain, stopping at the first signal that matches an active masjid.
    /// Signals that match nothing fall through, except a malformed id header.
    pub async fn resolve(
        &self,
        input: &ResolutionInput,
        claims: &ClaimSet,
    ) -> Result<Option<Resolution>, ContextError> {
        if let Some(raw) = &input.header_id {
            let id = Uuid::parse_str(raw).map_err(|_| {
                tracing::warn!("Malformed masjid id header: {}", raw);
                ContextError::MalformedTenantId(raw.clone())
            })?;
            if let Some(found) = self.by_id(id, ResolutionSource::HeaderId).await? {
                return Ok(Some(found));
            }
        }

        if let Some(slug) = &input.header_slug {
            if let Some(found) = self.by_slug(slug, ResolutionSource::HeaderSlug).await? {
                return Ok(Some(found));
            }
        }

        if let Some(slug) = &input.route_slug {
            if let Some(found) = self.by_slug(slug, ResolutionSource::RouteSlug).await? {
                return Ok(Some(found));
            }
        }

        if let Some(id) = claims.tenant_hint() {
            if let Some(found) = self.by_id(id, ResolutionSource::TokenHint).await? {
                return Ok(Some(found));
            }
        }

        match input.host.as_deref() {
            Some(host) if !is_local_or_ip(host) => self.by_host(host).await,
            _ => Ok(None),
        }
    }

    async fn by_host(&self, host: &str) -> Result<Option<Resolution>, ContextError> {
        if let Some(slug) = self.root_domain.and_then(|root| subdomain_slug(host, root)) {
            if let Some(found) = self.by_slug(slug, ResolutionSource::Subdomain).await? {
                return Ok(Some(found));
            }
        }

        let found = self.store.find_by_domain(host).await?;
        Ok(self.hit(found, ResolutionSource::CustomDomain, host))
    }

    async fn by_id(&self, id: Uuid, source: ResolutionSource) -> Result<Option<Resolution>, ContextError> {
        let found = self.store.find_by_id(id).await?;
        Ok(self.hit(found, source, &id.to_string()))
    }

    async fn by_slug(&self, slug: &str, source: ResolutionSource) -> Result<Option<Resolution>, ContextError> {
        let found = self.store.find_by_slug(slug).await?;
        Ok(self.hit(found, source, slug))
    }

    fn hit(&self, found: Option<MasjidRecord>, source: ResolutionSource, signal: &str) -> Option<Resolution> {
        match found {
            Some(masjid) => {
                tracing::debug!("Masjid {} resolved via {:?} ({})", masjid.id, source, signal);
                Some(Resolution { masjid, source })
            }
            None => {
                tracing::debug!("{:?} signal '{}' matched no active masjid", source, signal);
                None
            }
        }
    }
}
