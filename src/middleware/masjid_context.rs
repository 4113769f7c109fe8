use axum::{
    async_trait,
    extract::{FromRequestParts, RawPathParams, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ContextError;
use crate::auth::mode::is_safe_read;
use crate::auth::{authorize, token, AppMode, ClaimSet, GateDecision, Role, TokenPolicy};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::{RevocationCheck, TenantStore};
use crate::tenant::{ResolutionInput, ResolutionSource, TenantResolver};

/// Collaborators and settings shared by every guarded route group
#[derive(Clone)]
pub struct ContextServices {
    pub store: Arc<dyn TenantStore>,
    pub revocation: Option<Arc<dyn RevocationCheck>>,
    pub token_policy: TokenPolicy,
    pub root_domain: Option<String>,
    pub allow_public_no_auth: bool,
}

impl ContextServices {
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn TenantStore>,
        revocation: Option<Arc<dyn RevocationCheck>>,
    ) -> Self {
        Self {
            store,
            revocation,
            token_policy: TokenPolicy {
                secret: config.security.jwt_secret.clone(),
                cookie_fallback: config.security.cookie_fallback,
                cookie_name: config.security.access_cookie_name.clone(),
            },
            root_domain: config.tenancy.root_domain.clone(),
            allow_public_no_auth: config.tenancy.allow_public_no_auth,
        }
    }
}

/// Middleware state for one route group: the shared services plus the group's mode
#[derive(Clone)]
pub struct RouteGuard {
    services: ContextServices,
    mode: AppMode,
}

impl RouteGuard {
    pub fn new(services: ContextServices, mode: AppMode) -> Self {
        Self { services, mode }
    }
}

/// The masjid the request is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveMasjid {
    pub id: Uuid,
    pub slug: Option<String>,
    pub domain: Option<String>,
}

/// Per-request decision handed to handlers. Only ever built for requests that
/// passed the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedContext {
    pub mode: AppMode,
    pub authenticated: bool,
    pub masjid: Option<ActiveMasjid>,
    pub source: Option<ResolutionSource>,
    pub claims: ClaimSet,
}

/// Field shapes older handlers expect, derived from [`ResolvedContext`] on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyContext {
    pub masjid_id: Option<Uuid>,
    pub masjid_slug: Option<String>,
    pub masjid_domain: Option<String>,
    pub role: String,
    pub is_owner: bool,
    pub is_admin: bool,
    pub is_teacher: bool,
    pub masjid_ids: Vec<Uuid>,
    pub masjid_admin_ids: Vec<Uuid>,
    pub masjid_teacher_ids: Vec<Uuid>,
}

impl ResolvedContext {
    pub fn masjid_id(&self) -> Option<Uuid> {
        self.masjid.as_ref().map(|m| m.id)
    }

    fn holds_any(&self, wanted: &[Role]) -> bool {
        self.masjid_id()
            .and_then(|id| self.claims.roles_for(id))
            .is_some_and(|roles| roles.iter().any(|r| wanted.contains(r)))
    }

    pub fn is_owner(&self) -> bool {
        self.masjid_id()
            .is_some_and(|id| self.claims.has_role_in(id, Role::Owner))
    }

    pub fn is_admin_like(&self) -> bool {
        self.holds_any(AppMode::Admin.required_roles())
    }

    pub fn is_teacher_like(&self) -> bool {
        self.holds_any(AppMode::Teacher.required_roles())
    }

    /// Highest-ranking role in the active masjid that satisfies the group's mode
    pub fn primary_role(&self) -> Option<Role> {
        let roles = self.claims.roles_for(self.masjid_id()?)?;
        roles.iter().copied().find(|r| self.mode.is_satisfied_by(*r))
    }

    pub fn legacy(&self) -> LegacyContext {
        let ids_where = |mode: AppMode| -> Vec<Uuid> {
            self.claims
                .tenant_roles
                .iter()
                .filter(|entry| entry.roles.iter().any(|r| mode.is_satisfied_by(*r)))
                .map(|entry| entry.masjid_id)
                .collect()
        };

        LegacyContext {
            masjid_id: self.masjid_id(),
            masjid_slug: self.masjid.as_ref().and_then(|m| m.slug.clone()),
            masjid_domain: self.masjid.as_ref().and_then(|m| m.domain.clone()),
            role: self.primary_role().map(|r| r.to_string()).unwrap_or_default(),
            is_owner: self.is_owner(),
            is_admin: self.is_admin_like(),
            is_teacher: self.is_teacher_like(),
            masjid_ids: self.claims.masjid_ids(),
            masjid_admin_ids: ids_where(AppMode::Admin),
            masjid_teacher_ids: ids_where(AppMode::Teacher),
        }
    }
}

/// Authenticate, resolve the active masjid, check roles for the group's mode,
/// then publish a [`ResolvedContext`] for downstream handlers.
pub async fn masjid_context_middleware(
    State(guard): State<RouteGuard>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    let route_slug = RawPathParams::from_request_parts(&mut parts, &())
        .await
        .ok()
        .and_then(|params| {
            params
                .iter()
                .find(|(key, _)| *key == "slug")
                .map(|(_, value)| value.to_string())
        });

    let context = resolve_context(&guard, &parts, route_slug).await.map_err(|e| {
        tracing::warn!(
            "Masjid context rejected for {} {} ({} mode): {}",
            parts.method,
            parts.uri.path(),
            guard.mode,
            e
        );
        ApiError::from(e)
    })?;

    tracing::debug!(
        "Masjid context for {} {}: masjid={:?} via {:?}",
        parts.method,
        parts.uri.path(),
        context.masjid_id(),
        context.source
    );

    parts.extensions.insert(context);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn resolve_context(
    guard: &RouteGuard,
    parts: &Parts,
    route_slug: Option<String>,
) -> Result<ResolvedContext, ContextError> {
    let services = &guard.services;
    let mode = guard.mode;
    let allow_public = services.allow_public_no_auth;

    let raw_claims = token::authenticate(
        &parts.headers,
        &services.token_policy,
        services.revocation.as_deref(),
    )
    .await?;

    let authenticated = raw_claims.is_some();
    let claims = match raw_claims {
        Some(raw) => ClaimSet::from_claims(&raw),
        None if mode.allows_public_reads() && allow_public && is_safe_read(&parts.method) => {
            ClaimSet::anonymous()
        }
        None => return Err(ContextError::MissingCredential),
    };

    let input = ResolutionInput::from_request(&parts.headers, route_slug);
    let resolver = TenantResolver::new(&*services.store, services.root_domain.as_deref());
    let resolution = resolver
        .resolve_for(&input, &claims, mode, &parts.method, allow_public)
        .await?;

    let masjid_id = resolution.as_ref().map(|r| r.masjid.id);
    if authorize(&claims, masjid_id, mode, &parts.method, allow_public) == GateDecision::Deny {
        return Err(match masjid_id {
            Some(tenant_id) => ContextError::Forbidden { tenant_id, mode },
            None => ContextError::TenantNotResolved,
        });
    }

    let (masjid, source) = match resolution {
        Some(r) => (
            Some(ActiveMasjid {
                id: r.masjid.id,
                slug: r.masjid.slug,
                domain: r.masjid.domain,
            }),
            Some(r.source),
        ),
        None => (None, None),
    };

    Ok(ResolvedContext {
        mode,
        authenticated,
        masjid,
        source,
        claims,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for ResolvedContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedContext>()
            .cloned()
            .ok_or_else(|| ApiError::internal_server_error("Masjid context missing from request"))
    }
}
