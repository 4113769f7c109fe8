// handlers/context.rs - GET /api/{a,t,u}/context and /api/{a,t,u}/:slug/context

use serde::Serialize;
use std::collections::BTreeSet;

use crate::auth::{AppMode, Role};
use crate::middleware::{ActiveMasjid, ApiResponse, ApiResult, LegacyContext, ResolvedContext};
use crate::tenant::ResolutionSource;

#[derive(Debug, Serialize)]
pub struct ContextView {
    pub mode: AppMode,
    pub authenticated: bool,
    pub subject: Option<String>,
    pub masjid: Option<ActiveMasjid>,
    pub source: Option<ResolutionSource>,
    pub roles: BTreeSet<Role>,
    pub global_roles: BTreeSet<Role>,
    pub is_owner: bool,
    pub is_admin_like: bool,
    pub is_teacher_like: bool,
    pub legacy: LegacyContext,
}

/// Returns the masjid context the middleware resolved for this request.
///
/// The `:slug` variant exists so the route parameter participates in
/// resolution; the handler itself ignores it.
pub async fn context_get(ctx: ResolvedContext) -> ApiResult<ContextView> {
    let roles = ctx
        .masjid_id()
        .and_then(|id| ctx.claims.roles_for(id))
        .cloned()
        .unwrap_or_default();

    Ok(ApiResponse::success(ContextView {
        mode: ctx.mode,
        authenticated: ctx.authenticated,
        subject: ctx.claims.subject.clone(),
        masjid: ctx.masjid.clone(),
        source: ctx.source,
        roles,
        global_roles: ctx.claims.global_roles.clone(),
        is_owner: ctx.is_owner(),
        is_admin_like: ctx.is_admin_like(),
        is_teacher_like: ctx.is_teacher_like(),
        legacy: ctx.legacy(),
    }))
}
