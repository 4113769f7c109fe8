use axum::http::Method;
use serde::Serialize;
use std::fmt;

use super::claims::{ClaimSet, Role};

/// Capability tier a route group requires, fixed when the router is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Admin,
    Teacher,
    Public,
}

impl AppMode {
    /// Roles that satisfy this mode. Owner is accepted everywhere.
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            AppMode::Admin => &[Role::Owner, Role::Admin, Role::Dkm],
            AppMode::Teacher => &[Role::Owner, Role::Teacher],
            AppMode::Public => &[
                Role::Owner,
                Role::Admin,
                Role::Dkm,
                Role::Teacher,
                Role::Author,
                Role::Student,
                Role::User,
            ],
        }
    }

    pub fn is_satisfied_by(&self, role: Role) -> bool {
        self.required_roles().contains(&role)
    }

    /// Whether this mode can serve anonymous reads at all
    pub fn allows_public_reads(&self) -> bool {
        matches!(self, AppMode::Public)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Admin => "admin",
            AppMode::Teacher => "teacher",
            AppMode::Public => "public",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only GET qualifies for the anonymous no-masjid exception
pub fn is_safe_read(method: &Method) -> bool {
    *method == Method::GET
}

/// Outcome of the authorization gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny,
}

/// Decide whether the caller may proceed in `mode` for the resolved masjid.
///
/// A request without a masjid passes only as a public GET with
/// `allow_public_no_auth` set. A resolved masjid always needs a matching role.
pub fn authorize(
    claims: &ClaimSet,
    masjid_id: Option<uuid::Uuid>,
    mode: AppMode,
    method: &Method,
    allow_public_no_auth: bool,
) -> GateDecision {
    let public_read = mode.allows_public_reads() && allow_public_no_auth && is_safe_read(method);

    let Some(masjid_id) = masjid_id else {
        return if public_read { GateDecision::Allow } else { GateDecision::Deny };
    };

    let permitted = claims
        .roles_for(masjid_id)
        .is_some_and(|roles| roles.iter().any(|role| mode.is_satisfied_by(*role)));

    if permitted {
        GateDecision::Allow
    } else {
        GateDecision::Deny
    }
}
