//! Typed view of the decoded token payload.
//!
//! Tokens carry free-form JSON; everything downstream of this module works on
//! [`ClaimSet`] and [`Role`] only. Normalization is lossy: a single
//! malformed `masjid_roles` entry is dropped instead of rejecting the token.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Roles understood by the platform. Unknown role names are dropped at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Dkm,
    Teacher,
    Author,
    Student,
    User,
}

impl Role {
    /// Case-insensitive parse of a role name as found in tokens
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "dkm" => Some(Role::Dkm),
            "teacher" => Some(Role::Teacher),
            "author" => Some(Role::Author),
            "student" => Some(Role::Student),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Dkm => "dkm",
            Role::Teacher => "teacher",
            Role::Author => "author",
            Role::Student => "student",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles held by the caller inside one masjid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantRoles {
    pub masjid_id: Uuid,
    pub roles: BTreeSet<Role>,
}

/// Who is calling and what they may do, derived once per request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimSet {
    pub subject: Option<String>,
    pub global_roles: BTreeSet<Role>,
    pub tenant_roles: Vec<TenantRoles>,
    pub active_tenant_hint: Option<Uuid>,
    pub tenant_ids_hint: Vec<Uuid>,
}

impl ClaimSet {
    /// Claims for an unauthenticated caller
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a claim set from a decoded token payload. Never fails.
    pub fn from_claims(raw: &Map<String, Value>) -> Self {
        let subject = raw.get("sub").and_then(Value::as_str).map(str::to_string);

        let global_roles = raw
            .get("roles_global")
            .map(parse_role_list)
            .unwrap_or_default();

        let tenant_roles = match raw.get("masjid_roles") {
            Some(Value::Array(entries)) => entries.iter().filter_map(parse_tenant_entry).collect(),
            _ => Vec::new(),
        };

        let active_tenant_hint = ["active_masjid_id", "active_tenant_id"]
            .iter()
            .filter_map(|key| raw.get(*key))
            .find_map(parse_uuid_value);

        let tenant_ids_hint = ["masjid_ids", "tenant_ids"]
            .iter()
            .find_map(|key| match raw.get(*key) {
                Some(Value::Array(ids)) => Some(ids.iter().filter_map(parse_uuid_value).collect()),
                _ => None,
            })
            .unwrap_or_default();

        Self {
            subject,
            global_roles,
            tenant_roles,
            active_tenant_hint,
            tenant_ids_hint,
        }
    }

    /// Roles the caller holds in the given masjid
    pub fn roles_for(&self, masjid_id: Uuid) -> Option<&BTreeSet<Role>> {
        self.tenant_roles
            .iter()
            .find(|entry| entry.masjid_id == masjid_id)
            .map(|entry| &entry.roles)
    }

    pub fn has_role_in(&self, masjid_id: Uuid, role: Role) -> bool {
        self.roles_for(masjid_id).is_some_and(|roles| roles.contains(&role))
    }

    /// Masjid ids in token order, without duplicates
    pub fn masjid_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::with_capacity(self.tenant_roles.len());
        for entry in &self.tenant_roles {
            if !ids.contains(&entry.masjid_id) {
                ids.push(entry.masjid_id);
            }
        }
        ids
    }

    /// Best tenant guess carried by the token itself
    pub fn tenant_hint(&self) -> Option<Uuid> {
        if let Some(id) = self.active_tenant_hint {
            return Some(id);
        }
        if let Some(id) = self.tenant_ids_hint.first() {
            return Some(*id);
        }
        // A single-membership caller is auto-selected
        match self.tenant_roles.as_slice() {
            [only] => Some(only.masjid_id),
            _ => None,
        }
    }
}

fn parse_role_list(value: &Value) -> BTreeSet<Role> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Role::parse)
            .collect(),
        _ => BTreeSet::new(),
    }
}

fn parse_tenant_entry(entry: &Value) -> Option<TenantRoles> {
    let obj = entry.as_object()?;
    let id = obj
        .get("masjid_id")
        .or_else(|| obj.get("tenant_id"))
        .and_then(parse_uuid_value);

    let Some(masjid_id) = id else {
        tracing::debug!("Dropping masjid_roles entry without a valid id: {}", entry);
        return None;
    };

    Some(TenantRoles {
        masjid_id,
        roles: obj.get("roles").map(parse_role_list).unwrap_or_default(),
    })
}

fn parse_uuid_value(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const T1: &str = "11111111-1111-1111-1111-111111111111";
    const T2: &str = "22222222-2222-2222-2222-222222222222";

    fn claims(value: Value) -> ClaimSet {
        ClaimSet::from_claims(value.as_object().unwrap())
    }

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!(Role::parse("DKM"), Some(Role::Dkm));
        assert_eq!(Role::parse(" Owner "), Some(Role::Owner));
        assert_eq!(Role::parse("janitor"), None);
    }

    #[test]
    fn empty_payload_gives_empty_claims() {
        let set = claims(json!({}));
        assert_eq!(set, ClaimSet::anonymous());
        assert_eq!(set.tenant_hint(), None);
    }

    #[test]
    fn drops_only_the_malformed_entry() {
        let set = claims(json!({
            "roles_global": ["user", 42, "nonsense"],
            "masjid_roles": [
                { "masjid_id": "not-a-uuid", "roles": ["admin"] },
                { "masjid_id": T1, "roles": ["Admin", "teacher", null] },
                "garbage",
                { "roles": ["owner"] }
            ]
        }));

        assert_eq!(set.global_roles, BTreeSet::from([Role::User]));
        assert_eq!(set.tenant_roles.len(), 1);
        assert_eq!(set.tenant_roles[0].masjid_id.to_string(), T1);
        assert_eq!(set.tenant_roles[0].roles, BTreeSet::from([Role::Admin, Role::Teacher]));
    }

    #[test]
    fn accepts_tenant_id_key_alias() {
        let set = claims(json!({ "masjid_roles": [{ "tenant_id": T2, "roles": ["owner"] }] }));
        assert!(set.has_role_in(Uuid::parse_str(T2).unwrap(), Role::Owner));
    }

    #[test]
    fn wrong_shapes_are_ignored() {
        let set = claims(json!({
            "roles_global": "owner",
            "masjid_roles": { "masjid_id": T1 },
            "active_masjid_id": 7,
            "masjid_ids": "x"
        }));
        assert_eq!(set, ClaimSet::anonymous());
    }

    #[test]
    fn hint_precedence() {
        let t1 = Uuid::parse_str(T1).unwrap();
        let t2 = Uuid::parse_str(T2).unwrap();

        let set = claims(json!({
            "active_masjid_id": T2,
            "masjid_ids": [T1],
            "masjid_roles": [{ "masjid_id": T1, "roles": ["user"] }]
        }));
        assert_eq!(set.tenant_hint(), Some(t2));

        let set = claims(json!({
            "tenant_ids": ["bogus", T2, T1],
            "masjid_roles": [{ "masjid_id": T1, "roles": ["user"] }]
        }));
        assert_eq!(set.tenant_hint(), Some(t2));

        let set = claims(json!({ "masjid_roles": [{ "masjid_id": T1, "roles": ["dkm"] }] }));
        assert_eq!(set.tenant_hint(), Some(t1));
    }

    #[test]
    fn multiple_memberships_do_not_auto_select() {
        let set = claims(json!({
            "masjid_roles": [
                { "masjid_id": T1, "roles": ["admin"] },
                { "masjid_id": T2, "roles": ["teacher"] }
            ]
        }));
        assert_eq!(set.tenant_hint(), None);
        assert_eq!(set.masjid_ids().len(), 2);
    }
}
