use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use masjid_api::app::app;
use masjid_api::auth::{generate_jwt_with_secret, TokenClaims, TokenPolicy};
use masjid_api::database::MasjidRecord;
use masjid_api::middleware::ContextServices;
use masjid_api::services::{RevocationCheck, StoreError, TenantStore};

pub const SECRET: &str = "integration-secret";
pub const ROOT_DOMAIN: &str = "example.com";

pub const AL_FALAH: &str = "11111111-1111-1111-1111-111111111111";
pub const FOO_SCHOOL: &str = "22222222-2222-2222-2222-222222222222";
pub const AN_NUR: &str = "33333333-3333-3333-3333-333333333333";

pub fn id(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

/// Three active masjids: al-falah (custom domain alfalah.org), fooschool, annur (custom domain example.com)
pub struct FixtureStore {
    rows: Vec<MasjidRecord>,
    fail: AtomicBool,
}

impl FixtureStore {
    pub fn new() -> Self {
        let row = |uuid: &str, slug: &str, domain: Option<&str>| MasjidRecord {
            id: id(uuid),
            slug: Some(slug.to_string()),
            domain: domain.map(str::to_string),
        };
        Self {
            rows: vec![
                row(AL_FALAH, "al-falah", Some("alfalah.org")),
                row(FOO_SCHOOL, "fooschool", None),
                row(AN_NUR, "annur", Some("example.com")),
            ],
            fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let store = Self::new();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    fn find(&self, pred: impl Fn(&MasjidRecord) -> bool) -> Result<Option<MasjidRecord>, StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.rows.iter().find(|r| pred(r)).cloned())
    }
}

#[async_trait]
impl TenantStore for FixtureStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MasjidRecord>, StoreError> {
        self.find(|r| r.id == id)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<MasjidRecord>, StoreError> {
        self.find(|r| r.slug.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(slug)))
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<MasjidRecord>, StoreError> {
        self.find(|r| r.domain.as_deref().is_some_and(|d| d.eq_ignore_ascii_case(domain)))
    }
}

/// Revokes exactly one token
pub struct SingleRevocation(pub String);

#[async_trait]
impl RevocationCheck for SingleRevocation {
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        Ok(token == self.0)
    }
}

pub struct TestApp {
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(FixtureStore::new(), None, true)
    }

    pub fn with(store: FixtureStore, revocation: Option<Arc<dyn RevocationCheck>>, allow_public_no_auth: bool) -> Self {
        let services = ContextServices {
            store: Arc::new(store),
            revocation,
            token_policy: TokenPolicy {
                secret: SECRET.to_string(),
                cookie_fallback: true,
                cookie_name: "access_token".to_string(),
            },
            root_domain: Some(ROOT_DOMAIN.to_string()),
            allow_public_no_auth,
        };
        Self { router: app(services) }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.send(request("GET", uri, headers)).await
    }
}

pub fn request(method: &str, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if !headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("host")) {
        builder = builder.header("host", "localhost:3000");
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn token(claims: &TokenClaims) -> String {
    generate_jwt_with_secret(claims, SECRET).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Token for a caller holding `roles` in one masjid
pub fn member_token(masjid: &str, roles: &[&str]) -> String {
    token(&TokenClaims::new(Uuid::new_v4(), 1).with_masjid_role(id(masjid), roles))
}
