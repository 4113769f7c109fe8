use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::middleware::ContextError;
use crate::services::RevocationCheck;

/// How bearer credentials are located and verified
#[derive(Clone)]
pub struct TokenPolicy {
    pub secret: String,
    pub cookie_fallback: bool,
    pub cookie_name: String,
}

impl std::fmt::Debug for TokenPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPolicy")
            .field("secret", &"<redacted>")
            .field("cookie_fallback", &self.cookie_fallback)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

/// Extract the raw token from `Authorization: Bearer`, falling back to the
/// access cookie when the policy allows it. Returns `Ok(None)` when the
/// request carries no credential at all.
pub fn extract_token(headers: &HeaderMap, policy: &TokenPolicy) -> Result<Option<String>, ContextError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ContextError::InvalidToken("Invalid Authorization header format".to_string()))?;

        let token = match auth_str.trim().split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
            _ => {
                return Err(ContextError::InvalidToken(
                    "Authorization header must use Bearer token format".to_string(),
                ))
            }
        };

        if token.is_empty() {
            return Err(ContextError::InvalidToken("Empty JWT token".to_string()));
        }
        return Ok(Some(token.to_string()));
    }

    if policy.cookie_fallback {
        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(&policy.cookie_name) {
            let token = cookie.value().trim();
            if !token.is_empty() {
                return Ok(Some(token.to_string()));
            }
        }
    }

    Ok(None)
}

/// Verify the signature and expiry, returning the raw claim map
pub fn decode_claims(token: &str, secret: &str) -> Result<Map<String, Value>, ContextError> {
    if secret.is_empty() {
        tracing::error!("JWT secret not configured; rejecting token");
        return Err(ContextError::InvalidToken("JWT secret not configured".to_string()));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Map<String, Value>>(token, &decoding_key, &validation)
        .map_err(|e| ContextError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Full credential check: locate, verify, then consult the revocation list.
pub async fn authenticate(
    headers: &HeaderMap,
    policy: &TokenPolicy,
    revocation: Option<&dyn RevocationCheck>,
) -> Result<Option<Map<String, Value>>, ContextError> {
    let Some(token) = extract_token(headers, policy)? else {
        return Ok(None);
    };

    let claims = decode_claims(&token, &policy.secret)?;

    if let Some(check) = revocation {
        if check.is_revoked(&token).await? {
            tracing::warn!("Rejected revoked token");
            return Err(ContextError::TokenRevoked);
        }
    }

    Ok(Some(claims))
}
