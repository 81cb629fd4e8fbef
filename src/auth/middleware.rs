//! Route guard middleware and session extractors
//!
//! [`AuthGate`] owns everything needed to admit or refuse a request: the
//! signing secret, the cookie contract, the revocation list and one idle
//! monitor per live session (issuing a session arms it, authenticated
//! requests reset it, expiry revokes the token). Two layers use
//! it: [`guard_pages`] redirects unauthenticated page navigation on the
//! configured protected path prefixes to the login page, and
//! [`require_session`] returns 401 for protected API routes. Both verify the
//! token's signature, expiry and revocation status rather than trusting
//! cookie presence. Handlers re-check access themselves through the
//! [`AuthSession`] extractor, so a route wired outside the guarded routers
//! still refuses anonymous mutation.

use crate::auth::jwt::{sign_claims, validate_token, Claims};
use crate::auth::models::AccountInfo;
use crate::auth::session::{RevokedTokens, SessionMonitor, SessionState};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use axum::extract::{FromRef, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct GateInner {
    secret: Vec<u8>,
    token_ttl: Duration,
    idle_timeout: Duration,
    cookie_name: String,
    cookie_secure: bool,
    protected_paths: Vec<String>,
    login_path: String,
    revoked: RevokedTokens,
    // One idle monitor per live session, keyed by token id
    monitors: Mutex<HashMap<String, SessionMonitor>>,
}

/// Session gate shared by the middleware layers and the auth handlers
#[derive(Clone)]
pub struct AuthGate {
    inner: Arc<GateInner>,
}

impl AuthGate {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            inner: Arc::new(GateInner {
                secret: config.token_secret.as_bytes().to_vec(),
                token_ttl: Duration::from_secs(config.token_ttl_secs),
                idle_timeout: Duration::from_secs(config.idle_timeout_secs),
                cookie_name: config.cookie_name.clone(),
                cookie_secure: config.cookie_secure,
                protected_paths: config.protected_paths.clone(),
                login_path: config.login_path.clone(),
                revoked: RevokedTokens::new(),
                monitors: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Issue a signed session token and the Set-Cookie value carrying it.
    ///
    /// Also starts the idle monitor for the session: if the idle interval
    /// passes with no authenticated request, the token is revoked server-side
    /// even though its own expiry is still in the future.
    pub fn issue_session(&self, account: &AccountInfo) -> Result<(String, String)> {
        let claims = Claims::new(account, self.inner.token_ttl);
        let token = sign_claims(&claims, &self.inner.secret)?;
        let cookie = self.session_cookie(&token);

        let revoked = self.inner.revoked.clone();
        let jti = claims.jti.clone();
        let exp = claims.exp;
        let monitor = SessionMonitor::new(self.inner.idle_timeout, move || {
            revoked.revoke(&jti, exp);
        });
        monitor.start(account.clone());
        self.inner
            .monitors
            .lock()
            .expect("monitor table lock poisoned")
            .insert(claims.jti, monitor);

        Ok((token, cookie))
    }

    /// Configured idle interval, surfaced so the dashboard can run its own
    /// countdown against the same value.
    pub fn idle_timeout(&self) -> Duration {
        self.inner.idle_timeout
    }

    fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
            self.inner.cookie_name,
            token,
            self.inner.token_ttl.as_secs()
        );
        if self.inner.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Set-Cookie value that removes the session cookie
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
            self.inner.cookie_name
        );
        if self.inner.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Extract the session token from the Authorization header or the cookie
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        if let Some(auth_header) = headers.get("Authorization") {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    return Some(token.to_string());
                }
            }
        }

        let prefix = format!("{}=", self.inner.cookie_name);
        if let Some(cookie_header) = headers.get("Cookie") {
            if let Ok(cookie_str) = cookie_header.to_str() {
                for cookie in cookie_str.split(';') {
                    if let Some(token) = cookie.trim().strip_prefix(&prefix) {
                        if !token.is_empty() {
                            return Some(token.to_string());
                        }
                    }
                }
            }
        }

        None
    }

    /// Verify the request's session: token present, signature valid, not
    /// expired, not revoked.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims> {
        let token = self
            .token_from_headers(headers)
            .ok_or(Error::Unauthorized)?;
        let claims = validate_token(&token, &self.inner.secret)?;
        if self.inner.revoked.is_revoked(&claims.jti) {
            return Err(Error::Unauthorized);
        }

        // An authenticated request counts as activity for the idle countdown
        if let Some(monitor) = self
            .inner
            .monitors
            .lock()
            .expect("monitor table lock poisoned")
            .get(&claims.jti)
        {
            monitor.record_activity();
        }

        Ok(claims)
    }

    /// Revoke a token until its own expiry passes
    pub fn revoke(&self, claims: &Claims) {
        if let Some(monitor) = self
            .inner
            .monitors
            .lock()
            .expect("monitor table lock poisoned")
            .remove(&claims.jti)
        {
            monitor.stop();
        }
        self.inner.revoked.revoke(&claims.jti, claims.exp);
    }

    /// Drop revocation entries for tokens that have expired on their own,
    /// along with monitors for sessions that already went idle.
    pub fn purge_revoked(&self) {
        self.inner.revoked.purge_expired();
        self.inner
            .monitors
            .lock()
            .expect("monitor table lock poisoned")
            .retain(|_, monitor| monitor.state() == SessionState::Active);
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.inner
            .protected_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn login_path(&self) -> &str {
        &self.inner.login_path
    }
}

/// Page-level route guard: unauthenticated requests to a protected path
/// prefix are redirected to the login page, preserving the requested path.
pub async fn guard_pages(State(gate): State<AuthGate>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if gate.is_protected(&path) && gate.authenticate(req.headers()).is_err() {
        let target = format!("{}?next={}", gate.login_path(), urlencoding::encode(&path));
        return Redirect::to(&target).into_response();
    }
    next.run(req).await
}

/// API route guard: refuses the request outright when no valid session is
/// present, otherwise stores the claims for handler-level access checks.
pub async fn require_session(
    State(gate): State<AuthGate>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let claims = gate
        .authenticate(req.headers())
        .map_err(|_| Error::Unauthorized)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// The verified session claims of the calling request.
///
/// Verifies the session straight from the request headers, so every handler
/// that declares it performs its own session check even if it was wired
/// outside a guarded router.
pub struct AuthSession(pub Claims);

impl AuthSession {
    /// Mutating dashboard actions require a writer role
    pub fn require_write(&self) -> Result<()> {
        if self.0.can_write() {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    /// Account management requires an administrator
    pub fn require_admin(&self) -> Result<()> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(AuthSession(claims.clone()));
        }
        let gate = AuthGate::from_ref(state);
        let claims = gate
            .authenticate(&parts.headers)
            .map_err(|_| Error::Unauthorized)?;
        Ok(AuthSession(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use chrono::Utc;

    fn gate() -> AuthGate {
        AuthGate::new(&AuthConfig {
            token_secret: "test-secret".to_string(),
            ..Default::default()
        })
    }

    fn account() -> AccountInfo {
        let now = Utc::now();
        AccountInfo {
            id: "a1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_no_token_is_rejected() {
        let headers = HeaderMap::new();
        assert!(gate().authenticate(&headers).is_err());
    }

    #[tokio::test]
    async fn test_cookie_token_is_accepted() {
        let gate = gate();
        let (token, _) = gate.issue_session(&account()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "Cookie",
            format!("other=1; dealerdesk_token={}", token).parse().unwrap(),
        );
        let claims = gate.authenticate(&headers).unwrap();
        assert_eq!(claims.sub, "a1");
    }

    #[tokio::test]
    async fn test_bearer_token_is_accepted() {
        let gate = gate();
        let (token, _) = gate.issue_session(&account()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", token).parse().unwrap());
        assert!(gate.authenticate(&headers).is_ok());
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let gate = gate();
        let (token, _) = gate.issue_session(&account()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "Cookie",
            format!("dealerdesk_token={}", token).parse().unwrap(),
        );
        let claims = gate.authenticate(&headers).unwrap();

        gate.revoke(&claims);
        assert!(gate.authenticate(&headers).is_err());
    }

    #[test]
    fn test_garbage_cookie_is_rejected() {
        let gate = gate();
        let mut headers = HeaderMap::new();
        headers.insert(
            "Cookie",
            "dealerdesk_token=not-a-real-token".parse().unwrap(),
        );
        assert!(gate.authenticate(&headers).is_err());
    }

    #[tokio::test]
    async fn test_idle_session_is_revoked() {
        let gate = AuthGate::new(&AuthConfig {
            token_secret: "test-secret".to_string(),
            idle_timeout_secs: 1,
            ..Default::default()
        });
        let (token, _) = gate.issue_session(&account()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", token).parse().unwrap());
        assert!(gate.authenticate(&headers).is_ok());

        // No activity for the whole idle interval: the monitor revokes the
        // token even though its signature and expiry are still valid.
        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert!(gate.authenticate(&headers).is_err());
    }

    #[tokio::test]
    async fn test_authenticated_requests_defer_idle_expiry() {
        let gate = AuthGate::new(&AuthConfig {
            token_secret: "test-secret".to_string(),
            idle_timeout_secs: 1,
            ..Default::default()
        });
        let (token, _) = gate.issue_session(&account()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", token).parse().unwrap());

        // 1.8s of wall time, but never a full second without a request
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(600)).await;
            assert!(gate.authenticate(&headers).is_ok());
        }
    }

    #[test]
    fn test_protected_prefix_matching() {
        let gate = gate();
        assert!(gate.is_protected("/dashboard"));
        assert!(gate.is_protected("/dashboard/cars"));
        assert!(!gate.is_protected("/catalog"));
        assert!(!gate.is_protected("/"));
    }

    #[tokio::test]
    async fn test_session_cookie_attributes() {
        let gate = gate();
        let (_, cookie) = gate.issue_session(&account()).unwrap();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));

        let cleared = gate.clear_cookie();
        assert!(cleared.contains("Max-Age=0"));
    }
}
