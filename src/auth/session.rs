//! Session lifetime management
//!
//! Two pieces live here. [`SessionMonitor`] is the idle-logout state machine:
//! it owns the single countdown timer, resets it on user activity and forces a
//! logout once the idle interval elapses with no activity. [`RevokedTokens`]
//! is the server-side denylist that makes logout effective before a token's
//! natural expiry: a revoked token id is refused by the route guard even
//! though its signature and expiry are still valid.

use crate::auth::models::AccountInfo;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

/// State of a monitored session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
}

struct MonitorInner {
    state: SessionState,
    account: Option<AccountInfo>,
    timer: Option<JoinHandle<()>>,
    // Incremented whenever the timer is re-armed or cancelled so a stale
    // timer task that already passed its sleep cannot fire.
    generation: u64,
}

/// Idle-logout state machine for one authenticated session.
///
/// Only one countdown is live at a time: re-arming cancels the pending timer
/// and schedules a fresh one. Expiry purges the cached account projection and
/// invokes the logout callback exactly once; an explicit [`logout`] when the
/// session is already expired is a no-op.
///
/// [`logout`]: SessionMonitor::logout
pub struct SessionMonitor {
    idle: Duration,
    inner: Arc<Mutex<MonitorInner>>,
    on_expire: Arc<dyn Fn() + Send + Sync>,
}

impl SessionMonitor {
    pub fn new(idle: Duration, on_expire: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            idle,
            inner: Arc::new(Mutex::new(MonitorInner {
                state: SessionState::Expired,
                account: None,
                timer: None,
                generation: 0,
            })),
            on_expire: Arc::new(on_expire),
        }
    }

    /// Begin monitoring a fresh session, caching the account projection and
    /// arming the idle countdown.
    pub fn start(&self, account: AccountInfo) {
        let mut inner = self.inner.lock().expect("monitor lock poisoned");
        inner.state = SessionState::Active;
        inner.account = Some(account);
        self.arm_timer(&mut inner);
    }

    /// A qualifying user-activity event: resets the countdown while Active.
    pub fn record_activity(&self) {
        let mut inner = self.inner.lock().expect("monitor lock poisoned");
        if inner.state == SessionState::Active {
            self.arm_timer(&mut inner);
        }
    }

    /// User-initiated logout. Forces Expired immediately; idempotent, the
    /// callback does not fire again for an already-expired session.
    pub fn logout(&self) {
        let fire = {
            let mut inner = self.inner.lock().expect("monitor lock poisoned");
            if inner.state == SessionState::Expired {
                false
            } else {
                Self::expire_locked(&mut inner);
                true
            }
        };
        if fire {
            (self.on_expire)();
        }
    }

    /// Cancel the pending countdown without firing (e.g. the tab closed).
    pub fn stop(&self) {
        let mut inner = self.inner.lock().expect("monitor lock poisoned");
        inner.generation += 1;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().expect("monitor lock poisoned").state
    }

    /// The cached account projection, if the session is still live
    pub fn account(&self) -> Option<AccountInfo> {
        self.inner
            .lock()
            .expect("monitor lock poisoned")
            .account
            .clone()
    }

    fn expire_locked(inner: &mut MonitorInner) {
        inner.state = SessionState::Expired;
        inner.account = None;
        inner.generation += 1;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
    }

    fn arm_timer(&self, inner: &mut MonitorInner) {
        inner.generation += 1;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        let generation = inner.generation;
        let idle = self.idle;
        let shared = Arc::clone(&self.inner);
        let on_expire = Arc::clone(&self.on_expire);

        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            let fire = {
                let mut inner = shared.lock().expect("monitor lock poisoned");
                if inner.generation == generation && inner.state == SessionState::Active {
                    Self::expire_locked(&mut inner);
                    true
                } else {
                    false
                }
            };
            if fire {
                (on_expire)();
            }
        }));
    }
}

/// Server-side denylist of revoked token ids.
///
/// Entries are kept until the token's own expiry passes, after which
/// [`purge_expired`] drops them.
///
/// [`purge_expired`]: RevokedTokens::purge_expired
pub struct RevokedTokens {
    tokens: Arc<RwLock<HashMap<String, i64>>>,
}

impl RevokedTokens {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Revoke a token id until the given expiry timestamp
    pub fn revoke(&self, jti: &str, exp: i64) {
        self.tokens
            .write()
            .expect("revocation lock poisoned")
            .insert(jti.to_string(), exp);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.tokens
            .read()
            .expect("revocation lock poisoned")
            .contains_key(jti)
    }

    /// Drop entries whose tokens have expired on their own
    pub fn purge_expired(&self) {
        let now = chrono::Utc::now().timestamp();
        self.tokens
            .write()
            .expect("revocation lock poisoned")
            .retain(|_, exp| *exp > now);
    }

    pub fn len(&self) -> usize {
        self.tokens.read().expect("revocation lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RevokedTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RevokedTokens {
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    #[tokio::test]
    async fn test_expires_after_idle_interval() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let monitor = SessionMonitor::new(Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        monitor.start(account());
        assert_eq!(monitor.state(), SessionState::Active);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(monitor.state(), SessionState::Expired);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(monitor.account().is_none());
    }

    #[tokio::test]
    async fn test_activity_resets_countdown() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let monitor = SessionMonitor::new(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        monitor.start(account());
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(30)).await;
            monitor.record_activity();
        }
        // 150ms of wall time has passed but no 100ms gap without activity
        assert_eq!(monitor.state(), SessionState::Active);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let monitor = SessionMonitor::new(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        monitor.start(account());
        monitor.logout();
        monitor.logout();

        assert_eq!(monitor.state(), SessionState::Expired);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_cancels_without_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let monitor = SessionMonitor::new(Duration::from_millis(40), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        monitor.start(account());
        monitor.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restart_after_expiry() {
        let monitor = SessionMonitor::new(Duration::from_millis(30), || {});
        monitor.start(account());
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(monitor.state(), SessionState::Expired);

        monitor.start(account());
        assert_eq!(monitor.state(), SessionState::Active);
        assert!(monitor.account().is_some());
    }

    #[test]
    fn test_revocation_list() {
        let revoked = RevokedTokens::new();
        let future = Utc::now().timestamp() + 3600;

        revoked.revoke("t1", future);
        assert!(revoked.is_revoked("t1"));
        assert!(!revoked.is_revoked("t2"));

        revoked.revoke("t2", Utc::now().timestamp() - 10);
        revoked.purge_expired();
        assert!(revoked.is_revoked("t1"));
        assert!(!revoked.is_revoked("t2"));
    }
}
