//! Authentication and session management

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod session;
pub mod verify;

pub use jwt::{create_token, validate_token, Claims};
pub use middleware::{guard_pages, require_session, AuthGate, AuthSession};
pub use models::{Account, AccountChanges, AccountInfo, NewAccount, Role};
pub use session::{RevokedTokens, SessionMonitor, SessionState};
pub use verify::{hash_password, normalize_email, verify_credentials};
