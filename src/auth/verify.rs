//! Credential verification and password hashing

use crate::auth::models::AccountInfo;
use crate::error::{Error, Result};
use crate::store::Store;

/// Hash a plaintext password for storage. The salt is embedded in the hash.
pub fn hash_password(plain: &str) -> Result<String> {
    Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST)?)
}

/// Lowercase and trim an email so lookups and the unique check are
/// case-insensitive with a single exact-match query.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Verify an email/password pair against the account store.
///
/// Fails with `AccountNotFound` when the email is unknown,
/// `InvalidCredential` when the password does not match, and
/// `AccountInactive` when the account has been deactivated. Callers surface
/// all three as the same generic response; the distinction exists for logging
/// and tests only. Read-only: no side effects on the store.
pub async fn verify_credentials(
    store: &dyn Store,
    email: &str,
    password: &str,
) -> Result<AccountInfo> {
    let email = normalize_email(email);
    let account = match store.find_account_by_email(&email).await? {
        Some(account) => account,
        None => {
            // Burn one bcrypt computation so an unknown email takes as long
            // as a failed password check.
            let _ = hash_password(password);
            return Err(Error::AccountNotFound);
        }
    };

    if !bcrypt::verify(password, &account.password_hash)? {
        return Err(Error::InvalidCredential);
    }

    if !account.can_sign_in() {
        return Err(Error::AccountInactive);
    }

    Ok(account.info())
}
