//! CLI command implementations

use anyhow::Result;
use rand::distr::{Alphanumeric, SampleString};
use std::fs;
use std::sync::Arc;

use crate::auth::models::{NewAccount, Role};
use crate::auth::{hash_password, normalize_email};
use crate::cli::{info, print_accounts_table, success, warn};
use crate::config::{self, Config};
use crate::store::{MemoryStore, PgStore, Store};

/// Initialize a new dealerdesk.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new("dealerdesk.toml");

    if config_path.exists() {
        warn("dealerdesk.toml already exists");
        return Ok(());
    }

    // Each installation gets its own signing secret
    let secret = Alphanumeric.sample_string(&mut rand::rng(), 48);
    let content = config::loader::default_config_content(&secret);
    fs::write(config_path, content)?;

    success("Created dealerdesk.toml");
    info("Edit the configuration file and run 'dealerdesk serve' to start the server");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>, memory: bool) -> Result<()> {
    let config = load_config()?;
    let (host, port) = resolve_bind(&config, host, port);

    let store: Arc<dyn Store> = if memory {
        warn("Using the in-memory store; data is lost when the server stops");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(PgStore::connect(&config.database.url).await?)
    };

    crate::api::run_server(config, store, &host, port).await?;

    Ok(())
}

/// Command-line flags win; anything absent comes from the config file
fn resolve_bind(config: &Config, host: Option<String>, port: Option<u16>) -> (String, u16) {
    (
        host.unwrap_or_else(|| config.server.host.clone()),
        port.unwrap_or(config.server.port),
    )
}

/// Create an administrator account
pub async fn create_admin(name: &str, email: &str) -> Result<()> {
    let config = load_config()?;
    let store = PgStore::connect(&config.database.url).await?;

    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let account = store
        .create_account(NewAccount {
            name: name.to_string(),
            email: normalize_email(email),
            password_hash: hash_password(&password)?,
            role: Role::Admin,
            active: true,
        })
        .await?;

    success(&format!("Created administrator account: {}", account.email));

    Ok(())
}

/// List all accounts
pub async fn accounts() -> Result<()> {
    let config = load_config()?;
    let store = PgStore::connect(&config.database.url).await?;

    let accounts = store.list_accounts().await?;
    print_accounts_table(&accounts);

    Ok(())
}

fn load_config() -> Result<Config> {
    config::load_config()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}. Run 'dealerdesk init' first.", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults_to_configured_bind() {
        let config = Config::default();
        let (host, port) = resolve_bind(&config, None, None);
        assert_eq!(host, config.server.host);
        assert_eq!(port, 3456);
    }

    #[test]
    fn test_serve_flags_override_config() {
        let config = Config::default();
        let (host, port) = resolve_bind(&config, Some("127.0.0.1".to_string()), Some(8080));
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 8080);
    }
}
