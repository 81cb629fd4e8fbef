//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration for the HTTP API and static files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Public web root served as static files (catalog assets, uploads)
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3456
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

impl ServerConfig {
    /// Directory that multipart uploads are written to
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join("uploads")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
        }
    }
}

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "host=localhost port=5432 user=postgres password=postgres dbname=dealerdesk".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Authentication and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens
    #[serde(default = "default_token_secret")]
    pub token_secret: String,

    /// Lifetime of a session token and its cookie, in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Idle interval after which the client session monitor logs out, in seconds
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Mark the session cookie Secure (enable behind HTTPS)
    #[serde(default)]
    pub cookie_secure: bool,

    /// Path prefixes the page route guard applies to
    #[serde(default = "default_protected_paths")]
    pub protected_paths: Vec<String>,

    /// Login page unauthenticated page requests are redirected to
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

fn default_token_secret() -> String {
    "dealerdesk-secret-change-in-production".to_string()
}

fn default_token_ttl_secs() -> u64 {
    86_400 // 1 day
}

fn default_idle_timeout_secs() -> u64 {
    1_800 // 30 minutes
}

fn default_cookie_name() -> String {
    "dealerdesk_token".to_string()
}

fn default_protected_paths() -> Vec<String> {
    vec!["/dashboard".to_string()]
}

fn default_login_path() -> String {
    "/auth".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: default_token_secret(),
            token_ttl_secs: default_token_ttl_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            protected_paths: default_protected_paths(),
            login_path: default_login_path(),
        }
    }
}
