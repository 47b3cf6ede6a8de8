//! Runtime Configuration
//! Mission: Resolve environment-supplied settings before the session core starts

use anyhow::{bail, Result};
use std::path::PathBuf;

/// Environment-driven configuration for the admin client
#[derive(Debug, Clone)]
pub struct Config {
    /// Admin API base, including the version prefix
    pub api_base_url: String,
    /// Shared obfuscation key for the token codec
    pub token_key: String,
    /// Directory holding the token database
    pub profile_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_base_url = std::env::var("REWEAR_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api/v1".to_string());

        // A missing key is fatal: records written under an accidental
        // default could never be read back by a correctly configured run.
        let token_key = std::env::var("REWEAR_TOKEN_KEY").unwrap_or_default();
        if token_key.trim().is_empty() {
            bail!("REWEAR_TOKEN_KEY is not set; refusing to start without an obfuscation key");
        }

        let profile_dir = std::env::var("REWEAR_ADMIN_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_profile_dir());

        Ok(Self {
            api_base_url,
            token_key,
            profile_dir,
        })
    }
}

fn default_profile_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".rewear-admin")
}
