use std::{collections::HashMap, fs};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_address: "http://localhost:8000/api".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("annotator.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_address") {
                settings.server_address = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("ANNOTATOR_SERVER_ADDRESS") {
        settings.server_address = v;
    }
    if let Ok(v) = std::env::var("APP__SERVER_ADDRESS") {
        settings.server_address = v;
    }

    settings
}

/// Normalizes the configured address into the base `Url` that request paths
/// are built under. Trailing slashes are dropped so segments append below
/// the base path rather than beside an empty trailing segment.
pub fn parse_server_address(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let address = if trimmed.is_empty() {
        Settings::default().server_address
    } else {
        trimmed.to_string()
    };
    ensure!(
        address.starts_with("http://") || address.starts_with("https://"),
        "server address must start with http:// or https://"
    );
    Url::parse(&address).with_context(|| format!("invalid server address '{address}'"))
}
