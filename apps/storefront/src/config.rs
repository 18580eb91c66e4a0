use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{Credentials, SessionConfig, StorefrontConfig};
use serde::Deserialize;
use shared::domain::PAGE_SIZE;

pub const SETTINGS_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub page_size: usize,
    pub commit_delay_ms: u64,
    pub login_delay_ms: u64,
    pub demo_username: String,
    pub demo_password: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        let credentials = Credentials::default();
        Self {
            database_url: "sqlite://./data/storefront.db".into(),
            page_size: PAGE_SIZE,
            commit_delay_ms: 800,
            login_delay_ms: 1000,
            demo_username: credentials.username,
            demo_password: credentials.password,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn storefront_config(&self) -> StorefrontConfig {
        StorefrontConfig {
            page_size: self.page_size,
            commit_delay: Duration::from_millis(self.commit_delay_ms),
            session: SessionConfig {
                credentials: Credentials {
                    username: self.demo_username.clone(),
                    password: self.demo_password.clone(),
                },
                login_delay: Duration::from_millis(self.login_delay_ms),
            },
        }
    }
}

/// Every key optional; absent keys keep the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    database_url: Option<String>,
    page_size: Option<usize>,
    commit_delay_ms: Option<u64>,
    login_delay_ms: Option<u64>,
    demo_username: Option<String>,
    demo_password: Option<String>,
    log_filter: Option<String>,
}

/// Defaults, then `storefront.toml` if present, then `APP__*` environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse '{}'", path.display()))?;
        apply_file(&mut settings, file_cfg);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.database_url = normalize_database_url(&settings.database_url);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.commit_delay_ms {
        settings.commit_delay_ms = v;
    }
    if let Some(v) = file_cfg.login_delay_ms {
        settings.login_delay_ms = v;
    }
    if let Some(v) = file_cfg.demo_username {
        settings.demo_username = v;
    }
    if let Some(v) = file_cfg.demo_password {
        settings.demo_password = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("STOREFRONT_DB") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.page_size = parsed;
        }
    }
    if let Some(v) = var("APP__COMMIT_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.commit_delay_ms = parsed;
        }
    }
    if let Some(v) = var("APP__LOGIN_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.login_delay_ms = parsed;
        }
    }

    if let Some(v) = var("APP__DEMO_USERNAME") {
        settings.demo_username = v;
    }
    if let Some(v) = var("APP__DEMO_PASSWORD") {
        settings.demo_password = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
