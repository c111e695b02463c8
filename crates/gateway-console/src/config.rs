//! Operator-side settings for the console itself, read from `<home>/config.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONSOLE_URL: &str = "http://127.0.0.1:3029";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub console: Option<ConsoleCfg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsoleCfg {
    /// Control API root, e.g. `http://127.0.0.1:3029`.
    pub url: Option<String>,
    pub password: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Where the console keeps its config file and logs.
pub fn console_home(explicit: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit.filter(|d| !d.is_empty()) {
        return expand_home(dir);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".gateway-console");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".gateway-console")
}

pub fn load_user_config(home: &Path) -> anyhow::Result<Option<UserConfig>> {
    let path = home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)?;
    let cfg: UserConfig = toml::from_str(&s)?;
    Ok(Some(cfg))
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Connection settings after merging flags/env over the config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub url: String,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl ConnectionSettings {
    pub fn resolve(
        url: Option<String>,
        password: Option<String>,
        user_cfg: Option<&UserConfig>,
    ) -> Self {
        let file = user_cfg.and_then(|c| c.console.as_ref());
        let url = url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| file.and_then(|c| c.url.clone()))
            .unwrap_or_else(|| DEFAULT_CONSOLE_URL.to_string());
        let password = password
            .or_else(|| file.and_then(|c| c.password.clone()))
            .filter(|p| !p.is_empty());
        let timeout = file
            .and_then(|c| c.request_timeout_secs)
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Self {
            url,
            password,
            timeout: Duration::from_secs(timeout),
        }
    }
}
