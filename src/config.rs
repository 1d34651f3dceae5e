//! Runtime configuration loaded from the environment (and an optional `.env` file)

use crate::constants::*;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub counter_url: String,
    pub sync_interval: Duration,
    pub request_timeout: Duration,
    pub resource_dir: PathBuf,
    pub resource_base_url: String,
    pub skip_bootstrap: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            counter_url: COUNTER_URL.to_string(),
            sync_interval: Duration::from_millis(SYNC_INTERVAL_MILLIS),
            request_timeout: Duration::from_millis(REQUEST_TIMEOUT_MILLIS),
            resource_dir: PathBuf::from(RESOURCE_DIR),
            resource_base_url: RESOURCE_BASE_URL.to_string(),
            skip_bootstrap: false,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read `ORB_*` variables from the process environment
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("[Config] Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => log::debug!("[Config] No .env file found, using process environment"),
            Err(e) => log::warn!("[Config] Failed to load .env file: {}", e),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Invalid values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let counter_url = lookup("ORB_COUNTER_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.counter_url);

        let resource_base_url = lookup("ORB_RESOURCE_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.resource_base_url);

        let resource_dir = lookup("ORB_RESOURCE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.resource_dir);

        Self {
            counter_url,
            sync_interval: parse_millis(&lookup, "ORB_SYNC_INTERVAL_MS", defaults.sync_interval),
            request_timeout: parse_millis(&lookup, "ORB_REQUEST_TIMEOUT_MS", defaults.request_timeout),
            resource_dir,
            resource_base_url,
            skip_bootstrap: parse_flag(&lookup, "ORB_SKIP_BOOTSTRAP"),
        }
    }

    pub fn sounds_dir(&self) -> PathBuf {
        self.resource_dir.join(SOUNDS_DIR)
    }
}

fn parse_millis<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => {
                log::warn!("[Config] {} must be greater than zero, using {:?}", key, default);
                default
            }
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                log::warn!("[Config] Invalid {}='{}', using {:?}", key, raw, default);
                default
            }
        },
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
