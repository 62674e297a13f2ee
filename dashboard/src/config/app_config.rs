//! Runtime application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use notify_dispatcher::DispatcherConfig;
use worker_protocol::Permission;

use super::ConfigError;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub app_name: String,
    pub assets_dir: PathBuf,
    pub notifications_enabled: bool,
    pub worker_enabled: bool,
    pub initial_permission: Permission,
    pub worker_ready_timeout_secs: u64,
    pub permission_prompt_timeout_secs: u64,
    pub open_browser: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            app_name: "School Admin".into(),
            assets_dir: PathBuf::from("./public"),
            notifications_enabled: true,
            worker_enabled: true,
            initial_permission: Permission::Default,
            worker_ready_timeout_secs: 10,
            permission_prompt_timeout_secs: 0,
            open_browser: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let g = |key: &str| -> String { lookup(key).unwrap_or_default().trim().to_string() };

        let initial_permission = {
            let raw = g("NOTIFICATION_PERMISSION");
            raw.parse::<Permission>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "NOTIFICATION_PERMISSION",
                    value: raw.clone(),
                })?
        };

        Ok(Self {
            server_port: parse_u16(&g("SERVER_PORT"), defaults.server_port),
            app_name: {
                let name = g("APP_NAME");
                if name.is_empty() { defaults.app_name } else { name }
            },
            assets_dir: {
                let dir = g("ASSETS_DIR");
                if dir.is_empty() { defaults.assets_dir } else { PathBuf::from(dir) }
            },
            notifications_enabled: parse_bool(&g("NOTIFICATIONS_ENABLED"), defaults.notifications_enabled),
            worker_enabled: parse_bool(&g("WORKER_ENABLED"), defaults.worker_enabled),
            initial_permission,
            worker_ready_timeout_secs: parse_u64(
                &g("WORKER_READY_TIMEOUT_SECS"),
                defaults.worker_ready_timeout_secs,
            ),
            permission_prompt_timeout_secs: parse_u64(
                &g("PERMISSION_PROMPT_TIMEOUT_SECS"),
                defaults.permission_prompt_timeout_secs,
            ),
            open_browser: parse_bool(&g("OPEN_BROWSER"), defaults.open_browser),
        })
    }

    /// Dispatcher wait bounds. Zero seconds means wait forever.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            ready_timeout: non_zero_secs(self.worker_ready_timeout_secs),
            permission_timeout: non_zero_secs(self.permission_prompt_timeout_secs),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.server_port)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_bool(s: &str, default: bool) -> bool {
    if s.is_empty() {
        return default;
    }
    matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn parse_u16(s: &str, default: u16) -> u16 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

fn parse_u64(s: &str, default: u64) -> u64 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
