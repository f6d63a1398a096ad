use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::spin::SpinTiming;

pub const DEFAULT_CONFIG_FILE: &str = "nutriwheel.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub spin_cycle_ms: u64,
    pub spin_min_settle_ms: u64,
    pub spin_max_settle_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            request_timeout_secs: 30,
            spin_cycle_ms: 100,
            spin_min_settle_ms: 1000,
            spin_max_settle_ms: 2000,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn spin_timing(&self) -> SpinTiming {
        SpinTiming {
            cycle_interval: Duration::from_millis(self.spin_cycle_ms),
            min_settle: Duration::from_millis(self.spin_min_settle_ms),
            max_settle: Duration::from_millis(self.spin_max_settle_ms),
        }
        .normalized()
    }

    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => apply_file_values(&mut settings, &file_cfg),
            Err(err) => tracing::warn!(
                path = %path.display(),
                error = %err,
                "ignoring unparseable config file"
            ),
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn apply_file_values(settings: &mut Settings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_cfg.get("api_key").and_then(toml::Value::as_str) {
        settings.api_key = Some(v.to_string());
    }
    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("model").and_then(toml::Value::as_str) {
        settings.model = v.to_string();
    }
    if let Some(v) = file_u64(file_cfg, "request_timeout_secs") {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_u64(file_cfg, "spin_cycle_ms") {
        settings.spin_cycle_ms = v;
    }
    if let Some(v) = file_u64(file_cfg, "spin_min_settle_ms") {
        settings.spin_min_settle_ms = v;
    }
    if let Some(v) = file_u64(file_cfg, "spin_max_settle_ms") {
        settings.spin_max_settle_ms = v;
    }
}

fn file_u64(file_cfg: &HashMap<String, toml::Value>, key: &str) -> Option<u64> {
    file_cfg
        .get(key)
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    for key in ["API_KEY", "GEMINI_API_KEY", "APP__API_KEY"] {
        if let Some(v) = var(key) {
            settings.api_key = Some(v);
        }
    }

    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__MODEL") {
        settings.model = v;
    }

    let numeric = [
        ("APP__REQUEST_TIMEOUT_SECS", &mut settings.request_timeout_secs),
        ("APP__SPIN_CYCLE_MS", &mut settings.spin_cycle_ms),
        ("APP__SPIN_MIN_SETTLE_MS", &mut settings.spin_min_settle_ms),
        ("APP__SPIN_MAX_SETTLE_MS", &mut settings.spin_max_settle_ms),
    ];
    for (key, slot) in numeric {
        if let Some(v) = var(key) {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                *slot = parsed;
            }
        }
    }
}
