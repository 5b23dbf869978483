use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::{
    auth::{
        firebase::{FirebaseAuthBackend, FirebaseConfig},
        mock::MockAuthBackend,
    },
    AuthBackend, ControllerConfig,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "shikshan.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthBackendKind {
    Mock,
    Firebase,
}

impl AuthBackendKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(Self::Mock),
            "firebase" => Some(Self::Firebase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub auth_backend: AuthBackendKind,
    pub firebase_api_key: Option<String>,
    pub firebase_project_id: Option<String>,
    pub location_timeout_secs: u64,
    pub animation_slack_ms: u64,
    pub live_feeds: bool,
    pub excluded_sources: Vec<String>,
    pub directory_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/shikshan.db".into(),
            auth_backend: AuthBackendKind::Mock,
            firebase_api_key: None,
            firebase_project_id: None,
            location_timeout_secs: 10,
            animation_slack_ms: 100,
            live_feeds: false,
            excluded_sources: Vec::new(),
            directory_path: None,
        }
    }
}

/// Keys accepted in `shikshan.toml`; anything absent keeps its default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
    auth_backend: Option<AuthBackendKind>,
    firebase_api_key: Option<String>,
    firebase_project_id: Option<String>,
    location_timeout_secs: Option<u64>,
    animation_slack_ms: Option<u64>,
    live_feeds: Option<bool>,
    excluded_sources: Option<Vec<String>>,
    directory_path: Option<PathBuf>,
}

/// Defaults, then the config file, then the environment.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        Err(err) if required => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.database_url = normalize_database_url(&settings.database_url);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file.auth_backend {
        settings.auth_backend = v;
    }
    if let Some(v) = file.firebase_api_key {
        settings.firebase_api_key = Some(v);
    }
    if let Some(v) = file.firebase_project_id {
        settings.firebase_project_id = Some(v);
    }
    if let Some(v) = file.location_timeout_secs {
        settings.location_timeout_secs = v;
    }
    if let Some(v) = file.animation_slack_ms {
        settings.animation_slack_ms = v;
    }
    if let Some(v) = file.live_feeds {
        settings.live_feeds = v;
    }
    if let Some(v) = file.excluded_sources {
        settings.excluded_sources = v;
    }
    if let Some(v) = file.directory_path {
        settings.directory_path = Some(v);
    }
    Ok(())
}

/// `SHIKSHAN_<KEY>` is read first, `APP__<KEY>` wins when both are set.
/// Unparseable values are ignored.
fn apply_env<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| {
        lookup(&format!("APP__{key}")).or_else(|| lookup(&format!("SHIKSHAN_{key}")))
    };

    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("AUTH_BACKEND").and_then(|v| AuthBackendKind::parse(&v)) {
        settings.auth_backend = v;
    }
    if let Some(v) = var("FIREBASE_API_KEY") {
        settings.firebase_api_key = Some(v);
    }
    if let Some(v) = var("FIREBASE_PROJECT_ID") {
        settings.firebase_project_id = Some(v);
    }
    if let Some(v) = var("LOCATION_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.location_timeout_secs = v;
    }
    if let Some(v) = var("ANIMATION_SLACK_MS").and_then(|v| v.parse().ok()) {
        settings.animation_slack_ms = v;
    }
    if let Some(v) = var("LIVE_FEEDS").and_then(|v| parse_bool(&v)) {
        settings.live_feeds = v;
    }
    if let Some(v) = var("EXCLUDED_SOURCES") {
        settings.excluded_sources = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = var("DIRECTORY_PATH") {
        settings.directory_path = Some(PathBuf::from(v));
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

impl Settings {
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            animation_slack: Duration::from_millis(self.animation_slack_ms),
            location_timeout: Duration::from_secs(self.location_timeout_secs),
            ..ControllerConfig::default()
        }
    }

    pub fn build_auth_backend(&self) -> anyhow::Result<Arc<dyn AuthBackend>> {
        match self.auth_backend {
            AuthBackendKind::Mock => Ok(Arc::new(MockAuthBackend::default())),
            AuthBackendKind::Firebase => {
                let (Some(api_key), Some(project_id)) =
                    (&self.firebase_api_key, &self.firebase_project_id)
                else {
                    bail!("firebase auth needs firebase_api_key and firebase_project_id");
                };
                Ok(Arc::new(FirebaseAuthBackend::new(FirebaseConfig::new(
                    api_key.clone(),
                    project_id.clone(),
                ))))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
