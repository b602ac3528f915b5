//! Shared configuration for the CampusFlow CLI.
//!
//! TOML config file layered under environment overrides, token
//! resolution (env var + plaintext), and translation to
//! `campusflow_core::ControllerConfig`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use campusflow_core::{ControllerConfig, PollOverrides, RollbackPolicy};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Backend connection settings.
    #[serde(default)]
    pub backend: Backend,

    /// Polling cadence overrides, in seconds. Unset fields keep the
    /// built-in cadences.
    #[serde(default)]
    pub refresh: Refresh,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// Backend connection settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct Backend {
    /// Backend base URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Bearer token (plaintext — prefer `api_token_env`).
    pub api_token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub api_token_env: Option<String>,

    /// Revert optimistic alert edits when the backend rejects them.
    #[serde(default = "default_rollback")]
    pub rollback_on_failure: bool,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_token: None,
            api_token_env: None,
            rollback_on_failure: default_rollback(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:8000".into()
}
fn default_rollback() -> bool {
    true
}

/// Polling cadence overrides.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Refresh {
    pub alerts_secs: Option<u64>,
    pub dashboard_secs: Option<u64>,
    pub security_secs: Option<u64>,
    pub health_secs: Option<u64>,
}

impl Refresh {
    fn to_overrides(&self) -> PollOverrides {
        PollOverrides {
            alerts: self.alerts_secs.map(std::time::Duration::from_secs),
            dashboard: self.dashboard_secs.map(std::time::Duration::from_secs),
            security: self.security_secs.map(std::time::Duration::from_secs),
            health: self.health_secs.map(std::time::Duration::from_secs),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "campusflow", "campusflow").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("campusflow");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment. Env vars use a double
/// underscore as the section separator (`CAMPUSFLOW_BACKEND__URL`) so
/// field names containing underscores survive the split.
pub fn load_config() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CAMPUSFLOW_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is
/// unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the bearer token, if any is configured. Env var indirection
/// wins over plaintext.
pub fn resolve_token(backend: &Backend) -> Option<SecretString> {
    if let Some(ref env_name) = backend.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }
    backend
        .api_token
        .as_ref()
        .map(|t| SecretString::from(t.clone()))
}

/// Build a `ControllerConfig`, validating the URL up front so a typo
/// fails at startup rather than on the first request.
pub fn to_controller_config(config: &Config) -> Result<ControllerConfig, ConfigError> {
    let backend = &config.backend;
    let _: url::Url = backend.url.parse().map_err(|_| ConfigError::Validation {
        field: "backend.url".into(),
        reason: format!("invalid URL: {}", backend.url),
    })?;

    let rollback = if backend.rollback_on_failure {
        RollbackPolicy::Revert
    } else {
        RollbackPolicy::Keep
    };

    let mut controller = ControllerConfig::new(backend.url.clone())
        .with_rollback(rollback)
        .with_poll(config.refresh.to_overrides());
    if let Some(token) = resolve_token(backend) {
        controller = controller.with_token(token);
    }
    Ok(controller)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.backend.url, "http://localhost:8000");
        assert!(config.backend.rollback_on_failure);
        assert_eq!(config.defaults.output, "table");
    }

    #[test]
    fn toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [backend]
                url = "https://campus.example.edu"
                rollback_on_failure = false

                [defaults]
                output = "json"
                "#,
            )?;

            let config = load_from(&PathBuf::from("config.toml")).unwrap();
            assert_eq!(config.backend.url, "https://campus.example.edu");
            assert!(!config.backend.rollback_on_failure);
            assert_eq!(config.defaults.output, "json");
            assert_eq!(config.defaults.color, "auto");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [backend]
                url = "https://file.example.edu"
                "#,
            )?;
            jail.set_env("CAMPUSFLOW_BACKEND__URL", "https://env.example.edu");

            let config = load_from(&PathBuf::from("config.toml")).unwrap();
            assert_eq!(config.backend.url, "https://env.example.edu");
            Ok(())
        });
    }

    #[test]
    fn token_env_indirection_wins_over_plaintext() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CAMPUS_TOKEN_TEST", "from-env");

            let backend = Backend {
                api_token: Some("plaintext".into()),
                api_token_env: Some("CAMPUS_TOKEN_TEST".into()),
                ..Backend::default()
            };
            let token = resolve_token(&backend).unwrap();
            assert_eq!(token.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn missing_token_is_fine() {
        assert!(resolve_token(&Backend::default()).is_none());
    }

    #[test]
    fn invalid_url_is_rejected_at_translation() {
        let config = Config {
            backend: Backend {
                url: "not a url".into(),
                ..Backend::default()
            },
            ..Config::default()
        };
        let err = to_controller_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn rollback_flag_maps_to_policy() {
        let keep = Config {
            backend: Backend {
                rollback_on_failure: false,
                ..Backend::default()
            },
            ..Config::default()
        };
        assert_eq!(
            to_controller_config(&keep).unwrap().rollback,
            RollbackPolicy::Keep
        );
        assert_eq!(
            to_controller_config(&Config::default()).unwrap().rollback,
            RollbackPolicy::Revert
        );
    }

    #[test]
    fn refresh_section_maps_to_poll_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [refresh]
                alerts_secs = 15
                health_secs = 120
                "#,
            )?;

            let config = load_from(&PathBuf::from("config.toml")).unwrap();
            let controller = to_controller_config(&config).unwrap();
            assert_eq!(
                controller.poll.alerts,
                Some(std::time::Duration::from_secs(15))
            );
            assert_eq!(
                controller.poll.health,
                Some(std::time::Duration::from_secs(120))
            );
            assert_eq!(controller.poll.dashboard, None);
            assert_eq!(controller.poll.security, None);
            Ok(())
        });
    }
}
