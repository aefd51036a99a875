use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use pf_http::{DEFAULT_USER_AGENT, HttpClientConfig};
use preferences::PreferencesConfig;
use serde::{Deserialize, Serialize};
use session::SessionConfig;

/// Environment variable prefix; nested keys are separated by `__`,
/// e.g. `PAINTFLOW__API__BASE_URL`.
pub const ENV_PREFIX: &str = "PAINTFLOW__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub preferences: PreferencesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_owned(),
            request_timeout_seconds: 10,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::new(&self.base_url)
            .with_timeout(Duration::from_secs(self.request_timeout_seconds))
            .with_user_agent(&self.user_agent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StorageConfig {
    /// JSON file backing the client key-value store. `~` is expanded.
    pub path: String,
    /// Keep everything in memory; nothing survives the process.
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "~/.paintflow/client-state.json".to_owned(),
            in_memory: false,
        }
    }
}

impl StorageConfig {
    /// # Errors
    /// Fails if the path starts with `~` and no home directory is known.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        expand_tilde(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `session=debug,info`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Layered load: defaults, then the YAML file (if any), then
    /// `PAINTFLOW__*` environment variables.
    ///
    /// # Errors
    /// Fails if the file is missing or any layer does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().context("invalid configuration")
    }

    /// `-v` raises the level to info, `-vv` debug, `-vvv` trace.
    pub fn apply_cli_overrides(&mut self, verbose: u8) {
        let level = match verbose {
            0 => return,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        level.clone_into(&mut self.logging.level);
    }

    /// # Errors
    /// Describes the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url)
            .with_context(|| format!("api.base_url is not a valid URL: {}", self.api.base_url))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            bail!("api.base_url must be an http(s) URL with a host");
        }
        if self.api.request_timeout_seconds == 0 {
            bail!("api.request_timeout_seconds must be positive");
        }
        if self.session.check_interval_seconds == 0 {
            bail!("session.check_interval_seconds must be positive");
        }
        if self.session.freshness_window_seconds == 0 {
            bail!("session.freshness_window_seconds must be positive");
        }
        if self.preferences.channel_capacity == 0 {
            bail!("preferences.channel_capacity must be positive");
        }
        if !self.storage.in_memory && self.storage.path.trim().is_empty() {
            bail!("storage.path must be set unless storage.in_memory is true");
        }
        Ok(())
    }

    /// # Errors
    /// Fails if the config cannot be serialized.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration")
    }
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    let rest = match raw.strip_prefix('~') {
        None => return Ok(PathBuf::from(raw)),
        Some(rest) => rest.trim_start_matches(['/', '\\']),
    };
    let home = dirs::home_dir().context("cannot expand '~': home directory is unknown")?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.api.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(cfg.session.check_interval_seconds, 1800);
        assert_eq!(cfg.session.freshness_window_seconds, 86_400);
        assert_eq!(cfg.preferences.max_accent_length, 32);
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn yaml_layer_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api:\n  base_url: https://paintflow.example.com/api\nsession:\n  check_interval_seconds: 60\nlogging:\n  format: json"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.api.base_url, "https://paintflow.example.com/api");
        assert_eq!(cfg.api.request_timeout_seconds, 10);
        assert_eq!(cfg.session.check_interval_seconds, 60);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  base_uri: http://x").unwrap();
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.api.base_url = "ftp://files.example.com".to_owned();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.session.check_interval_seconds = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.path = String::new();
        assert!(cfg.validate().is_err());
        cfg.storage.in_memory = true;
        cfg.validate().unwrap();
    }

    #[test]
    fn verbosity_overrides_level() {
        let mut cfg = AppConfig::default();
        cfg.apply_cli_overrides(0);
        assert_eq!(cfg.logging.level, "info");
        cfg.apply_cli_overrides(2);
        assert_eq!(cfg.logging.level, "debug");
        cfg.apply_cli_overrides(5);
        assert_eq!(cfg.logging.level, "trace");
    }

    #[test]
    fn tilde_paths_expand_to_home() {
        let cfg = StorageConfig::default();
        let path = cfg.resolved_path().unwrap();
        assert!(path.ends_with(".paintflow/client-state.json"));
        assert!(!path.to_string_lossy().starts_with('~'));
        assert_eq!(
            expand_tilde("/tmp/state.json").unwrap(),
            PathBuf::from("/tmp/state.json")
        );
    }

    #[test]
    fn yaml_rendering_contains_sections() {
        let yaml = AppConfig::default().to_yaml().unwrap();
        for section in ["api:", "storage:", "session:", "preferences:", "logging:"] {
            assert!(yaml.contains(section), "{section} missing from\n{yaml}");
        }
    }
}
