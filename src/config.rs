//! Layered settings: built-in defaults, an optional TOML file,
//! `SDNWATCH__SECTION__KEY` environment variables, then command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;

pub const DEFAULT_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILE: &str = "sdnwatch.log";
const ENV_PREFIX: &str = "SDNWATCH";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub backend: BackendSettings,
    pub polling: PollingSettings,
    pub logging: LoggingSettings,
    #[serde(default)]
    pub record: RecordSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub url: String,
    /// Per-request timeout, e.g. `5s`.
    pub timeout: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    pub metrics_interval: String,
    pub topology_interval: String,
    /// Points kept per chart.
    pub window: usize,
    pub mode_cooldown: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub file: PathBuf,
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordSettings {
    /// JSON-lines file every applied metrics poll is appended to.
    pub path: Option<PathBuf>,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub timeout: Option<String>,
    pub metrics_interval: Option<String>,
    pub topology_interval: Option<String>,
    pub window: Option<usize>,
    pub record: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings with the process environment as the env layer.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_from(file, environment(), overrides)
    }

    fn load_from(file: Option<&Path>, env: Environment, overrides: &Overrides) -> Result<Self> {
        let mut builder = defaults()?;
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(env);
        builder = apply_overrides(builder, overrides)?;

        let settings: Settings = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.polling.window == 0 {
            bail!("polling.window must be at least 1");
        }
        if self.backend.url.trim().is_empty() {
            bail!("backend.url must not be empty");
        }
        self.timeout()?;
        self.metrics_interval()?;
        self.topology_interval()?;
        self.mode_cooldown()?;
        Ok(())
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(&self.backend.timeout).context("backend.timeout")
    }

    pub fn metrics_interval(&self) -> Result<Duration> {
        parse_duration(&self.polling.metrics_interval).context("polling.metrics_interval")
    }

    pub fn topology_interval(&self) -> Result<Duration> {
        parse_duration(&self.polling.topology_interval).context("polling.topology_interval")
    }

    pub fn mode_cooldown(&self) -> Result<Duration> {
        parse_duration(&self.polling.mode_cooldown).context("polling.mode_cooldown")
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("backend.url", DEFAULT_URL)?
        .set_default("backend.timeout", "5s")?
        .set_default("polling.metrics_interval", "2s")?
        .set_default("polling.topology_interval", "2s")?
        .set_default("polling.window", 25_i64)?
        .set_default("polling.mode_cooldown", "1s")?
        .set_default("logging.file", DEFAULT_LOG_FILE)?
        .set_default("logging.level", "info")?)
}

fn apply_overrides(
    builder: ConfigBuilder<DefaultState>,
    overrides: &Overrides,
) -> Result<ConfigBuilder<DefaultState>> {
    let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());
    Ok(builder
        .set_override_option("backend.url", overrides.url.clone())?
        .set_override_option("backend.timeout", overrides.timeout.clone())?
        .set_override_option("polling.metrics_interval", overrides.metrics_interval.clone())?
        .set_override_option("polling.topology_interval", overrides.topology_interval.clone())?
        .set_override_option("polling.window", overrides.window.map(|w| w as i64))?
        .set_override_option("record.path", path(&overrides.record))?
        .set_override_option("logging.file", path(&overrides.log_file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        environment().source(Some(map))
    }

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from(None, env(&[]), &Overrides::default()).unwrap();
        assert_eq!(settings.backend.url, DEFAULT_URL);
        assert_eq!(settings.polling.window, 25);
        assert_eq!(settings.metrics_interval().unwrap(), Duration::from_secs(2));
        assert_eq!(settings.topology_interval().unwrap(), Duration::from_secs(2));
        assert_eq!(settings.mode_cooldown().unwrap(), Duration::from_secs(1));
        assert_eq!(settings.timeout().unwrap(), Duration::from_secs(5));
        assert_eq!(settings.logging.file, PathBuf::from(DEFAULT_LOG_FILE));
        assert!(settings.record.path.is_none());
    }

    #[test]
    fn test_layer_precedence() {
        let file = write_toml(
            r#"
            [backend]
            url = "http://file:5000"
            timeout = "3s"

            [polling]
            window = 40
            metrics_interval = "1s"
            "#,
        );

        // File over defaults
        let settings = Settings::load_from(Some(file.path()), env(&[]), &Overrides::default())
            .unwrap();
        assert_eq!(settings.backend.url, "http://file:5000");
        assert_eq!(settings.polling.window, 40);
        assert_eq!(settings.topology_interval().unwrap(), Duration::from_secs(2));

        // Env over file
        let vars = [
            ("SDNWATCH__BACKEND__URL", "http://env:5000"),
            ("SDNWATCH__POLLING__WINDOW", "30"),
        ];
        let settings =
            Settings::load_from(Some(file.path()), env(&vars), &Overrides::default()).unwrap();
        assert_eq!(settings.backend.url, "http://env:5000");
        assert_eq!(settings.polling.window, 30);
        assert_eq!(settings.timeout().unwrap(), Duration::from_secs(3));

        // CLI over env
        let overrides = Overrides {
            url: Some("http://cli:5000".to_string()),
            window: Some(10),
            record: Some(PathBuf::from("/tmp/run.jsonl")),
            ..Default::default()
        };
        let settings = Settings::load_from(Some(file.path()), env(&vars), &overrides).unwrap();
        assert_eq!(settings.backend.url, "http://cli:5000");
        assert_eq!(settings.polling.window, 10);
        assert_eq!(settings.metrics_interval().unwrap(), Duration::from_secs(1));
        assert_eq!(settings.record.path, Some(PathBuf::from("/tmp/run.jsonl")));
    }

    #[test]
    fn test_rejects_bad_values() {
        let overrides = Overrides {
            window: Some(0),
            ..Default::default()
        };
        assert!(Settings::load_from(None, env(&[]), &overrides).is_err());

        let overrides = Overrides {
            metrics_interval: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(Settings::load_from(None, env(&[]), &overrides).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Settings::load_from(Some(&path), env(&[]), &Overrides::default()).is_err());
    }
}
