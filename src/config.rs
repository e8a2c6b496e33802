//! Application Configuration
//! Optional JSON config file with environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CANDY_DASH_CONFIG";
/// Environment variable overriding the dataset path.
pub const DATA_ENV: &str = "CANDY_DATA";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "candy_dash.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid setting '{0}': {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Candy CSV read once at startup.
    pub data_path: PathBuf,
    /// Rows in the "most popular" chart.
    pub top_n: usize,
    /// Minimum win percent of a best-value candy (0-100).
    pub win_threshold: f64,
    /// Maximum price percentile of a best-value candy (0-100).
    pub price_threshold: f64,
    /// Size of exported PNG charts.
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/candy-data.csv"),
            top_n: 10,
            win_threshold: 50.0,
            price_threshold: 50.0,
            export_width: 1200,
            export_height: 800,
        }
    }
}

impl AppConfig {
    /// Resolve the config: explicit file from the environment, then the
    /// working-directory file, then defaults. `CANDY_DATA` wins over all.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::var_os(DATA_ENV).map(PathBuf::from),
        )
    }

    fn resolve(
        explicit: Option<PathBuf>,
        data_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Some(data) = data_override {
            config.data_path = data;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Using config {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n", "must be at least 1".into()));
        }
        for (name, value) in [
            ("win_threshold", self.win_threshold),
            ("price_threshold", self.price_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(name, format!("{value} is outside 0..=100")));
            }
        }
        if self.export_width < 200 || self.export_height < 200 {
            return Err(ConfigError::Invalid(
                "export_width/export_height",
                "must be at least 200 pixels".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "candy_dash_config_{}_{}.json",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.data_path, PathBuf::from("data/candy-data.csv"));
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = write_config("partial", r#"{ "top_n": 5, "data_path": "other.csv" }"#);
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.win_threshold, 50.0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = write_config("broken", "{ top_n: ");
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn data_override_beats_config_file() {
        let path = write_config("resolve", r#"{ "top_n": 3, "data_path": "from_file.csv" }"#);

        let config = AppConfig::resolve(Some(path.clone()), None).unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.data_path, PathBuf::from("from_file.csv"));

        let config =
            AppConfig::resolve(Some(path.clone()), Some(PathBuf::from("override.csv"))).unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.data_path, PathBuf::from("override.csv"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let missing = PathBuf::from("/definitely/not/candy_dash.json");
        assert!(matches!(
            AppConfig::resolve(Some(missing), None),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn load_reads_environment_variables() {
        let path = write_config("env", r#"{ "top_n": 7, "price_threshold": 40.0 }"#);
        std::env::set_var(CONFIG_ENV, &path);
        std::env::set_var(DATA_ENV, "env_data.csv");

        let result = AppConfig::load();
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(DATA_ENV);
        let _ = std::fs::remove_file(path);

        let config = result.unwrap();
        assert_eq!(config.top_n, 7);
        assert_eq!(config.price_threshold, 40.0);
        assert_eq!(config.data_path, PathBuf::from("env_data.csv"));
    }

    #[test]
    fn out_of_scale_threshold_is_rejected() {
        let config = AppConfig {
            price_threshold: 150.0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid("price_threshold", _))
        ));
    }
}
