use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_MAX_UPPER;
use crate::data::filter::DEFAULT_EXCLUDED_CLASS;
use crate::error::ConfigError;
use crate::export::{DEFAULT_FILE_NAME, DEFAULT_SHEET_NAME};

/// Overrides the default config file location.
pub const CONFIG_ENV: &str = "BOOKING_FREQ_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_max_upper")]
    pub default_max_upper: u32,
    /// Classes containing this text (any case) are ignored; empty disables.
    #[serde(default = "default_excluded_class")]
    pub excluded_class: String,
}

fn default_max_upper() -> u32 {
    DEFAULT_MAX_UPPER
}
fn default_excluded_class() -> String {
    DEFAULT_EXCLUDED_CLASS.into()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_max_upper: default_max_upper(),
            excluded_class: default_excluded_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.into()
}
fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            sheet_name: default_sheet_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    #[serde(default = "default_plot_height")]
    pub plot_height: f32,
}

fn default_window_width() -> f32 {
    1200.0
}
fn default_window_height() -> f32 {
    800.0
}
fn default_plot_height() -> f32 {
    340.0
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            plot_height: default_plot_height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(env_path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("booking-freq")
            .join("config.toml")
    }

    /// Load from [`config_path`](Self::config_path); a missing file gives defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.analysis.default_max_upper, 15);
        assert_eq!(cfg.analysis.excluded_class, "Self Practice");
        assert_eq!(cfg.export.file_name, "booking_frequency.xlsx");
        assert_eq!(cfg.export.sheet_name, "Frequency Analysis");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\ndefault_max_upper = 8\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.analysis.default_max_upper, 8);
        assert_eq!(cfg.analysis.excluded_class, "Self Practice");
        assert_eq!(cfg.display, DisplayConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.export.sheet_name = "Bookings".into();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn env_var_overrides_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::env::set_var(CONFIG_ENV, &path);
        assert_eq!(Config::config_path(), path);
        std::env::remove_var(CONFIG_ENV);
    }
}
