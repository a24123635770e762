//! Report configuration.
//! Defaults, optional JSON config file, and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode config: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("separator must be a single ASCII character, got {0:?}")]
    InvalidSeparator(char),
    #[error("chart size must be at least 200x150, got {width}x{height}")]
    InvalidChartSize { width: u32, height: u32 },
}

/// Settings for one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub control_path: PathBuf,
    pub test_path: PathBuf,
    /// Field separator of both CSV files.
    pub separator: char,
    /// Also mean-impute the test table (off keeps the control-only cleaning).
    pub impute_test: bool,
    pub output_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Rows shown by the textual head() previews.
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            control_path: PathBuf::from("control_group.csv"),
            test_path: PathBuf::from("test_group.csv"),
            separator: ';',
            impute_test: false,
            output_dir: PathBuf::from("ab_report"),
            chart_width: 1200,
            chart_height: 800,
            preview_rows: 5,
        }
    }
}

impl ReportConfig {
    /// Load a JSON config file. Missing keys take their default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded report config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.separator_byte()?;
        if self.chart_width < 200 || self.chart_height < 150 {
            return Err(ConfigError::InvalidChartSize {
                width: self.chart_width,
                height: self.chart_height,
            });
        }
        Ok(())
    }

    /// The separator as the byte polars expects.
    pub fn separator_byte(&self) -> Result<u8, ConfigError> {
        if self.separator.is_ascii() && !self.separator.is_ascii_alphanumeric() {
            Ok(self.separator as u8)
        } else {
            Err(ConfigError::InvalidSeparator(self.separator))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.separator_byte().unwrap(), b';');
        assert!(!config.impute_test);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"impute_test": true, "separator": ","}}"#).unwrap();

        let config = ReportConfig::load(file.path()).unwrap();
        assert!(config.impute_test);
        assert_eq!(config.separator, ',');
        assert_eq!(config.control_path, PathBuf::from("control_group.csv"));
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ReportConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let file = NamedTempFile::new().unwrap();
        let config = ReportConfig {
            impute_test: true,
            preview_rows: 10,
            ..ReportConfig::default()
        };
        config.save(file.path()).unwrap();
        assert_eq!(ReportConfig::load(file.path()).unwrap(), config);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_reports_unencodable_path() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let file = NamedTempFile::new().unwrap();
        let config = ReportConfig {
            output_dir: PathBuf::from(OsString::from_vec(vec![0x66, 0xff, 0x6f])),
            ..ReportConfig::default()
        };
        assert!(matches!(
            config.save(file.path()),
            Err(ConfigError::Serialize(_))
        ));
    }

    #[test]
    fn test_invalid_separator_and_size() {
        let config = ReportConfig {
            separator: 'x',
            ..ReportConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSeparator('x'))
        ));

        let config = ReportConfig {
            chart_width: 10,
            ..ReportConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidChartSize { .. })
        ));
    }
}
