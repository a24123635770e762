//! CLI argument definitions for the campaign comparison.

use std::path::PathBuf;

use campaign_ab_viewer::config::{ConfigError, ReportConfig};
use campaign_ab_viewer::logging::{LogConfig, LogFormat};
use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "campaign-ab",
    version,
    about = "Compare a control and a test marketing campaign",
    long_about = "Load the control and test campaign CSV files, fill missing control metrics \
                  with column means, merge both campaigns by date and chart the comparison.\n\n\
                  Opens the interactive viewer unless --headless is given."
)]
pub struct Cli {
    /// Control campaign CSV (default: control_group.csv).
    #[arg(long, value_name = "PATH")]
    pub control: Option<PathBuf>,

    /// Test campaign CSV (default: test_group.csv).
    #[arg(long, value_name = "PATH")]
    pub test: Option<PathBuf>,

    /// JSON config file; flags override its values.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// CSV field separator.
    #[arg(long, value_name = "CHAR")]
    pub separator: Option<char>,

    /// Directory for exported charts and summary.json.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Fill missing test-campaign metrics with column means as well.
    #[arg(long = "impute-test")]
    pub impute_test: bool,

    /// Print the summary and export charts without opening a window.
    #[arg(long)]
    pub headless: bool,

    /// With --headless, print the summary only.
    #[arg(long = "no-export", requires = "headless")]
    pub no_export: bool,

    /// Explicit log level (overrides RUST_LOG).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level_filter: self.log_level.map(LevelFilter::from).unwrap_or(LevelFilter::INFO),
            format: self.log_format.into(),
            use_env_filter: self.log_level.is_none(),
            ..LogConfig::default()
        }
    }

    /// Config file (or defaults) with command line overrides applied.
    pub fn report_config(&self) -> Result<ReportConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::load(path)?,
            None => ReportConfig::default(),
        };

        if let Some(path) = &self.control {
            config.control_path = path.clone();
        }
        if let Some(path) = &self.test {
            config.test_path = path.clone();
        }
        if let Some(separator) = self.separator {
            config.separator = separator;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.impute_test {
            config.impute_test = true;
        }

        config.validate()?;
        Ok(config)
    }
}
