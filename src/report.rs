//! End-to-end A/B report: load, clean, merge, aggregate, chart, export.

use crate::charts::{ChartData, ChartFactory, RenderError, StaticChartRenderer};
use crate::config::{ConfigError, ReportConfig};
use crate::data::{
    campaign_counts, clean_tables, merge_campaigns, null_counts, Arm, CampaignLoader,
    CampaignTable, CleanerError, LoaderError, MergerError,
};
use crate::stats::{CampaignTotals, StatsCalculator, StatsError};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Cleaner(#[from] CleanerError),
    #[error(transparent)]
    Merger(#[from] MergerError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("failed to render chart {index}: {source}")]
    Render {
        index: usize,
        #[source]
        source: RenderError,
    },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the report shows, computed once.
#[derive(Debug, Clone)]
pub struct AbReport {
    /// Control table after cleaning.
    pub control: CampaignTable,
    /// Test table after (optional) cleaning.
    pub test: CampaignTable,
    /// Tables as loaded, before any missing value was filled.
    pub control_raw: DataFrame,
    pub test_raw: DataFrame,
    /// Per-column null counts before cleaning.
    pub control_nulls: Vec<(String, usize)>,
    pub test_nulls: Vec<(String, usize)>,
    pub merged: DataFrame,
    pub campaign_counts: Vec<(String, usize)>,
    pub totals: CampaignTotals,
    pub charts: Vec<ChartData>,
}

#[derive(Serialize)]
struct NullCounts<'a> {
    control: &'a [(String, usize)],
    test: &'a [(String, usize)],
}

#[derive(Serialize)]
struct SummaryFile<'a> {
    control_rows: usize,
    test_rows: usize,
    merged_rows: usize,
    nulls_before_cleaning: NullCounts<'a>,
    campaign_counts: &'a [(String, usize)],
    totals: &'a CampaignTotals,
    charts: &'a [ChartData],
}

impl AbReport {
    pub fn build(config: &ReportConfig) -> Result<Self, ReportError> {
        Self::build_with_progress(config, |_, _| {})
    }

    /// Run the pipeline, reporting `(fraction, stage)` as it goes.
    pub fn build_with_progress(
        config: &ReportConfig,
        mut progress: impl FnMut(f32, &str),
    ) -> Result<Self, ReportError> {
        config.validate()?;
        let loader = CampaignLoader::new(config.separator_byte()?);

        progress(0.1, "Loading control campaign...");
        let mut control = loader.load(&config.control_path, Arm::Control)?;
        progress(0.2, "Loading test campaign...");
        let mut test = loader.load(&config.test_path, Arm::Test)?;

        let control_nulls = null_counts(&control.df);
        let test_nulls = null_counts(&test.df);
        let control_raw = control.df.clone();
        let test_raw = test.df.clone();

        progress(0.35, "Filling missing values...");
        clean_tables(&mut control, &mut test, config.impute_test)?;

        progress(0.5, "Merging campaigns...");
        let merged = merge_campaigns(&control.df, &test.df)?;
        let counts = campaign_counts(&merged)?;

        progress(0.65, "Computing totals...");
        let totals = StatsCalculator::compute_totals(&merged, &control.name, &test.name)?;

        progress(0.8, "Building charts...");
        let charts = ChartFactory::new(&merged, &totals).build_all()?;

        tracing::info!(
            control_rows = control.row_count(),
            test_rows = test.row_count(),
            merged_rows = merged.height(),
            charts = charts.len(),
            "Report ready"
        );
        progress(1.0, "Done");

        Ok(Self {
            control,
            test,
            control_raw,
            test_raw,
            control_nulls,
            test_nulls,
            merged,
            campaign_counts: counts,
            totals,
            charts,
        })
    }

    pub fn print_summary(&self, preview_rows: usize) -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.write_summary(&mut out, preview_rows)
    }

    /// Textual walk-through: previews, null counts, merged table, counts,
    /// totals, then the commentary of every chart.
    pub fn write_summary<W: Write>(&self, out: &mut W, preview_rows: usize) -> std::io::Result<()> {
        let tables = [
            (&self.control, &self.control_raw, &self.control_nulls),
            (&self.test, &self.test_raw, &self.test_nulls),
        ];
        for (table, raw, nulls) in tables {
            writeln!(out, "== {} ({}, {} rows) ==", table.name, table.path.display(), table.row_count())?;
            writeln!(out, "As loaded:")?;
            writeln!(out, "{}", raw.head(Some(preview_rows)))?;
            writeln!(out, "Missing values before cleaning:")?;
            for (column, count) in nulls {
                writeln!(out, "  {column:<24} {count}")?;
            }
            writeln!(out)?;
        }

        writeln!(out, "== Merged campaigns ({} rows) ==", self.merged.height())?;
        writeln!(out, "{}", self.merged.head(Some(preview_rows)))?;
        for (campaign, count) in &self.campaign_counts {
            writeln!(out, "  {campaign:<24} {count}")?;
        }
        writeln!(out)?;

        writeln!(
            out,
            "== Totals: {} vs {} ==",
            self.totals.control_campaign, self.totals.test_campaign
        )?;
        for metric in &self.totals.metrics {
            writeln!(
                out,
                "  {:<24} {:>14.2} {:>14.2}",
                metric.metric, metric.control, metric.test
            )?;
        }
        writeln!(out)?;

        for (i, chart) in self.charts.iter().enumerate() {
            writeln!(out, "{:>2}. {}", i + 1, chart.title())?;
            writeln!(out, "    {}", chart.commentary())?;
        }
        Ok(())
    }

    /// Write every chart as `NN_<slug>.png` plus `summary.json` into `dir`.
    pub fn export(&self, dir: &Path, width: u32, height: u32) -> Result<Vec<PathBuf>, ReportError> {
        std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = self
            .charts
            .par_iter()
            .enumerate()
            .map(|(index, chart)| -> Result<PathBuf, ReportError> {
                let bytes = StaticChartRenderer::render_png(chart, width, height)
                    .map_err(|source| ReportError::Render { index, source })?;
                let path = dir.join(format!("{:02}_{}.png", index + 1, chart.slug()));
                std::fs::write(&path, bytes).map_err(|source| ReportError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(path)
            })
            .collect::<Result<Vec<_>, ReportError>>()?;

        let summary_path = dir.join("summary.json");
        let summary = SummaryFile {
            control_rows: self.control.row_count(),
            test_rows: self.test.row_count(),
            merged_rows: self.merged.height(),
            nulls_before_cleaning: NullCounts {
                control: &self.control_nulls,
                test: &self.test_nulls,
            },
            campaign_counts: &self.campaign_counts,
            totals: &self.totals,
            charts: &self.charts,
        };
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(&summary_path, json).map_err(|source| ReportError::Io {
            path: summary_path.clone(),
            source,
        })?;
        written.push(summary_path);

        tracing::info!(dir = %dir.display(), files = written.len(), "Exported report");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Campaign Name;Date;Spend [USD];# of Impressions;Reach;# of Website Clicks;# of Searches;# of View Content;# of Add to Cart;# of Purchase";

    fn csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    fn config(control: &NamedTempFile, test: &NamedTempFile) -> ReportConfig {
        ReportConfig {
            control_path: control.path().to_path_buf(),
            test_path: test.path().to_path_buf(),
            ..ReportConfig::default()
        }
    }

    #[test]
    fn test_build_and_summarize() {
        let control = csv(&[
            "Control Campaign;1.8.2019;2280;82702;56930;7016;2290;2159;1819;618",
            "Control Campaign;2.8.2019;1757;;;;;;;",
        ]);
        let test = csv(&[
            "Test Campaign;1.8.2019;3008;39550;35820;3038;1946;1069;894;255",
            "Test Campaign;2.8.2019;2542;100719;91236;4657;2359;1548;879;677",
        ]);

        let report = AbReport::build(&config(&control, &test)).unwrap();
        assert_eq!(report.merged.height(), 4);
        assert_eq!(report.charts.len(), 9);
        assert!(report
            .control_nulls
            .iter()
            .any(|(name, count)| name == "Reach" && *count == 1));

        let mut out = Vec::new();
        report.write_summary(&mut out, 5).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Merged campaigns (4 rows)"));
        assert!(text.contains("Control Campaign"));
    }

    #[test]
    fn test_summary_previews_tables_as_loaded() {
        let control = csv(&[
            "Control Campaign;1.8.2019;2280;82702;56930;7016;2290;2159;1819;618",
            "Control Campaign;2.8.2019;1757;;;;;;;",
        ]);
        let test = csv(&["Test Campaign;1.8.2019;3008;39550;35820;3038;1946;1069;894;255"]);

        let report = AbReport::build(&config(&control, &test)).unwrap();
        assert_eq!(report.control_raw.column("Reach").unwrap().null_count(), 1);
        assert_eq!(report.control.df.column("Reach").unwrap().null_count(), 0);

        let mut out = Vec::new();
        report.write_summary(&mut out, 5).unwrap();
        let text = String::from_utf8(out).unwrap();

        // Only the raw control preview still has gaps to show
        assert!(text.contains("As loaded:"));
        assert!(text.contains("null"));
    }

    #[test]
    fn test_missing_file_is_loader_error() {
        let test = csv(&["Test Campaign;1.8.2019;3008;39550;35820;3038;1946;1069;894;255"]);
        let config = ReportConfig {
            control_path: PathBuf::from("/nonexistent/control_group.csv"),
            test_path: test.path().to_path_buf(),
            ..ReportConfig::default()
        };
        assert!(matches!(
            AbReport::build(&config),
            Err(ReportError::Loader(LoaderError::FileNotFound { .. }))
        ));
    }
}
