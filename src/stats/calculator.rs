//! Statistics Calculator Module
//! Per-campaign aggregates over the merged campaign table.

use crate::data::schema::{CAMPAIGN_NAME, NUMERIC_COLUMNS};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Control and test totals for one metric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTotals {
    pub metric: String,
    pub control: f64,
    pub test: f64,
}

impl MetricTotals {
    pub fn combined(&self) -> f64 {
        self.control + self.test
    }

    /// Control share of the combined total, in percent.
    pub fn control_share(&self) -> f64 {
        let total = self.combined();
        if total == 0.0 {
            f64::NAN
        } else {
            self.control / total * 100.0
        }
    }

    pub fn test_share(&self) -> f64 {
        let total = self.combined();
        if total == 0.0 {
            f64::NAN
        } else {
            self.test / total * 100.0
        }
    }
}

/// Totals of every numeric column for both campaigns.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignTotals {
    pub control_campaign: String,
    pub test_campaign: String,
    pub metrics: Vec<MetricTotals>,
}

impl CampaignTotals {
    pub fn get(&self, metric: &str) -> Option<&MetricTotals> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Handles aggregate calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Rows belonging to one campaign.
    fn campaign_rows(df: &DataFrame, campaign: &str) -> LazyFrame {
        df.clone()
            .lazy()
            .filter(col(CAMPAIGN_NAME).eq(lit(campaign)))
    }

    /// Sum of `column` over the rows of `campaign`. Nulls are skipped.
    pub fn campaign_total(df: &DataFrame, campaign: &str, column: &str) -> Result<f64, StatsError> {
        let summed = Self::campaign_rows(df, campaign)
            .select([col(column).cast(DataType::Float64).sum()])
            .collect()?;

        let total = summed.column(column)?.f64()?.get(0).unwrap_or(0.0);
        Ok(total)
    }

    /// `(x, y, size)` triples for one campaign. Rows with any null are dropped.
    pub fn scatter_triples(
        df: &DataFrame,
        campaign: &str,
        x: &str,
        y: &str,
        size: &str,
    ) -> Result<Vec<(f64, f64, f64)>, StatsError> {
        let selected = Self::campaign_rows(df, campaign)
            .select([
                col(x).cast(DataType::Float64).alias("x"),
                col(y).cast(DataType::Float64).alias("y"),
                col(size).cast(DataType::Float64).alias("size"),
            ])
            .collect()?;

        let xs = selected.column("x")?.f64()?;
        let ys = selected.column("y")?.f64()?;
        let sizes = selected.column("size")?.f64()?;

        let triples = xs
            .into_iter()
            .zip(ys.into_iter())
            .zip(sizes.into_iter())
            .filter_map(|((x, y), s)| Some((x?, y?, s?)))
            .collect();
        Ok(triples)
    }

    /// Compute totals for every numeric column in parallel.
    pub fn compute_totals(
        df: &DataFrame,
        control_campaign: &str,
        test_campaign: &str,
    ) -> Result<CampaignTotals, StatsError> {
        let metrics = NUMERIC_COLUMNS
            .par_iter()
            .map(|metric| -> Result<MetricTotals, StatsError> {
                Ok(MetricTotals {
                    metric: metric.to_string(),
                    control: Self::campaign_total(df, control_campaign, metric)?,
                    test: Self::campaign_total(df, test_campaign, metric)?,
                })
            })
            .collect::<Result<Vec<_>, StatsError>>()?;

        tracing::debug!(metrics = metrics.len(), "Computed campaign totals");

        Ok(CampaignTotals {
            control_campaign: control_campaign.to_string(),
            test_campaign: test_campaign.to_string(),
            metrics,
        })
    }
}
