//! Stats module - campaign aggregates and trend fitting

mod calculator;
mod trend;

pub use calculator::{CampaignTotals, MetricTotals, StatsCalculator, StatsError};
pub use trend::{fit_trend, TrendLine};
