//! Chart Data Model
//! Backend-independent chart contents built from the merged campaign table.

use crate::charts::catalog::{ChartSpec, PieSpec, ScatterSpec, CHART_SEQUENCE};
use crate::data::schema::Arm;
use crate::stats::{fit_trend, CampaignTotals, StatsCalculator, StatsError, TrendLine};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::f64::consts::TAU;

/// Largest marker radius, in pixels, for the biggest size value.
pub const MAX_MARKER_RADIUS: f64 = 10.0;
const MIN_MARKER_RADIUS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterSeries {
    pub arm: Arm,
    pub campaign: String,
    pub points: Vec<ScatterPoint>,
    pub trend: Option<TrendLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub size_label: String,
    pub series: Vec<ScatterSeries>,
    pub commentary: String,
}

impl ScatterChart {
    /// Largest size value over all series (used to scale markers).
    pub fn max_size(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.size)
            .fold(0.0, f64::max)
    }

    /// Padded `(x_min, x_max, y_min, y_max)` covering every point.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (mut x0, mut x1, mut y0, mut y1) = (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for p in points {
            x0 = x0.min(p.x);
            x1 = x1.max(p.x);
            y0 = y0.min(p.y);
            y1 = y1.max(p.y);
        }
        if x0 > x1 {
            return (0.0, 1.0, 0.0, 1.0);
        }
        let (x0, x1) = pad_range(x0, x1);
        let (y0, y1) = pad_range(y0, y1);
        (x0, x1, y0, y1)
    }
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span <= 0.0 {
        (min - 1.0, max + 1.0)
    } else {
        (min - span * 0.05, max + span * 0.05)
    }
}

/// Marker radius for a size value. Marker area is proportional to the value.
pub fn marker_radius(size: f64, max_size: f64, max_radius: f64) -> f64 {
    if max_size.is_nan() || size.is_nan() || max_size <= 0.0 || size <= 0.0 {
        return MIN_MARKER_RADIUS;
    }
    (max_radius * (size / max_size).sqrt()).max(MIN_MARKER_RADIUS)
}

#[derive(Debug, Clone, Serialize)]
pub struct PieSlice {
    pub arm: Arm,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieChart {
    pub title: String,
    pub metric: String,
    pub slices: Vec<PieSlice>,
    pub commentary: String,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }

    /// Percentage of the total for each slice.
    pub fn percentages(&self) -> Vec<f64> {
        let total = self.total();
        self.slices
            .iter()
            .map(|s| if total > 0.0 { s.value / total * 100.0 } else { 0.0 })
            .collect()
    }

    /// `(start, end)` angle of each slice in radians, clockwise from 12 o'clock.
    pub fn slice_angles(&self) -> Vec<(f64, f64)> {
        let total = self.total();
        if total.is_nan() || total <= 0.0 {
            return Vec::new();
        }
        let mut start = 0.0;
        self.slices
            .iter()
            .map(|s| {
                let end = start + s.value.max(0.0) / total * TAU;
                let span = (start, end);
                start = end;
                span
            })
            .collect()
    }

    /// Index of the slice covering `angle` (radians, clockwise from 12 o'clock).
    pub fn slice_at_angle(&self, angle: f64) -> Option<usize> {
        let angle = angle.rem_euclid(TAU);
        self.slice_angles()
            .iter()
            .position(|(start, end)| angle >= *start && angle < *end)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Scatter(ScatterChart),
    Pie(PieChart),
}

impl ChartData {
    pub fn title(&self) -> &str {
        match self {
            ChartData::Scatter(c) => &c.title,
            ChartData::Pie(c) => &c.title,
        }
    }

    pub fn commentary(&self) -> &str {
        match self {
            ChartData::Scatter(c) => &c.commentary,
            ChartData::Pie(c) => &c.commentary,
        }
    }

    /// File-name friendly form of the title.
    pub fn slug(&self) -> String {
        let mut slug = String::new();
        for ch in self.title().chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.ends_with('_') {
                slug.push('_');
            }
        }
        slug.trim_matches('_').to_string()
    }
}

/// Builds every chart in [`CHART_SEQUENCE`] from the merged table.
pub struct ChartFactory<'a> {
    merged: &'a DataFrame,
    totals: &'a CampaignTotals,
}

impl<'a> ChartFactory<'a> {
    pub fn new(merged: &'a DataFrame, totals: &'a CampaignTotals) -> Self {
        Self { merged, totals }
    }

    fn campaigns(&self) -> [(Arm, &'a str); 2] {
        [
            (Arm::Control, self.totals.control_campaign.as_str()),
            (Arm::Test, self.totals.test_campaign.as_str()),
        ]
    }

    pub fn build_all(&self) -> Result<Vec<ChartData>, StatsError> {
        CHART_SEQUENCE
            .iter()
            .map(|spec| match spec {
                ChartSpec::Scatter(spec) => self.scatter(spec).map(ChartData::Scatter),
                ChartSpec::Pie(spec) => self.pie(spec).map(ChartData::Pie),
            })
            .collect()
    }

    pub fn scatter(&self, spec: &ScatterSpec) -> Result<ScatterChart, StatsError> {
        let mut series = Vec::with_capacity(2);
        for (arm, campaign) in self.campaigns() {
            let points: Vec<ScatterPoint> =
                StatsCalculator::scatter_triples(self.merged, campaign, spec.x, spec.y, spec.size)?
                    .into_iter()
                    .map(|(x, y, size)| ScatterPoint { x, y, size })
                    .collect();
            let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
            let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
            let trend = fit_trend(&xs, &ys);

            series.push(ScatterSeries {
                arm,
                campaign: campaign.to_string(),
                points,
                trend,
            });
        }

        let commentary = scatter_commentary(spec, &series);
        Ok(ScatterChart {
            title: format!("{} vs {}", spec.y, spec.x),
            x_label: spec.x.to_string(),
            y_label: spec.y.to_string(),
            size_label: spec.size.to_string(),
            series,
            commentary,
        })
    }

    pub fn pie(&self, spec: &PieSpec) -> Result<PieChart, StatsError> {
        let mut slices = Vec::with_capacity(2);
        for (arm, campaign) in self.campaigns() {
            let value = match self.totals.get(spec.metric) {
                Some(totals) if arm == Arm::Control => totals.control,
                Some(totals) => totals.test,
                None => StatsCalculator::campaign_total(self.merged, campaign, spec.metric)?,
            };
            slices.push(PieSlice {
                arm,
                label: format!("{} {}", spec.label_prefix, campaign),
                value,
            });
        }

        let chart = PieChart {
            title: spec.title.to_string(),
            metric: spec.metric.to_string(),
            commentary: String::new(),
            slices,
        };
        let commentary = pie_commentary(&chart, &self.campaigns());
        Ok(PieChart { commentary, ..chart })
    }
}

fn pie_commentary(chart: &PieChart, campaigns: &[(Arm, &str); 2]) -> String {
    let (control, test) = match chart.slices.as_slice() {
        [control, test] => (control.value, test.value),
        _ => return String::new(),
    };
    if chart.total().is_nan() || chart.total() <= 0.0 {
        return format!("Neither campaign recorded any {}.", chart.metric);
    }
    if control == test {
        return format!(
            "Both campaigns are level on {} at {}.",
            chart.metric,
            format_value(control)
        );
    }

    let shares = chart.percentages();
    let (leader, lead, trail, share) = if control > test {
        (campaigns[0].1, control, test, shares[0])
    } else {
        (campaigns[1].1, test, control, shares[1])
    };
    format!(
        "The {} leads on {}: {} vs {} ({:.1}% of the combined total).",
        leader,
        chart.metric,
        format_value(lead),
        format_value(trail),
        share
    )
}

fn scatter_commentary(spec: &ScatterSpec, series: &[ScatterSeries]) -> String {
    let mut parts: Vec<String> = series
        .iter()
        .map(|s| match &s.trend {
            Some(trend) => format!(
                "{}: {:.3} {} per unit of {} (R\u{b2} {:.2})",
                s.campaign, trend.slope, spec.y, spec.x, trend.r_squared
            ),
            None => format!("{}: not enough points for a trend line", s.campaign),
        })
        .collect();

    let fitted: Vec<(&str, f64)> = series
        .iter()
        .filter_map(|s| s.trend.map(|t| (s.campaign.as_str(), t.slope)))
        .collect();
    if let [(a, slope_a), (b, slope_b)] = fitted.as_slice() {
        if slope_a != slope_b {
            let steeper = if slope_a > slope_b { a } else { b };
            parts.push(format!(
                "The {} gets more {} for each additional unit of {}",
                steeper, spec.y, spec.x
            ));
        }
    }

    let mut text = parts.join(". ");
    text.push('.');
    text
}

/// Format a total for display: integers without decimals, others with two.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{CAMPAIGN_NAME, NUMERIC_COLUMNS, PURCHASES, SEARCHES_RECEIVED};
    use polars::prelude::*;

    fn merged() -> DataFrame {
        let mut columns = vec![Column::new(
            CAMPAIGN_NAME.into(),
            ["Control Campaign", "Control Campaign", "Test Campaign", "Test Campaign"],
        )];
        for (i, name) in NUMERIC_COLUMNS.iter().enumerate() {
            let base = (i + 1) as f64;
            columns.push(Column::new(
                (*name).into(),
                [base, base * 2.0, base * 3.0, base * 5.0],
            ));
        }
        DataFrame::new(columns).unwrap()
    }

    fn factory_charts() -> Vec<ChartData> {
        let df = merged();
        let totals =
            StatsCalculator::compute_totals(&df, "Control Campaign", "Test Campaign").unwrap();
        ChartFactory::new(&df, &totals).build_all().unwrap()
    }

    #[test]
    fn test_build_all_follows_sequence() {
        let charts = factory_charts();
        assert_eq!(charts.len(), CHART_SEQUENCE.len());
        assert!(matches!(charts[0], ChartData::Scatter(_)));
        assert_eq!(charts[1].title(), "Control Vs Test: Searches");
        assert_eq!(charts[6].title(), "Control Vs Test: Purchases");
        assert!(matches!(charts[8], ChartData::Scatter(_)));
        assert_eq!(charts.len(), 9);
    }

    #[test]
    fn test_pie_values_are_campaign_sums() {
        let charts = factory_charts();
        let ChartData::Pie(pie) = &charts[1] else {
            panic!("expected pie");
        };
        let base = (NUMERIC_COLUMNS
            .iter()
            .position(|n| *n == SEARCHES_RECEIVED)
            .unwrap()
            + 1) as f64;

        assert_eq!(pie.metric, SEARCHES_RECEIVED);
        assert_eq!(pie.slices[0].value, base * 3.0);
        assert_eq!(pie.slices[1].value, base * 8.0);
        assert_eq!(pie.slices[0].label, "Total Searches from Control Campaign");
        assert!(pie.commentary.starts_with("The Test Campaign leads on Searches Received"));
    }

    #[test]
    fn test_scatter_has_trend_per_campaign() {
        let charts = factory_charts();
        let ChartData::Scatter(scatter) = &charts[8] else {
            panic!("expected scatter");
        };
        assert_eq!(scatter.x_label, PURCHASES);
        assert_eq!(scatter.series.len(), 2);
        for series in &scatter.series {
            assert_eq!(series.points.len(), 2);
            assert!(series.trend.is_some());
        }
        assert!(scatter.commentary.contains("Control Campaign:"));
    }

    #[test]
    fn test_slice_angles_and_lookup() {
        let pie = PieChart {
            title: "t".into(),
            metric: "m".into(),
            slices: vec![
                PieSlice {
                    arm: Arm::Control,
                    label: "a".into(),
                    value: 1.0,
                },
                PieSlice {
                    arm: Arm::Test,
                    label: "b".into(),
                    value: 3.0,
                },
            ],
            commentary: String::new(),
        };
        let angles = pie.slice_angles();
        assert!((angles[0].1 - TAU / 4.0).abs() < 1e-12);
        assert!((angles[1].1 - TAU).abs() < 1e-12);
        assert_eq!(pie.slice_at_angle(0.1), Some(0));
        assert_eq!(pie.slice_at_angle(3.0), Some(1));
        assert_eq!(pie.percentages(), vec![25.0, 75.0]);
    }

    #[test]
    fn test_pie_commentary_for_empty_metric() {
        let pie = PieChart {
            title: "t".into(),
            metric: "Purchases".into(),
            slices: vec![
                PieSlice {
                    arm: Arm::Control,
                    label: "a".into(),
                    value: 0.0,
                },
                PieSlice {
                    arm: Arm::Test,
                    label: "b".into(),
                    value: 0.0,
                },
            ],
            commentary: String::new(),
        };
        let text = pie_commentary(&pie, &[(Arm::Control, "C"), (Arm::Test, "T")]);
        assert_eq!(text, "Neither campaign recorded any Purchases.");
        assert!(pie.slice_angles().is_empty());
    }

    #[test]
    fn test_marker_radius_scales_with_area() {
        assert_eq!(marker_radius(100.0, 100.0, 10.0), 10.0);
        assert_eq!(marker_radius(25.0, 100.0, 10.0), 5.0);
        assert_eq!(marker_radius(0.0, 100.0, 10.0), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(1.0, 0.0, 10.0), MIN_MARKER_RADIUS);
    }

    #[test]
    fn test_slug() {
        let charts = factory_charts();
        assert_eq!(charts[1].slug(), "control_vs_test_searches");
        assert_eq!(charts[0].slug(), "amount_spent_vs_number_of_impressions");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1500.0), "1500");
        assert_eq!(format_value(15.5), "15.50");
    }
}
