//! The fixed set of comparison charts, in presentation order.

use crate::data::schema::{
    ADDED_TO_CART, AMOUNT_SPENT, CONTENT_VIEWED, IMPRESSIONS, PURCHASES, SEARCHES_RECEIVED,
    WEBSITE_CLICKS,
};

/// Scatter of `y` against `x`, markers sized by `size`, one trend line per campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScatterSpec {
    pub x: &'static str,
    pub y: &'static str,
    pub size: &'static str,
}

/// Two-slice pie comparing campaign totals of `metric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieSpec {
    pub metric: &'static str,
    pub title: &'static str,
    /// Slice label is `"{label_prefix} {campaign}"`.
    pub label_prefix: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSpec {
    Scatter(ScatterSpec),
    Pie(PieSpec),
}

pub const CHART_SEQUENCE: [ChartSpec; 9] = [
    ChartSpec::Scatter(ScatterSpec {
        x: IMPRESSIONS,
        y: AMOUNT_SPENT,
        size: AMOUNT_SPENT,
    }),
    ChartSpec::Pie(PieSpec {
        metric: SEARCHES_RECEIVED,
        title: "Control Vs Test: Searches",
        label_prefix: "Total Searches from",
    }),
    ChartSpec::Pie(PieSpec {
        metric: WEBSITE_CLICKS,
        title: "Control Vs Test: Website Clicks",
        label_prefix: "Website Clicks from",
    }),
    ChartSpec::Pie(PieSpec {
        metric: CONTENT_VIEWED,
        title: "Control Vs Test: Content Viewed",
        label_prefix: "Content Viewed from",
    }),
    ChartSpec::Pie(PieSpec {
        metric: ADDED_TO_CART,
        title: "Control Vs Test: Added to Cart",
        label_prefix: "Products Added to Cart from",
    }),
    ChartSpec::Pie(PieSpec {
        metric: AMOUNT_SPENT,
        title: "Control Vs Test: Amount Spent",
        label_prefix: "Amount Spent in",
    }),
    ChartSpec::Pie(PieSpec {
        metric: PURCHASES,
        title: "Control Vs Test: Purchases",
        label_prefix: "Purchases Made by",
    }),
    ChartSpec::Scatter(ScatterSpec {
        x: CONTENT_VIEWED,
        y: WEBSITE_CLICKS,
        size: WEBSITE_CLICKS,
    }),
    ChartSpec::Scatter(ScatterSpec {
        x: PURCHASES,
        y: ADDED_TO_CART,
        size: PURCHASES,
    }),
];
