//! Campaign table schema.
//! Fixed positional column labels shared by both campaign files.

pub const CAMPAIGN_NAME: &str = "Campaign Name";
pub const DATE: &str = "Date";
pub const AMOUNT_SPENT: &str = "Amount Spent";
pub const IMPRESSIONS: &str = "Number of Impressions";
pub const REACH: &str = "Reach";
pub const WEBSITE_CLICKS: &str = "Website Clicks";
pub const SEARCHES_RECEIVED: &str = "Searches Received";
pub const CONTENT_VIEWED: &str = "Content Viewed";
pub const ADDED_TO_CART: &str = "Added to Cart";
pub const PURCHASES: &str = "Purchases";

/// Column labels in file order. Input files are renamed positionally.
pub const COLUMN_LABELS: [&str; 10] = [
    CAMPAIGN_NAME,
    DATE,
    AMOUNT_SPENT,
    IMPRESSIONS,
    REACH,
    WEBSITE_CLICKS,
    SEARCHES_RECEIVED,
    CONTENT_VIEWED,
    ADDED_TO_CART,
    PURCHASES,
];

/// All numeric columns (cast to Float64 on load).
pub const NUMERIC_COLUMNS: [&str; 8] = [
    AMOUNT_SPENT,
    IMPRESSIONS,
    REACH,
    WEBSITE_CLICKS,
    SEARCHES_RECEIVED,
    CONTENT_VIEWED,
    ADDED_TO_CART,
    PURCHASES,
];

/// Columns whose missing values are replaced by the column mean.
pub const IMPUTED_COLUMNS: [&str; 7] = [
    IMPRESSIONS,
    REACH,
    WEBSITE_CLICKS,
    SEARCHES_RECEIVED,
    CONTENT_VIEWED,
    ADDED_TO_CART,
    PURCHASES,
];

/// Default campaign names, used when a table carries no name value.
pub const CONTROL_CAMPAIGN: &str = "Control Campaign";
pub const TEST_CAMPAIGN: &str = "Test Campaign";

/// Which arm of the experiment a table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Arm {
    Control,
    Test,
}

impl Arm {
    pub fn default_name(self) -> &'static str {
        match self {
            Arm::Control => CONTROL_CAMPAIGN,
            Arm::Test => TEST_CAMPAIGN,
        }
    }
}

impl std::fmt::Display for Arm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arm::Control => write!(f, "control"),
            Arm::Test => write!(f, "test"),
        }
    }
}
