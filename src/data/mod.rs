//! Data module - CSV loading, cleaning and merging

mod cleaner;
mod loader;
mod merger;
pub mod schema;

pub use cleaner::{clean_tables, fill_missing_with_mean, missing_in, null_counts, CleanerError};
pub use loader::{campaign_label, parse_date, CampaignLoader, CampaignTable, LoaderError};
pub use merger::{campaign_counts, date_ordinals, merge_campaigns, MergerError};
pub use schema::Arm;
