//! Table Merger Module
//! Unions the two cleaned campaign tables into one date-ordered table.

use crate::data::schema::{CAMPAIGN_NAME, DATE};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Campaign tables have different schemas: {control:?} vs {test:?}")]
    SchemaMismatch {
        control: Vec<String>,
        test: Vec<String>,
    },
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Concatenate the control and test tables and sort by date.
///
/// Rows are never deduplicated. The sort is stable, so on equal dates the
/// control rows come before the test rows.
pub fn merge_campaigns(control: &DataFrame, test: &DataFrame) -> Result<DataFrame, MergerError> {
    let (control_cols, test_cols) = (column_names(control), column_names(test));
    if control_cols != test_cols {
        return Err(MergerError::SchemaMismatch {
            control: control_cols,
            test: test_cols,
        });
    }

    let merged = concat(
        [control.clone().lazy(), test.clone().lazy()],
        UnionArgs::default(),
    )?
    .sort([DATE], SortMultipleOptions::default().with_maintain_order(true))
    .collect()?;

    tracing::info!(
        control_rows = control.height(),
        test_rows = test.height(),
        merged_rows = merged.height(),
        "Merged campaign tables"
    );
    Ok(merged)
}

/// Number of rows per campaign name, sorted by name.
pub fn campaign_counts(df: &DataFrame) -> Result<Vec<(String, usize)>, MergerError> {
    let counts = df
        .clone()
        .lazy()
        .group_by([col(CAMPAIGN_NAME)])
        .agg([len().alias("count")])
        .sort([CAMPAIGN_NAME], SortMultipleOptions::default())
        .collect()?;

    let names = counts.column(CAMPAIGN_NAME)?.cast(&DataType::String)?;
    let totals = counts.column("count")?.cast(&DataType::UInt64)?;

    let result = names
        .str()?
        .into_iter()
        .zip(totals.u64()?.into_iter())
        .map(|(name, count)| {
            (
                name.unwrap_or_default().to_string(),
                count.unwrap_or_default() as usize,
            )
        })
        .collect();
    Ok(result)
}

/// Days since the Unix epoch for each row's date, in row order.
pub fn date_ordinals(df: &DataFrame) -> Result<Vec<Option<i32>>, MergerError> {
    let days = df.column(DATE)?.cast(&DataType::Int32)?;
    let result = days.i32()?.into_iter().collect();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame(campaign: &str, days: &[u32], clicks: &[f64]) -> DataFrame {
        let dates: Vec<NaiveDate> = days
            .iter()
            .map(|d| NaiveDate::from_ymd_opt(2019, 8, *d).unwrap())
            .collect();
        DataFrame::new(vec![
            Column::new(CAMPAIGN_NAME.into(), vec![campaign; days.len()]),
            Column::new(DATE.into(), dates),
            Column::new("Website Clicks".into(), clicks.to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn test_merge_keeps_every_row() {
        let control = frame("Control Campaign", &[3, 1, 2], &[1.0, 2.0, 3.0]);
        let test = frame("Test Campaign", &[2, 3], &[4.0, 5.0]);

        let merged = merge_campaigns(&control, &test).unwrap();
        assert_eq!(merged.height(), 5);
    }

    #[test]
    fn test_merge_sorts_by_date() {
        let control = frame("Control Campaign", &[10, 2, 30], &[1.0, 2.0, 3.0]);
        let test = frame("Test Campaign", &[9, 1], &[4.0, 5.0]);

        let merged = merge_campaigns(&control, &test).unwrap();
        let days = date_ordinals(&merged).unwrap();

        assert!(days.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_merge_is_stable_for_equal_dates() {
        let control = frame("Control Campaign", &[1], &[1.0]);
        let test = frame("Test Campaign", &[1], &[2.0]);

        let merged = merge_campaigns(&control, &test).unwrap();
        let names: Vec<Option<&str>> = merged
            .column(CAMPAIGN_NAME)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(names, vec![Some("Control Campaign"), Some("Test Campaign")]);
    }

    #[test]
    fn test_merge_rejects_schema_mismatch() {
        let control = frame("Control Campaign", &[1], &[1.0]);
        let test = control.drop("Website Clicks").unwrap();

        let result = merge_campaigns(&control, &test);
        assert!(matches!(result, Err(MergerError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_campaign_counts() {
        let control = frame("Control Campaign", &[1, 2, 3], &[1.0, 2.0, 3.0]);
        let test = frame("Test Campaign", &[1, 2], &[4.0, 5.0]);
        let merged = merge_campaigns(&control, &test).unwrap();

        assert_eq!(
            campaign_counts(&merged).unwrap(),
            vec![
                ("Control Campaign".to_string(), 3),
                ("Test Campaign".to_string(), 2)
            ]
        );
    }
}
