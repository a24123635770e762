//! Data Cleaner Module
//! Null inspection and mean imputation for campaign tables.

use crate::data::loader::CampaignTable;
use crate::data::schema::IMPUTED_COLUMNS;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

/// Per-column null counts, in column order.
pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect()
}

/// Total number of nulls across the named columns.
pub fn missing_in(df: &DataFrame, columns: &[&str]) -> usize {
    columns
        .iter()
        .filter_map(|name| df.column(name).ok())
        .map(|col| col.null_count())
        .sum()
}

/// Replace nulls in each column with the mean of that column's non-null values.
///
/// Means are computed per column of `df` only. A column with no non-null
/// value has no mean and is left untouched.
pub fn fill_missing_with_mean(df: &DataFrame, columns: &[&str]) -> Result<DataFrame, CleanerError> {
    let mut fills: Vec<Expr> = Vec::with_capacity(columns.len());

    for name in columns {
        let column = df
            .column(name)
            .map_err(|_| CleanerError::UnknownColumn(name.to_string()))?;

        let missing = column.null_count();
        if missing == 0 {
            continue;
        }
        if missing == column.len() {
            tracing::warn!(column = %name, "Column has no values; mean imputation skipped");
            continue;
        }

        tracing::debug!(column = %name, missing, "Filling missing values with column mean");
        fills.push(col(*name).fill_null(col(*name).mean()));
    }

    if fills.is_empty() {
        return Ok(df.clone());
    }

    let filled = df.clone().lazy().with_columns(fills).collect()?;
    Ok(filled)
}

/// Clean both campaign tables.
///
/// The control table is always imputed. The test table is only imputed when
/// `impute_test` is set; otherwise its nulls are carried into the merged
/// table and skipped by the per-campaign sums.
pub fn clean_tables(
    control: &mut CampaignTable,
    test: &mut CampaignTable,
    impute_test: bool,
) -> Result<(), CleanerError> {
    control.df = fill_missing_with_mean(&control.df, &IMPUTED_COLUMNS)?;
    tracing::info!(
        campaign = %control.name,
        remaining_nulls = missing_in(&control.df, &IMPUTED_COLUMNS),
        "Cleaned control table"
    );

    if impute_test {
        test.df = fill_missing_with_mean(&test.df, &IMPUTED_COLUMNS)?;
        tracing::info!(campaign = %test.name, "Cleaned test table");
    } else {
        let untouched: Vec<&str> = IMPUTED_COLUMNS
            .iter()
            .copied()
            .filter(|name| missing_in(&test.df, &[name]) > 0)
            .collect();
        if !untouched.is_empty() {
            tracing::warn!(
                campaign = %test.name,
                columns = ?untouched,
                "Test table has missing values that are not imputed; its totals skip them"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{Arm, WEBSITE_CLICKS};
    use proptest::prelude::*;

    fn clicks_frame(values: &[Option<f64>]) -> DataFrame {
        DataFrame::new(vec![Column::new(WEBSITE_CLICKS.into(), values.to_vec())]).unwrap()
    }

    fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_fill_missing_with_mean_example() {
        let df = clicks_frame(&[Some(10.0), Some(20.0), None]);
        let filled = fill_missing_with_mean(&df, &[WEBSITE_CLICKS]).unwrap();

        assert_eq!(
            values(&filled, WEBSITE_CLICKS),
            vec![Some(10.0), Some(20.0), Some(15.0)]
        );
        let sum: f64 = values(&filled, WEBSITE_CLICKS).into_iter().flatten().sum();
        assert_eq!(sum, 45.0);
    }

    #[test]
    fn test_fill_is_noop_on_clean_column() {
        let df = clicks_frame(&[Some(1.0), Some(2.0), Some(4.0)]);
        let filled = fill_missing_with_mean(&df, &[WEBSITE_CLICKS]).unwrap();
        assert!(filled.equals_missing(&df));
    }

    #[test]
    fn test_fill_skips_all_null_column() {
        let df = clicks_frame(&[None, None]);
        let filled = fill_missing_with_mean(&df, &[WEBSITE_CLICKS]).unwrap();
        assert_eq!(filled.column(WEBSITE_CLICKS).unwrap().null_count(), 2);
    }

    #[test]
    fn test_fill_unknown_column() {
        let df = clicks_frame(&[Some(1.0)]);
        let result = fill_missing_with_mean(&df, &["Nope"]);
        assert!(matches!(result, Err(CleanerError::UnknownColumn(name)) if name == "Nope"));
    }

    #[test]
    fn test_null_counts() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), [Some(1.0), None]),
            Column::new("b".into(), [Some(1.0), Some(2.0)]),
        ])
        .unwrap();
        assert_eq!(
            null_counts(&df),
            vec![("a".to_string(), 1), ("b".to_string(), 0)]
        );
    }

    fn table(arm: Arm, clicks: &[Option<f64>]) -> CampaignTable {
        let mut columns = vec![Column::new(WEBSITE_CLICKS.into(), clicks.to_vec())];
        for name in IMPUTED_COLUMNS.iter().filter(|n| **n != WEBSITE_CLICKS) {
            columns.push(Column::new((*name).into(), vec![Some(1.0); clicks.len()]));
        }
        CampaignTable {
            arm,
            name: arm.default_name().to_string(),
            path: Default::default(),
            df: DataFrame::new(columns).unwrap(),
        }
    }

    #[test]
    fn test_clean_tables_leaves_test_nulls_by_default() {
        let mut control = table(Arm::Control, &[Some(2.0), None]);
        let mut test = table(Arm::Test, &[Some(4.0), None]);

        clean_tables(&mut control, &mut test, false).unwrap();

        assert_eq!(missing_in(&control.df, &IMPUTED_COLUMNS), 0);
        assert_eq!(missing_in(&test.df, &IMPUTED_COLUMNS), 1);
    }

    #[test]
    fn test_clean_tables_imputes_test_when_enabled() {
        let mut control = table(Arm::Control, &[Some(2.0), None]);
        let mut test = table(Arm::Test, &[Some(4.0), None]);

        clean_tables(&mut control, &mut test, true).unwrap();

        assert_eq!(missing_in(&test.df, &IMPUTED_COLUMNS), 0);
        assert_eq!(values(&test.df, WEBSITE_CLICKS), vec![Some(4.0), Some(4.0)]);
        assert_eq!(values(&control.df, WEBSITE_CLICKS), vec![Some(2.0), Some(2.0)]);
    }

    proptest! {
        #[test]
        fn prop_fill_leaves_no_nulls_and_keeps_mean(
            present in prop::collection::vec(-1.0e6f64..1.0e6, 1..40),
            holes in prop::collection::vec(any::<bool>(), 0..40),
        ) {
            let mut column: Vec<Option<f64>> = present.iter().copied().map(Some).collect();
            for (i, hole) in holes.iter().enumerate() {
                if *hole {
                    column.insert(i.min(column.len()), None);
                }
            }
            let expected = present.iter().sum::<f64>() / present.len() as f64;

            let filled = fill_missing_with_mean(&clicks_frame(&column), &[WEBSITE_CLICKS]).unwrap();
            let out = values(&filled, WEBSITE_CLICKS);

            prop_assert_eq!(filled.column(WEBSITE_CLICKS).unwrap().null_count(), 0);
            let tolerance = 1e-6 * expected.abs().max(1.0);
            for (before, after) in column.iter().zip(out.iter()) {
                match before {
                    Some(v) => prop_assert_eq!(Some(*v), *after),
                    None => prop_assert!((after.unwrap() - expected).abs() <= tolerance),
                }
            }

            let again = fill_missing_with_mean(&filled, &[WEBSITE_CLICKS]).unwrap();
            prop_assert!(again.equals_missing(&filled));
        }
    }
}
