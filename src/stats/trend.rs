//! Ordinary least squares trend lines for the scatter charts.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Fitted line `y = slope * x + intercept` over `[x_min, x_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl TrendLine {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// End points of the line across the fitted x range.
    pub fn endpoints(&self) -> [(f64, f64); 2] {
        [
            (self.x_min, self.predict(self.x_min)),
            (self.x_max, self.predict(self.x_max)),
        ]
    }
}

/// Fit y on x. Pairs with a non-finite coordinate are ignored.
///
/// Returns `None` with fewer than two usable points or when x has no spread.
pub fn fit_trend(xs: &[f64], ys: &[f64]) -> Option<TrendLine> {
    let (x, y): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .unzip();

    if x.len() < 2 {
        return None;
    }

    let var_x = x.iter().variance();
    if var_x.is_nan() || var_x <= 0.0 {
        return None;
    }
    let var_y = y.iter().variance();
    let cov = x.iter().covariance(y.iter());

    let slope = cov / var_x;
    let intercept = y.iter().mean() - slope * x.iter().mean();
    let r_squared = if var_y > 0.0 {
        (cov * cov) / (var_x * var_y)
    } else {
        1.0
    };

    Some(TrendLine {
        slope,
        intercept,
        r_squared,
        x_min: x.iter().copied().fold(f64::INFINITY, f64::min),
        x_max: x.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fit_exact_line() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [5.0, 7.0, 9.0, 11.0];
        let fit = fit_trend(&xs, &ys).unwrap();

        assert!(close(fit.slope, 2.0));
        assert!(close(fit.intercept, 3.0));
        assert!(close(fit.r_squared, 1.0));
        assert_eq!(fit.x_min, 1.0);
        assert_eq!(fit.x_max, 4.0);
        assert!(close(fit.predict(10.0), 23.0));
    }

    #[test]
    fn test_fit_noisy_line() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 2.0, 1.0];
        let fit = fit_trend(&xs, &ys).unwrap();

        assert!(close(fit.slope, 0.5));
        assert!(close(fit.intercept, 0.5));
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
    }

    #[test]
    fn test_fit_ignores_nan_pairs() {
        let xs = [1.0, f64::NAN, 3.0];
        let ys = [1.0, 100.0, 3.0];
        let fit = fit_trend(&xs, &ys).unwrap();
        assert!(close(fit.slope, 1.0));
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        assert!(fit_trend(&[1.0], &[1.0]).is_none());
        assert!(fit_trend(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(fit_trend(&[], &[]).is_none());
    }
}
