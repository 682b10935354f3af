//! Descriptive statistics shared by the detectors and the forecast models

use crate::errors::{PredictError, Result};

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, `None` for an empty slice
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Least-squares slope with the sample index as x.
///
/// `m = (n·Σxy − Σx·Σy) / (n·Σx² − (Σx)²)`, using the closed forms
/// `Σx = n(n−1)/2` and `Σx² = n(n−1)(2n−1)/6`. Needs at least two points.
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let sum_x = n_f * (n_f - 1.0) / 2.0;
    let sum_xx = n_f * (n_f - 1.0) * (2.0 * n_f - 1.0) / 6.0;
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values
        .iter()
        .enumerate()
        .map(|(x, y)| x as f64 * y)
        .sum();

    Some((n_f * sum_xy - sum_x * sum_y) / (n_f * sum_xx - sum_x * sum_x))
}

/// Ratio of the spread of per-phase averages to their mean.
///
/// Samples are bucketed by `index % period`; each bucket is averaged and the
/// population standard deviation of those averages is divided by their mean.
/// A zero mean yields 0.
pub fn seasonal_strength(values: &[f64], period: usize) -> f64 {
    if period == 0 {
        return 0.0;
    }

    let phase_averages: Vec<f64> = (0..period)
        .filter_map(|phase| {
            let bucket: Vec<f64> = values.iter().skip(phase).step_by(period).copied().collect();
            mean(&bucket)
        })
        .collect();

    let (Some(mu), Some(sigma)) = (mean(&phase_averages), std_dev(&phase_averages)) else {
        return 0.0;
    };

    if mu == 0.0 {
        0.0
    } else {
        sigma / mu
    }
}

/// Reject NaN and infinite samples
pub fn ensure_finite(values: &[f64], operation: &str) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(PredictError::Validation(format!(
            "{} received a non-finite value at index {}",
            operation, index
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(std_dev(&[2.0, 4.0]), Some(1.0));
        assert_eq!(std_dev(&[5.0, 5.0, 5.0]), Some(0.0));
    }

    #[test]
    fn test_slope_of_unit_ramp() {
        let slope = linear_slope(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((slope - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_slope_needs_two_points() {
        assert!(linear_slope(&[]).is_none());
        assert!(linear_slope(&[3.0]).is_none());
        assert!((linear_slope(&[3.0, 1.0]).unwrap() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_seasonal_strength_flat_series_is_zero() {
        let flat = vec![10.0; 24];
        assert_eq!(seasonal_strength(&flat, 12), 0.0);
    }

    #[test]
    fn test_seasonal_strength_zero_mean() {
        let values: Vec<f64> = (0..24).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert_eq!(seasonal_strength(&values, 12), 0.0);
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(&[1.0, 2.0], "test").is_ok());
        let err = ensure_finite(&[1.0, f64::NAN], "test").unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }
}
