//! Aggregate statistics helpers
//!
//! Shared by metric summaries and research-data analysis. All helpers
//! return `None` on empty input so callers can omit sections instead of
//! zero-filling them.

/// Arithmetic mean of the samples
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation of the samples
///
/// Divides by `n`, not `n - 1`: summaries describe exactly the retained
/// window, they do not estimate a larger population.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Smallest non-NaN sample, `None` when there is none
pub fn minimum(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
}

/// Largest non-NaN sample, `None` when there is none
pub fn maximum(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_std_dev(&[]), None);
        assert_eq!(minimum(&[]), None);
        assert_eq!(maximum(&[]), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[2.0, 4.0, 6.0]), Some(4.0));
    }

    #[test]
    fn test_population_std_dev_reference_fixture() {
        // Classic population-σ fixture: mean 5.0, σ exactly 2.0.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sigma = population_std_dev(&values).unwrap();
        assert!((sigma - 2.0).abs() < 1e-12, "σ was {}", sigma);
    }

    #[test]
    fn test_std_dev_single_sample_is_zero() {
        assert_eq!(population_std_dev(&[3.5]), Some(0.0));
    }

    #[test]
    fn test_extrema_ignore_nan() {
        let values = [3.0, f64::NAN, 1.0, 2.0];
        assert_eq!(minimum(&values), Some(1.0));
        assert_eq!(maximum(&values), Some(3.0));
        assert_eq!(minimum(&[f64::NAN]), None);
    }
}
