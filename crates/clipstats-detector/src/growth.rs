//! Growth-rate math shared by the detection rules.

/// Percentage growth from `prev` to `curr`.
///
/// A zero baseline is special-cased: any growth from zero is infinite, and
/// zero-to-zero is flat.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn growth_rate(prev: u64, curr: u64) -> f64 {
    if prev == 0 {
        if curr > 0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        ((curr as f64 - prev as f64) / prev as f64) * 100.0
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population standard deviation.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn std_dev(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let m = mean(samples);
    let variance = samples.iter().map(|s| (s - m).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_to_zero_is_flat() {
        assert_eq!(growth_rate(0, 0), 0.0);
    }

    #[test]
    fn zero_to_positive_is_infinite() {
        assert!(growth_rate(0, 5).is_infinite());
    }

    #[test]
    fn fifty_percent_growth() {
        assert!((growth_rate(100, 150) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shrinkage_is_negative() {
        assert!((growth_rate(200, 100) - (-50.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn std_dev_of_constant_series_is_zero() {
        assert_eq!(std_dev(&[10.0, 10.0, 10.0]), 0.0);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }
}
