use statrs::statistics::Statistics;

use super::error::StatsError;

pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }
    Ok(values.iter().mean())
}

/// Population standard deviation (no Bessel correction)
pub fn std_dev(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }
    Ok(values.iter().population_std_dev())
}

pub fn min_max(values: &[f64]) -> Result<(f64, f64), StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }
    Ok(values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        }))
}

/// Percentile with linear interpolation between the closest ranks
pub fn percentile(values: &[f64], p: f64) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(StatsError::BadPercentile(p));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let position = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Interquartile range
pub fn iqr(values: &[f64]) -> Result<f64, StatsError> {
    Ok(percentile(values, 75.0)? - percentile(values, 25.0)?)
}

/// Number of bins by the Freedman-Diaconis rule: bin width 2 IQR / n^(1/3).
/// Never less than one bin.
pub fn freedman_diaconis_bins(values: &[f64]) -> Result<usize, StatsError> {
    let width = 2.0 * iqr(values)? / (values.len() as f64).cbrt();
    let (lo, hi) = min_max(values)?;
    if width <= 0.0 || hi <= lo {
        return Ok(1);
    }
    Ok(((hi - lo) / width).floor().max(1.0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values).unwrap() - 5.0).abs() < 1e-12);
        assert!((std_dev(&values).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(std_dev(&[3.0]).unwrap(), 0.0);
        assert!(matches!(mean(&[]), Err(StatsError::EmptySample)));
        assert!(matches!(std_dev(&[]), Err(StatsError::EmptySample)));
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&values, 100.0).unwrap(), 4.0);
        assert_eq!(percentile(&values, 25.0).unwrap(), 1.75);
        assert_eq!(percentile(&values, 75.0).unwrap(), 3.25);
        assert_eq!(iqr(&values).unwrap(), 1.5);
        assert!(percentile(&values, 101.0).is_err());
    }

    #[test]
    fn test_freedman_diaconis() {
        // 0..8: IQR = 5.25 - 1.75 = 3.5, h = 2 * 3.5 / 2 = 3.5, range 7 -> 2 bins
        let values: Vec<f64> = (0..8).map(|v| v as f64).collect();
        assert_eq!(freedman_diaconis_bins(&values).unwrap(), 2);
        // 0..64: IQR = 47.25 - 15.75 = 31.5, h = 63 / 4 = 15.75, range 63 -> 4 bins
        let values: Vec<f64> = (0..64).map(|v| v as f64).collect();
        assert_eq!(freedman_diaconis_bins(&values).unwrap(), 4);
    }

    #[test]
    fn test_freedman_diaconis_degenerate() {
        assert_eq!(freedman_diaconis_bins(&[3.0; 20]).unwrap(), 1);
        // Zero IQR but a non-zero range still yields one bin
        let mut values = vec![5.0; 99];
        values.push(100.0);
        assert_eq!(freedman_diaconis_bins(&values).unwrap(), 1);
    }
}
