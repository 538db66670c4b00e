use crate::error::ForecastError;
use crate::forecast::Forecaster;
use crate::vintage::LatestSeries;

/// Repeats the last full season forward. No parameters, no fitting.
#[derive(Debug, Clone, Copy)]
pub struct SeasonalNaive {
    period: usize,
}

impl SeasonalNaive {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Default for SeasonalNaive {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Forecaster for SeasonalNaive {
    fn name(&self) -> &str {
        "Seasonal Naive"
    }

    fn forecast(&self, y: &LatestSeries, horizon: usize) -> Result<Vec<f64>, ForecastError> {
        let n = y.len();
        if n < self.period || self.period == 0 {
            return Err(ForecastError::InsufficientData {
                method: self.name().to_string(),
                required: self.period.max(1),
                actual: n,
            });
        }
        let last_season = &y.values[n - self.period..];
        Ok(last_season.iter().copied().cycle().take(horizon).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(n: usize) -> LatestSeries {
        LatestSeries::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            (0..n).map(|i| i as f64).collect(),
        )
    }

    #[test]
    fn tiles_last_twelve_values() {
        let y = series(15);
        let fc = SeasonalNaive::default().forecast(&y, 27).unwrap();
        assert_eq!(fc.len(), 27);
        assert_eq!(fc[0], 3.0);
        assert_eq!(fc[11], 14.0);
        assert_eq!(fc[12], 3.0);
        assert_eq!(fc[26], 5.0);
    }

    #[test]
    fn short_horizon_is_truncated() {
        let fc = SeasonalNaive::default().forecast(&series(12), 5).unwrap();
        assert_eq!(fc, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(SeasonalNaive::default().forecast(&series(12), 0).unwrap().is_empty());
    }

    #[test]
    fn eleven_observations_are_not_enough() {
        let err = SeasonalNaive::default().forecast(&series(11), 12).unwrap_err();
        assert_eq!(
            err,
            ForecastError::InsufficientData {
                method: "Seasonal Naive".to_string(),
                required: 12,
                actual: 11
            }
        );
    }
}
