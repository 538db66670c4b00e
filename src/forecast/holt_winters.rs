//! ETS(A,A,A): additive Holt-Winters fitted by least squares.
//!
//! Every observation updates a level, a trend and the seasonal offset for
//! its position in the cycle, each by a fixed share of the one-step error.
//! The three shares and the starting state (level, trend and one offset per
//! season position, offsets summing to zero) are all estimated by
//! minimising the in-sample squared one-step error.

use tracing::debug;

use crate::error::ForecastError;
use crate::forecast::Forecaster;
use crate::vintage::LatestSeries;

const GRID: [f64; 9] = [0.05, 0.15, 0.25, 0.35, 0.5, 0.65, 0.75, 0.85, 0.95];
const PARAM_MIN: f64 = 1e-3;
const PARAM_MAX: f64 = 1.0 - 1e-3;
const REFINE_ROUNDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl SmoothingParams {
    fn get(&self, i: usize) -> f64 {
        match i {
            0 => self.alpha,
            1 => self.beta,
            _ => self.gamma,
        }
    }

    fn with(mut self, i: usize, v: f64) -> Self {
        let v = v.clamp(PARAM_MIN, PARAM_MAX);
        match i {
            0 => self.alpha = v,
            1 => self.beta = v,
            _ => self.gamma = v,
        }
        self
    }
}

/// State just before the first observation.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    pub level: f64,
    pub trend: f64,
    /// One offset per season position, summing to zero.
    pub seasonal: Vec<f64>,
}

impl InitialState {
    /// Starting guess: a line through the means of the first two seasons,
    /// offsets from the averaged residuals around it. Needs two full seasons.
    pub fn heuristic(data: &[f64], period: usize) -> Option<Self> {
        let m = period;
        if m < 2 || data.len() < 2 * m {
            return None;
        }
        let mean1 = data[..m].iter().sum::<f64>() / m as f64;
        let mean2 = data[m..2 * m].iter().sum::<f64>() / m as f64;
        let slope = (mean2 - mean1) / m as f64;
        let centre = (m as f64 - 1.0) / 2.0;
        let line = |t: f64| mean1 + slope * (t - centre);

        let seasonal = (0..m)
            .map(|i| ((data[i] - line(i as f64)) + (data[m + i] - line((m + i) as f64))) / 2.0)
            .collect();
        Some(
            Self {
                level: line(-1.0),
                trend: slope,
                seasonal,
            }
            .centred(),
        )
    }

    fn centred(mut self) -> Self {
        let mean = self.seasonal.iter().sum::<f64>() / self.seasonal.len() as f64;
        self.seasonal.iter_mut().for_each(|s| *s -= mean);
        self
    }

    fn dims(&self) -> usize {
        2 + self.seasonal.len()
    }

    fn get(&self, i: usize) -> f64 {
        match i {
            0 => self.level,
            1 => self.trend,
            _ => self.seasonal[i - 2],
        }
    }

    fn with(&self, i: usize, v: f64) -> Self {
        let mut next = self.clone();
        match i {
            0 => next.level = v,
            1 => next.trend = v,
            _ => next.seasonal[i - 2] = v,
        }
        next.centred()
    }
}

/// End state of a smoothing pass.
#[derive(Debug, Clone)]
pub struct HoltWintersFit {
    pub params: SmoothingParams,
    pub initial: InitialState,
    pub level: f64,
    pub trend: f64,
    /// Initial offsets followed by one updated offset per observation.
    pub seasonal: Vec<f64>,
    pub sse: f64,
}

impl HoltWintersFit {
    /// Forecast `h` steps ahead (1-indexed).
    pub fn forecast(&self, h: usize) -> f64 {
        let m = self.initial.seasonal.len();
        let idx = self.seasonal.len() - m + ((h - 1) % m);
        self.level + h as f64 * self.trend + self.seasonal[idx]
    }
}

/// One smoothing pass over every observation from `initial`.
pub fn smooth(data: &[f64], params: SmoothingParams, initial: &InitialState) -> Option<HoltWintersFit> {
    let m = initial.seasonal.len();
    if m < 2 || data.is_empty() {
        return None;
    }

    let SmoothingParams { alpha, beta, gamma } = params;
    let mut seasonal = Vec::with_capacity(m + data.len());
    seasonal.extend_from_slice(&initial.seasonal);
    let (mut level, mut trend) = (initial.level, initial.trend);
    let mut sse = 0.0;
    for (t, &x) in data.iter().enumerate() {
        // seasonal[t] is the offset from one cycle back
        let s_prev = seasonal[t];
        sse += (x - (level + trend + s_prev)).powi(2);

        let l = alpha * (x - s_prev) + (1.0 - alpha) * (level + trend);
        trend = beta * (l - level) + (1.0 - beta) * trend;
        seasonal.push(gamma * (x - l) + (1.0 - gamma) * s_prev);
        level = l;
    }

    Some(HoltWintersFit {
        params,
        initial: initial.clone(),
        level,
        trend,
        seasonal,
        sse,
    })
}

fn keep_better(best: &mut Option<HoltWintersFit>, candidate: Option<HoltWintersFit>) {
    if let Some(c) = candidate.filter(|c| c.sse.is_finite()) {
        if best.as_ref().map_or(true, |b| c.sse < b.sse) {
            *best = Some(c);
        }
    }
}

/// Grid search over the smoothing weights from the heuristic state, then
/// alternating coordinate refinement of the weights and the initial state
/// with shrinking steps.
pub fn fit(data: &[f64], period: usize) -> Option<HoltWintersFit> {
    let start = InitialState::heuristic(data, period)?;
    let mut best = None;
    for &alpha in &GRID {
        for &beta in &GRID {
            for &gamma in &GRID {
                keep_better(&mut best, smooth(data, SmoothingParams { alpha, beta, gamma }, &start));
            }
        }
    }

    let (lo, hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    let mut state_step = 0.05 * (hi - lo).max(1e-6);
    let mut step = 0.05;
    for _ in 0..REFINE_ROUNDS {
        for i in 0..3 {
            let current = best.as_ref()?;
            let (params, initial) = (current.params, current.initial.clone());
            for delta in [-step, step] {
                keep_better(&mut best, smooth(data, params.with(i, params.get(i) + delta), &initial));
            }
        }
        for i in 0..start.dims() {
            let current = best.as_ref()?;
            let (params, initial) = (current.params, current.initial.clone());
            let d = if i == 1 { state_step / period as f64 } else { state_step };
            for delta in [-d, d] {
                keep_better(&mut best, smooth(data, params, &initial.with(i, initial.get(i) + delta)));
            }
        }
        step /= 2.0;
        state_step /= 2.0;
    }
    best
}

/// ETS(A,A,A) forecaster.
#[derive(Debug, Clone, Copy)]
pub struct Ets {
    period: usize,
}

impl Ets {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Default for Ets {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Forecaster for Ets {
    fn name(&self) -> &str {
        "ETS"
    }

    fn forecast(&self, y: &LatestSeries, horizon: usize) -> Result<Vec<f64>, ForecastError> {
        let required = 2 * self.period;
        if y.len() < required {
            return Err(ForecastError::InsufficientData {
                method: self.name().to_string(),
                required,
                actual: y.len(),
            });
        }

        let fitted = fit(&y.values, self.period).ok_or_else(|| ForecastError::ModelFit {
            method: self.name().to_string(),
            reason: "no parameter set produced a finite in-sample error".to_string(),
        })?;
        debug!(params = ?fitted.params, initial_level = fitted.initial.level, sse = fitted.sse, "ETS fitted");

        let out: Vec<f64> = (1..=horizon)
            .map(|h| fitted.forecast(h))
            .collect();
        if out.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit {
                method: self.name().to_string(),
                reason: "forecast diverged".to_string(),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// 100 + 2t with a fixed monthly pattern.
    fn seasonal_data(n: usize) -> Vec<f64> {
        let pattern = [10.0, -5.0, -5.0, 0.0, 3.0, -3.0, 8.0, -8.0, 2.0, -2.0, 4.0, -4.0];
        (0..n).map(|t| 100.0 + 2.0 * t as f64 + pattern[t % 12]).collect()
    }

    fn series(values: Vec<f64>) -> LatestSeries {
        LatestSeries::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), values)
    }

    #[test]
    fn heuristic_needs_two_seasons() {
        assert!(InitialState::heuristic(&[1.0; 23], 12).is_none());
        let init = InitialState::heuristic(&[1.0; 24], 12).unwrap();
        assert_eq!(init.level, 1.0);
        assert_eq!(init.seasonal.len(), 12);
    }

    #[test]
    fn constant_series_forecasts_constant() {
        let fc = Ets::default().forecast(&series(vec![50.0; 36]), 6).unwrap();
        assert_eq!(fc.len(), 6);
        for v in fc {
            assert!((v - 50.0).abs() < 1e-6, "{v}");
        }
    }

    #[test]
    fn trend_and_season_are_continued() {
        let data = seasonal_data(48);
        let fc = Ets::default().forecast(&series(data), 12).unwrap();
        let truth = seasonal_data(60);
        for (h, v) in fc.iter().enumerate() {
            let expected = truth[48 + h];
            assert!((v - expected).abs() < 5.0, "h={} got {v} expected {expected}", h + 1);
        }
    }

    #[test]
    fn fit_improves_on_grid_start() {
        let data = seasonal_data(36);
        let best = fit(&data, 12).unwrap();
        let start = InitialState::heuristic(&data, 12).unwrap();
        let naive = smooth(
            &data,
            SmoothingParams {
                alpha: 0.5,
                beta: 0.5,
                gamma: 0.5,
            },
            &start,
        )
        .unwrap();
        assert!(best.sse <= naive.sse);
        assert!(best.params.alpha > 0.0 && best.params.alpha < 1.0);
    }

    #[test]
    fn initial_state_is_estimated_not_fixed() {
        // shocks in the first two seasons skew the starting guess
        let mut data = seasonal_data(36);
        data[0] += 40.0;
        data[13] -= 25.0;
        let start = InitialState::heuristic(&data, 12).unwrap();

        let mut grid_best = f64::INFINITY;
        for &alpha in &GRID {
            for &beta in &GRID {
                for &gamma in &GRID {
                    let p = SmoothingParams { alpha, beta, gamma };
                    grid_best = grid_best.min(smooth(&data, p, &start).unwrap().sse);
                }
            }
        }

        let best = fit(&data, 12).unwrap();
        assert_ne!(best.initial, start);
        assert!(best.sse < grid_best, "{} vs {}", best.sse, grid_best);
        assert!(best.initial.seasonal.iter().sum::<f64>().abs() < 1e-9);
    }

    #[test]
    fn short_history_is_insufficient() {
        let err = Ets::default().forecast(&series(vec![1.0; 20]), 12).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                required: 24,
                actual: 20,
                ..
            }
        ));
    }
}
