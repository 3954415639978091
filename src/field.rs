/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Reference frame generator.
//!
//! Produces the same payloads the forecast backend sends, so the core can be
//! driven end to end without a network:
//!
//! ```text
//! r          = |(x, y, z)|          x, y ∈ [-5, 5] (50 steps), z ∈ [-2, 2] (25 steps)
//! field      = Σ_l (1 + 0.1l) · sin((0.1 + 0.05l) · r + 0.2l) · p · (1 + 0.2 · sin(7.83 · 0.1 · l))
//! points     = max(1, ⌊36 · p · ρ · 2⌋) points at (3cos 0.5l, 3sin 0.5l, sin 0.2l)
//! overlap    = min(100 · p · ρ · 1.5, 100), one decimal
//! alertLevel = backend hint table (HIGH > 20, CRITICAL > 40)
//! ```
//!
//! `p` is the day's probability in [0, 1] and `ρ` its resonance factor. Days
//! past the end of the forecast use `p = ρ = 0.1`.

use rand::Rng;

use crate::alert::ThresholdTable;
use crate::error::{ConfigError, FetchError, PayloadError};
use crate::frame::{CymaticFrame, Day, FrameRequest, RawFrame, RawNumber, LAST_DAY};
use crate::view::FrameSource;

/// Resonance factor used when a day reports none (or zero).
pub const DEFAULT_RESONANCE: f64 = 0.5;

/// `(p, ρ)` for days beyond the forecast.
pub const OUT_OF_RANGE_DAY: DailyForecast = DailyForecast { probability: 0.1, resonance_factor: Some(0.1) };

/// One day of the upstream forecast.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailyForecast {
    /// Event probability in [0, 1].
    pub probability: f64,
    /// Resonance factor; `None` or zero means [`DEFAULT_RESONANCE`].
    pub resonance_factor: Option<f64>,
}

impl DailyForecast {
    /// Effective resonance factor.
    pub fn resonance(&self) -> f64 {
        match self.resonance_factor {
            Some(r) if r != 0.0 && r.is_finite() => r,
            _ => DEFAULT_RESONANCE,
        }
    }

    /// Overlap statistic for this day, rounded to one decimal.
    pub fn overlap_percent(&self) -> f64 {
        let raw = (self.probability * 100.0 * self.resonance() * 1.5).min(100.0);
        (raw * 10.0).round() / 10.0
    }
}

/// Grid shape of generated frames.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FieldConfig {
    /// Samples along x and y.
    pub grid_size: usize,
    /// Samples along z (the channel axis).
    pub depth: usize,
    /// Number of superposed wave layers.
    pub layers: usize,
    /// Half-width of the x/y span.
    pub extent: f64,
    /// Half-width of the z span.
    pub depth_extent: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self { grid_size: 50, depth: 25, layers: 36, extent: 5.0, depth_extent: 2.0 }
    }
}

impl FieldConfig {
    /// Every axis needs at least two samples and at least one layer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::OutOfRange { name: "field.grid_size", value: self.grid_size as f64 });
        }
        if self.depth < 2 {
            return Err(ConfigError::OutOfRange { name: "field.depth", value: self.depth as f64 });
        }
        if self.layers == 0 {
            return Err(ConfigError::OutOfRange { name: "field.layers", value: 0.0 });
        }
        for (name, v) in [("field.extent", self.extent), ("field.depth_extent", self.depth_extent)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::OutOfRange { name, value: v });
            }
        }
        Ok(())
    }
}

fn linspace(half: f64, n: usize) -> Vec<f64> {
    let step = 2.0 * half / (n - 1) as f64;
    (0..n).map(|i| -half + i as f64 * step).collect()
}

/// Synthesises frames from a 21-day forecast.
#[derive(Clone, Debug)]
pub struct FieldGenerator {
    config: FieldConfig,
    forecast: Vec<DailyForecast>,
    hint: ThresholdTable,
}

impl FieldGenerator {
    /// Generator over `forecast` (index 0 is day 1).
    pub fn new(config: FieldConfig, forecast: Vec<DailyForecast>) -> Result<Self, ConfigError> {
        config.validate()?;
        if let Some(bad) = forecast.iter().find(|d| !(0.0..=1.0).contains(&d.probability)) {
            return Err(ConfigError::OutOfRange { name: "forecast.probability", value: bad.probability });
        }
        Ok(Self { config, forecast, hint: ThresholdTable::backend_hint() })
    }

    /// Random forecast of `LAST_DAY` days, for demos.
    pub fn random_forecast<R: Rng + ?Sized>(rng: &mut R) -> Vec<DailyForecast> {
        (0..LAST_DAY)
            .map(|_| DailyForecast {
                probability: rng.gen_range(0.0..=1.0),
                resonance_factor: Some(rng.gen_range(0.1..=1.0)),
            })
            .collect()
    }

    /// The forecast entry used for `day`.
    pub fn day_forecast(&self, day: Day) -> DailyForecast {
        self.forecast.get(day.index()).copied().unwrap_or(OUT_OF_RANGE_DAY)
    }

    /// Payload for `day`, in the backend's wire shape.
    pub fn generate(&self, day: Day) -> RawFrame {
        let c = &self.config;
        let today = self.day_forecast(day);
        let p = today.probability;
        let rho = today.resonance();

        let xs = linspace(c.extent, c.grid_size);
        let zs = linspace(c.depth_extent, c.depth);
        let layers: Vec<(f64, f64, f64)> = (0..c.layers)
            .map(|l| {
                let l = l as f64;
                let modulation = 1.0 + 0.2 * (7.83 * l * 0.1).sin();
                (0.1 + 0.05 * l, 0.2 * l, (1.0 + 0.1 * l) * p * modulation)
            })
            .collect();

        let wave_field = xs
            .iter()
            .map(|&x| {
                xs.iter()
                    .map(|&y| {
                        zs.iter()
                            .map(|&z| {
                                let r = (x * x + y * y + z * z).sqrt();
                                layers
                                    .iter()
                                    .map(|&(freq, phase, gain)| gain * (freq * r + phase).sin())
                                    .sum::<f64>() as f32
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let n_points = ((c.layers as f64 * p * rho * 2.0).floor() as usize).clamp(1, c.layers);
        let phase_lock_points = (0..n_points)
            .map(|l| {
                let l = l as f64;
                vec![3.0 * (l * 0.5).cos(), 3.0 * (l * 0.5).sin(), (l * 0.2).sin(), p]
            })
            .collect();

        let overlap = today.overlap_percent();
        RawFrame {
            wave_field: Some(wave_field),
            phase_lock_points,
            resonance_overlap_percent: Some(RawNumber::Number(overlap)),
            alert_level: Some(self.hint.classify(overlap).label().to_string()),
            day: Some(i64::from(day.get())),
        }
    }

    /// Validated frame for `day`.
    pub fn frame(&self, day: Day) -> Result<CymaticFrame, PayloadError> {
        CymaticFrame::try_from(self.generate(day))
    }
}

impl FrameSource for FieldGenerator {
    fn fetch(&self, request: &FrameRequest) -> Result<RawFrame, FetchError> {
        Ok(self.generate(request.day))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small() -> FieldConfig {
        FieldConfig { grid_size: 10, depth: 4, ..FieldConfig::default() }
    }

    fn day(d: i64) -> Day {
        Day::new(d).unwrap()
    }

    #[test]
    fn test_overlap_and_rounding() {
        let d = DailyForecast { probability: 0.5, resonance_factor: Some(0.7) };
        assert!((d.overlap_percent() - 52.5).abs() < 1e-9);
        let d = DailyForecast { probability: 1.0, resonance_factor: Some(1.0) };
        assert_eq!(d.overlap_percent(), 100.0);
        let d = DailyForecast { probability: 0.124, resonance_factor: Some(1.0) };
        assert!((d.overlap_percent() - 18.6).abs() < 1e-9);
    }

    #[test]
    fn test_missing_resonance_defaults() {
        assert_eq!(DailyForecast { probability: 0.2, resonance_factor: None }.resonance(), 0.5);
        assert_eq!(DailyForecast { probability: 0.2, resonance_factor: Some(0.0) }.resonance(), 0.5);
    }

    #[test]
    fn test_generated_shape() {
        let g = FieldGenerator::new(small(), vec![DailyForecast { probability: 0.5, resonance_factor: Some(0.5) }]).unwrap();
        let frame = g.frame(day(1)).unwrap();
        assert_eq!((frame.grid().width(), frame.grid().height(), frame.grid().channels()), (10, 10, 4));
        // ⌊36 · 0.5 · 0.5 · 2⌋ = 18
        assert_eq!(frame.phase_lock_points().len(), 18);
        assert_eq!(frame.phase_lock_points()[0], [3.0, 0.0, 0.0]);
        assert!((frame.resonance_overlap_percent() - 37.5).abs() < 1e-9);
        assert_eq!(frame.alert_level(), Some("HIGH"));
        assert_eq!(frame.day().get(), 1);
    }

    #[test]
    fn test_day_past_forecast_uses_fallback() {
        let g = FieldGenerator::new(small(), vec![]).unwrap();
        let frame = g.frame(day(21)).unwrap();
        assert_eq!(frame.phase_lock_points().len(), 1);
        assert!((frame.resonance_overlap_percent() - 1.5).abs() < 1e-9);
        assert_eq!(frame.alert_level(), Some("NORMAL"));
    }

    #[test]
    fn test_zero_probability_flat_field() {
        let g = FieldGenerator::new(small(), vec![DailyForecast { probability: 0.0, resonance_factor: Some(1.0) }]).unwrap();
        let frame = g.frame(day(1)).unwrap();
        assert_eq!(frame.grid().peak_amplitude(), 0.0);
    }

    #[test]
    fn test_critical_label() {
        let g = FieldGenerator::new(small(), vec![DailyForecast { probability: 0.9, resonance_factor: Some(0.9) }]).unwrap();
        assert_eq!(g.frame(day(1)).unwrap().alert_level(), Some("CRITICAL"));
    }

    #[test]
    fn test_random_forecast_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let f = FieldGenerator::random_forecast(&mut rng);
        assert_eq!(f.len(), 21);
        assert!(f.iter().all(|d| (0.0..=1.0).contains(&d.probability)));
        assert!(FieldGenerator::new(small(), f).is_ok());
    }

    #[test]
    fn test_rejects_bad_probability() {
        let bad = vec![DailyForecast { probability: 1.5, resonance_factor: None }];
        assert!(FieldGenerator::new(small(), bad).is_err());
    }
}
