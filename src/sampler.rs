/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Wave-field sampler: grid value plus a traveling wave, per mesh vertex.
//!
//! ```text
//! index(v)        = floor((v + extent) / (2·extent) · (N − 1))
//! displacement    = grid[ix][iy][0] · wave_amplitude
//!                 + sin(frequency · t + x·k1 + y·k2) · secondary_amplitude
//! ```
//!
//! # Invariants
//!
//! - Pure: identical `(grid, vertex, t)` give identical output. No interior state.
//! - An index outside `[0, width) × [0, height)` yields exactly `0.0`.
//! - Never returns NaN: non-finite vertex, time or grid cell yields `0.0`.

use crate::error::ConfigError;
use crate::frame::WaveGrid;

/// Tunables for [`WaveFieldSampler`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplerConfig {
    /// Half-width of the mesh plane; vertices span `[-extent, extent]`.
    pub extent: f32,
    /// Scale applied to the sampled grid value.
    pub wave_amplitude: f32,
    /// Angular frequency of the traveling wave (rad/s).
    pub frequency: f32,
    /// Spatial wavenumber along x.
    pub k1: f32,
    /// Spatial wavenumber along y.
    pub k2: f32,
    /// Amplitude of the traveling wave.
    pub secondary_amplitude: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            extent: 5.0,
            wave_amplitude: 0.5,
            frequency: 2.0,
            k1: 0.5,
            k2: 0.3,
            secondary_amplitude: 0.1,
        }
    }
}

impl SamplerConfig {
    /// Reject non-finite parameters and a non-positive extent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("sampler.extent", self.extent),
            ("sampler.wave_amplitude", self.wave_amplitude),
            ("sampler.frequency", self.frequency),
            ("sampler.k1", self.k1),
            ("sampler.k2", self.k2),
            ("sampler.secondary_amplitude", self.secondary_amplitude),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if self.extent <= 0.0 {
            return Err(ConfigError::OutOfRange { name: "sampler.extent", value: f64::from(self.extent) });
        }
        Ok(())
    }
}

/// Maps `(grid, vertex, t)` to a vertical displacement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveFieldSampler {
    config: SamplerConfig,
}

impl WaveFieldSampler {
    /// Build a sampler after validating its config.
    pub fn new(config: SamplerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Map a planar coordinate to a grid index along an axis of `len` cells.
    ///
    /// Returns `None` when the floored index falls outside `[0, len)`.
    pub fn grid_index(&self, coord: f32, len: usize) -> Option<usize> {
        if !coord.is_finite() || len == 0 {
            return None;
        }
        let span = 2.0 * self.config.extent;
        let raw = ((coord + self.config.extent) / span * (len - 1) as f32).floor();
        if raw < 0.0 || raw >= len as f32 {
            None
        } else {
            Some(raw as usize)
        }
    }

    /// Vertical displacement of the mesh vertex at planar `(x, y)` at time `t`.
    pub fn displacement(&self, grid: &WaveGrid, vertex: [f32; 2], t: f32) -> f32 {
        let [x, y] = vertex;
        let (Some(ix), Some(iy)) = (
            self.grid_index(x, grid.width()),
            self.grid_index(y, grid.height()),
        ) else {
            return 0.0;
        };
        if !t.is_finite() {
            return 0.0;
        }

        let sampled = match grid.get(ix, iy, 0) {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        };
        let c = &self.config;
        let travelling = (c.frequency * t + x * c.k1 + y * c.k2).sin() * c.secondary_amplitude;
        let d = sampled * c.wave_amplitude + travelling;
        if d.is_finite() { d } else { 0.0 }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_grid(n: usize) -> WaveGrid {
        let data = (0..n * n).map(|i| i as f32 * 0.01).collect();
        WaveGrid::from_flat(n, n, 1, data).unwrap()
    }

    #[test]
    fn test_grid_index_endpoints() {
        let s = WaveFieldSampler::default();
        assert_eq!(s.grid_index(-5.0, 50), Some(0));
        assert_eq!(s.grid_index(5.0, 50), Some(49));
        assert_eq!(s.grid_index(0.0, 50), Some(24));
    }

    #[test]
    fn test_grid_index_out_of_range() {
        let s = WaveFieldSampler::default();
        assert_eq!(s.grid_index(-5.5, 50), None);
        assert_eq!(s.grid_index(5.5, 50), None);
        assert_eq!(s.grid_index(f32::NAN, 50), None);
        assert_eq!(s.grid_index(0.0, 0), None);
    }

    #[test]
    fn test_displacement_deterministic() {
        let s = WaveFieldSampler::default();
        let g = ramp_grid(50);
        let a = s.displacement(&g, [1.3, -2.7], 4.25);
        let b = s.displacement(&g, [1.3, -2.7], 4.25);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_displacement_out_of_bounds_is_zero() {
        let s = WaveFieldSampler::default();
        let g = ramp_grid(50);
        for v in [[-6.0, 0.0], [0.0, 7.5], [100.0, -100.0], [f32::INFINITY, 0.0]] {
            assert_eq!(s.displacement(&g, v, 1.0), 0.0, "vertex {:?}", v);
        }
    }

    #[test]
    fn test_displacement_nan_cell_contributes_zero() {
        let s = WaveFieldSampler::new(SamplerConfig { secondary_amplitude: 0.0, ..SamplerConfig::default() }).unwrap();
        let g = WaveGrid::from_flat(2, 2, 1, vec![f32::NAN; 4]).unwrap();
        assert_eq!(s.displacement(&g, [0.0, 0.0], 0.0), 0.0);
    }

    #[test]
    fn test_displacement_combines_grid_and_wave() {
        let cfg = SamplerConfig::default();
        let s = WaveFieldSampler::new(cfg.clone()).unwrap();
        let g = ramp_grid(50);
        let (x, y, t) = (-5.0f32, -5.0f32, 0.5f32);
        let expected = g.get(0, 0, 0).unwrap() * cfg.wave_amplitude
            + (cfg.frequency * t + x * cfg.k1 + y * cfg.k2).sin() * cfg.secondary_amplitude;
        assert!((s.displacement(&g, [x, y], t) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_static_grid_still_animates() {
        let s = WaveFieldSampler::default();
        let g = WaveGrid::from_flat(10, 10, 1, vec![1.0; 100]).unwrap();
        let a = s.displacement(&g, [0.0, 0.0], 0.0);
        let b = s.displacement(&g, [0.0, 0.0], 0.7);
        assert!((a - b).abs() > 1e-3);
    }

    #[test]
    fn test_config_rejects_non_finite() {
        let cfg = SamplerConfig { k1: f32::NAN, ..SamplerConfig::default() };
        assert_eq!(WaveFieldSampler::new(cfg), Err(ConfigError::NonFinite("sampler.k1")));
        let cfg = SamplerConfig { extent: 0.0, ..SamplerConfig::default() };
        assert!(WaveFieldSampler::new(cfg).is_err());
    }
}
