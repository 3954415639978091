/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Aggregate configuration for one visualization instance.
//!
//! Every part has a `Default` holding the constants the dashboard shipped
//! with. Configuration is passed into constructors; nothing here is global.

use crate::alert::ThresholdTable;
use crate::audio::ToneSpec;
use crate::clock::ClockConfig;
use crate::color::VisualMode;
use crate::error::ConfigError;
use crate::markers::MarkerStyle;
use crate::sampler::SamplerConfig;
use crate::scene::MeshConfig;
use crate::surface::{OscillatorBank, SurfaceConfig};

/// Everything a [`crate::view::CymaticView`] needs to be built.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CymaticConfig {
    /// Plane displacement.
    pub sampler: SamplerConfig,
    /// Sphere displacement and material.
    pub surface: SurfaceConfig,
    /// Sphere oscillator components; empty slots use the resonance modes.
    pub oscillators: OscillatorBank,
    /// Severity policy applied to `resonance_overlap_percent`.
    pub thresholds: ThresholdTable,
    /// Alert tone shape.
    pub tone: ToneSpec,
    /// Marker geometry.
    pub markers: MarkerStyle,
    /// Mesh resolution and variant.
    pub mesh: MeshConfig,
    /// Animation cadence.
    pub clock: ClockConfig,
    /// Initial palette.
    pub visual_mode: VisualMode,
}

impl CymaticConfig {
    /// Validate every section. The threshold table validates on construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sampler.validate()?;
        self.surface.validate()?;
        self.tone.validate()?;
        self.mesh.validate()?;
        self.clock.validate()?;
        for c in self.oscillators.resolved() {
            for (name, v) in [
                ("oscillators.frequency_hz", c.frequency_hz),
                ("oscillators.amplitude", c.amplitude),
                ("oscillators.phase_rad", c.phase_rad),
            ] {
                if !v.is_finite() {
                    return Err(ConfigError::OutOfRange { name, value: f64::from(v) });
                }
            }
        }
        if !(self.markers.radius.is_finite() && self.markers.radius > 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "markers.radius",
                value: f64::from(self.markers.radius),
            });
        }
        Ok(())
    }

    /// Parse a JSON document; absent sections take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::OscillatorComponent;

    #[test]
    fn test_default_is_valid() {
        assert!(CymaticConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_section_rejected() {
        let mut cfg = CymaticConfig::default();
        cfg.markers.radius = -1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { name: "markers.radius", .. })));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_partial() {
        let json = r#"{
            "thresholds": { "cuts": [ { "at": 0.4, "band": "ELEVATED" }, { "at": 0.8, "band": "CRITICAL" } ], "edge": "at_or_above" },
            "visual_mode": "harmonic",
            "clock": { "period_ms": 33 }
        }"#;
        let cfg = CymaticConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.visual_mode, VisualMode::Harmonic);
        assert_eq!(cfg.clock.period_ms, 33);
        assert_eq!(cfg.clock.max_dt_secs, 0.25);
        assert_eq!(cfg.thresholds.cuts().len(), 2);
        assert_eq!(cfg.sampler, SamplerConfig::default());
    }

    #[test]
    fn test_non_finite_oscillator_rejected() {
        let mut cfg = CymaticConfig::default();
        cfg.oscillators = OscillatorBank::from_components(&[OscillatorComponent::at(f32::NAN)]);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfRange { name: "oscillators.frequency_hz", .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_oscillators() {
        let json = r#"{
            "oscillators": { "components": [
                { "frequency_hz": 52.1, "amplitude": 0.8, "phase_rad": 0.0, "color": { "r": 1.0, "g": 1.0, "b": 0.25 } }
            ] }
        }"#;
        let cfg = CymaticConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.oscillators.len(), 1);
        assert_eq!(cfg.oscillators.slot(0).frequency_hz, 52.1);
        assert_eq!(cfg.oscillators.slot(1).frequency_hz, 14.3);
        assert!(CymaticConfig::from_json_str("{}").unwrap().oscillators.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_rejects_unordered_cuts() {
        let json = r#"{ "thresholds": { "cuts": [ { "at": 50, "band": "CRITICAL" }, { "at": 10, "band": "HIGH" } ] } }"#;
        assert!(matches!(CymaticConfig::from_json_str(json), Err(ConfigError::Parse(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_rejects_invalid_section() {
        let json = r#"{ "clock": { "period_ms": 0 } }"#;
        assert!(matches!(CymaticConfig::from_json_str(json), Err(ConfigError::OutOfRange { .. })));
    }
}
