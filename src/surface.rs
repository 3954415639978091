/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Multi-oscillator sphere surface: up to three sine components perturb the
//! radius of each vertex; color and opacity come from hazard intensity and
//! forecast confidence.
//!
//! ```text
//! wave_i       = sin(|p| · f_i + t · speed_i + φ_i) · a_i       speed = [2.0, 1.5, 1.0]
//! displacement = (wave_0 + wave_1 + wave_2) · intensity · displacement_scale
//! p'           = normalize(p) · (base_radius + displacement)
//! hue          = base_hue · (1 − intensity)                     → red as intensity → 1
//! opacity      = min_opacity + (1 − min_opacity) · confidence
//! ```
//!
//! Slots missing from a bank fall back to the Schumann resonance modes
//! (7.83, 14.3, 20.8 Hz) at unit amplitude and zero phase.

use heapless::Vec as BoundedVec;
use rand::Rng;

use crate::color::{frequency_color, Rgb};
use crate::error::ConfigError;

/// Maximum number of components a bank may hold.
pub const MAX_COMPONENTS: usize = 3;

/// Fallback frequencies for empty bank slots (Hz).
pub const RESONANCE_MODES: [f32; MAX_COMPONENTS] = [7.83, 14.3, 20.8];

/// Per-slot time multipliers. The third is tied to the base resonance mode.
pub const SLOT_SPEEDS: [f32; MAX_COMPONENTS] = [2.0, 1.5, 1.0];

// ─── OscillatorComponent ────────────────────────────────────────────────────

/// One named sine component of the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OscillatorComponent {
    /// Frequency in Hz.
    pub frequency_hz: f32,
    /// Peak amplitude (pre-intensity).
    pub amplitude: f32,
    /// Phase offset in radians.
    pub phase_rad: f32,
    /// Display color of this component.
    pub color: Rgb,
}

impl OscillatorComponent {
    /// Unit-amplitude, zero-phase component colored by frequency band.
    pub fn at(frequency_hz: f32) -> Self {
        Self {
            frequency_hz,
            amplitude: 1.0,
            phase_rad: 0.0,
            color: frequency_color(frequency_hz),
        }
    }
}

// ─── MagmaType ──────────────────────────────────────────────────────────────

/// Magma classes and their characteristic resonance triples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MagmaType {
    /// Low-viscosity basalt; Schumann harmonics.
    Basaltic,
    /// Intermediate andesite.
    Andesitic,
    /// High-viscosity rhyolite.
    Rhyolitic,
}

impl MagmaType {
    /// Characteristic frequencies in Hz.
    pub fn frequencies(self) -> [f32; MAX_COMPONENTS] {
        match self {
            MagmaType::Basaltic => RESONANCE_MODES,
            MagmaType::Andesitic => [33.8, 39.2, 45.6],
            MagmaType::Rhyolitic => [52.1, 58.7, 65.3],
        }
    }

    /// Classify from mean thermal anomaly (°C) and mean SO₂ emission (t/day).
    pub fn classify(mean_thermal_anomaly: f32, mean_so2: f32) -> Self {
        if mean_thermal_anomaly > 6.0 && mean_so2 > 1500.0 {
            MagmaType::Basaltic
        } else if mean_thermal_anomaly > 3.0 && mean_so2 > 800.0 {
            MagmaType::Andesitic
        } else {
            MagmaType::Rhyolitic
        }
    }
}

// ─── OscillatorBank ─────────────────────────────────────────────────────────

/// One to three oscillator components, fixed at configuration time.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OscillatorBank {
    components: BoundedVec<OscillatorComponent, MAX_COMPONENTS>,
}

impl OscillatorBank {
    /// Empty bank; every slot uses its fallback mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a slice. Entries past the third are dropped.
    pub fn from_components(components: &[OscillatorComponent]) -> Self {
        let mut bank = Self::new();
        for c in components.iter().take(MAX_COMPONENTS) {
            let _ = bank.components.push(*c);
        }
        bank
    }

    /// Add a component. Returns it back if the bank is already full.
    pub fn push(&mut self, component: OscillatorComponent) -> Result<(), OscillatorComponent> {
        self.components.push(component)
    }

    /// Bank for a magma type with jittered amplitude and phase.
    ///
    /// Amplitude is `base_amplitude · U(0.5, 1.5)`, phase is `U(0, 2π)`.
    pub fn for_magma<R: Rng + ?Sized>(magma: MagmaType, base_amplitude: f32, rng: &mut R) -> Self {
        let mut bank = Self::new();
        for f in magma.frequencies() {
            let _ = bank.components.push(OscillatorComponent {
                frequency_hz: f,
                amplitude: base_amplitude * rng.gen_range(0.5..1.5),
                phase_rad: rng.gen_range(0.0..core::f32::consts::TAU),
                color: frequency_color(f),
            });
        }
        bank
    }

    /// Number of explicitly configured components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// `true` if no component is configured.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component in `slot`, or the fallback resonance mode if unset.
    pub fn slot(&self, slot: usize) -> OscillatorComponent {
        self.components
            .get(slot)
            .copied()
            .unwrap_or_else(|| OscillatorComponent::at(RESONANCE_MODES[slot % MAX_COMPONENTS]))
    }

    /// All three slots with fallbacks filled in.
    pub fn resolved(&self) -> [OscillatorComponent; MAX_COMPONENTS] {
        [self.slot(0), self.slot(1), self.slot(2)]
    }
}

// ─── SurfaceSynthesizer ─────────────────────────────────────────────────────

/// Tunables for [`SurfaceSynthesizer`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SurfaceConfig {
    /// Undisplaced sphere radius.
    pub base_radius: f32,
    /// Multiplier on the summed waves so unit amplitudes stay visually small.
    pub displacement_scale: f32,
    /// Hue at zero intensity, as a turn fraction (0.6 ≈ blue).
    pub base_hue: f32,
    /// HSL saturation.
    pub saturation: f32,
    /// HSL lightness.
    pub lightness: f32,
    /// Opacity at zero confidence.
    pub min_opacity: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            base_radius: 1.0,
            displacement_scale: 0.1,
            base_hue: 0.6,
            saturation: 0.8,
            lightness: 0.5,
            min_opacity: 0.3,
        }
    }
}

impl SurfaceConfig {
    /// Reject non-finite values, a non-positive radius and out-of-range color terms.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("surface.base_radius", self.base_radius),
            ("surface.displacement_scale", self.displacement_scale),
            ("surface.base_hue", self.base_hue),
            ("surface.saturation", self.saturation),
            ("surface.lightness", self.lightness),
            ("surface.min_opacity", self.min_opacity),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if self.base_radius <= 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "surface.base_radius",
                value: f64::from(self.base_radius),
            });
        }
        if !(0.0..=1.0).contains(&self.min_opacity) {
            return Err(ConfigError::OutOfRange {
                name: "surface.min_opacity",
                value: f64::from(self.min_opacity),
            });
        }
        Ok(())
    }
}

/// Perturbed vertex plus its material.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceSample {
    /// Offset added to the base radius.
    pub radius_offset: f32,
    /// Displaced vertex position.
    pub position: [f32; 3],
    /// Surface color.
    pub color: Rgb,
    /// Surface opacity in [0, 1].
    pub opacity: f32,
}

/// Pure `(position, bank, t, intensity, confidence) → SurfaceSample` mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceSynthesizer {
    config: SurfaceConfig,
}

impl SurfaceSynthesizer {
    /// Build after validating the config.
    pub fn new(config: SurfaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Radial offset for a vertex at distance `r` from the origin.
    pub fn radius_offset(&self, r: f32, bank: &OscillatorBank, t: f32, intensity: f32) -> f32 {
        let intensity = unit(intensity);
        let sum: f32 = bank
            .resolved()
            .iter()
            .zip(SLOT_SPEEDS)
            .map(|(c, speed)| (r * c.frequency_hz + t * speed + c.phase_rad).sin() * c.amplitude)
            .sum();
        let d = sum * intensity * self.config.displacement_scale;
        if d.is_finite() { d } else { 0.0 }
    }

    /// Surface color as a function of intensity only.
    pub fn color(&self, intensity: f32) -> Rgb {
        let hue = self.config.base_hue * (1.0 - unit(intensity));
        Rgb::from_hsl(hue, self.config.saturation, self.config.lightness)
    }

    /// Surface opacity as a function of confidence only.
    pub fn opacity(&self, confidence: f32) -> f32 {
        let m = self.config.min_opacity;
        m + (1.0 - m) * unit(confidence)
    }

    /// Perturb one sphere vertex.
    ///
    /// A zero-length `position` has no direction; it maps to the origin with
    /// zero offset.
    pub fn perturb(
        &self,
        position: [f32; 3],
        bank: &OscillatorBank,
        t: f32,
        intensity: f32,
        confidence: f32,
    ) -> SurfaceSample {
        let len = norm(position);
        let (radius_offset, position) = if len > f32::EPSILON && len.is_finite() {
            let offset = self.radius_offset(len, bank, t, intensity);
            let scale = (self.config.base_radius + offset) / len;
            (offset, [position[0] * scale, position[1] * scale, position[2] * scale])
        } else {
            (0.0, [0.0; 3])
        };
        SurfaceSample {
            radius_offset,
            position,
            color: self.color(intensity),
            opacity: self.opacity(confidence),
        }
    }
}

fn unit(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

fn norm(p: [f32; 3]) -> f32 {
    (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_bank_uses_resonance_modes() {
        let bank = OscillatorBank::new();
        let freqs: Vec<f32> = bank.resolved().iter().map(|c| c.frequency_hz).collect();
        assert_eq!(freqs, vec![7.83, 14.3, 20.8]);
    }

    #[test]
    fn test_partial_bank_fills_missing_slots() {
        let bank = OscillatorBank::from_components(&[OscillatorComponent::at(40.0)]);
        assert_eq!(bank.len(), 1);
        let r = bank.resolved();
        assert_eq!(r[0].frequency_hz, 40.0);
        assert_eq!(r[1].frequency_hz, 14.3);
        assert_eq!(r[2].frequency_hz, 20.8);
    }

    #[test]
    fn test_bank_caps_at_three() {
        let comps = [OscillatorComponent::at(1.0); 5];
        let mut bank = OscillatorBank::from_components(&comps);
        assert_eq!(bank.len(), 3);
        assert!(bank.push(OscillatorComponent::at(2.0)).is_err());
    }

    #[test]
    fn test_for_magma_jitter_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let bank = OscillatorBank::for_magma(MagmaType::Andesitic, 1.2, &mut rng);
        assert_eq!(bank.len(), 3);
        for (c, f) in bank.resolved().iter().zip(MagmaType::Andesitic.frequencies()) {
            assert_eq!(c.frequency_hz, f);
            assert!(c.amplitude >= 0.6 && c.amplitude < 1.8, "amp {}", c.amplitude);
            assert!(c.phase_rad >= 0.0 && c.phase_rad < core::f32::consts::TAU);
        }
    }

    #[test]
    fn test_magma_classification() {
        assert_eq!(MagmaType::classify(7.0, 1600.0), MagmaType::Basaltic);
        assert_eq!(MagmaType::classify(7.0, 1000.0), MagmaType::Andesitic);
        assert_eq!(MagmaType::classify(4.0, 900.0), MagmaType::Andesitic);
        assert_eq!(MagmaType::classify(2.0, 5000.0), MagmaType::Rhyolitic);
    }

    #[test]
    fn test_zero_intensity_leaves_sphere_undisplaced() {
        let s = SurfaceSynthesizer::default();
        let sample = s.perturb([0.0, 2.0, 0.0], &OscillatorBank::new(), 3.0, 0.0, 1.0);
        assert_eq!(sample.radius_offset, 0.0);
        assert!((norm(sample.position) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_perturbed_radius_matches_formula() {
        let s = SurfaceSynthesizer::default();
        let bank = OscillatorBank::new();
        let (t, intensity) = (0.4f32, 0.8f32);
        let p = [0.6f32, 0.0, 0.8];
        let expected: f32 = (1.0f32 * 7.83 + t * 2.0).sin()
            + (1.0f32 * 14.3 + t * 1.5).sin()
            + (1.0f32 * 20.8 + t * 1.0).sin();
        let expected = expected * intensity * 0.1;
        let sample = s.perturb(p, &bank, t, intensity, 0.5);
        assert!((sample.radius_offset - expected).abs() < 1e-5);
        assert!((norm(sample.position) - (1.0 + expected)).abs() < 1e-5);
    }

    #[test]
    fn test_color_shifts_to_red_with_intensity() {
        let s = SurfaceSynthesizer::default();
        let calm = s.color(0.0);
        let hot = s.color(1.0);
        assert!(hot.r > calm.r);
        assert!(hot.b < calm.b);
        assert!(hot.r > 0.85 && hot.g < 0.15 && hot.b < 0.15);
    }

    #[test]
    fn test_color_and_opacity_independent_of_time_and_position() {
        let s = SurfaceSynthesizer::default();
        let bank = OscillatorBank::new();
        let a = s.perturb([1.0, 0.0, 0.0], &bank, 0.0, 0.3, 0.7);
        let b = s.perturb([0.0, 0.0, 5.0], &bank, 9.0, 0.3, 0.7);
        assert_eq!(a.color, b.color);
        assert_eq!(a.opacity, b.opacity);
        assert!((a.opacity - (0.3 + 0.7 * 0.7)).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_position() {
        let s = SurfaceSynthesizer::default();
        let sample = s.perturb([0.0; 3], &OscillatorBank::new(), 1.0, 1.0, 1.0);
        assert_eq!(sample.position, [0.0; 3]);
        assert_eq!(sample.radius_offset, 0.0);
    }
}
