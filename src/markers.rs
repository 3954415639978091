/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Phase-lock markers: one small sphere per point, colored by severity.
//!
//! [`render`] is the pure mapping. [`PhaseLockMarkerLayer`] caches its output
//! so a steady frame costs nothing per tick: colors are recomputed only when
//! the band changes, positions only when a different point set arrives.

use crate::alert::SeverityBand;
use crate::color::Rgb;

/// Marker geometry settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarkerStyle {
    /// Sphere radius of each marker.
    pub radius: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self { radius: 0.1 }
    }
}

/// One renderable marker.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerVisual {
    /// Position in scene space.
    pub position: [f32; 3],
    /// Sphere radius.
    pub radius: f32,
    /// Fill color.
    pub color: Rgb,
}

/// Pure `(points, band) → markers`. Empty input gives an empty output.
pub fn render(points: &[[f32; 3]], band: SeverityBand, style: &MarkerStyle) -> Vec<MarkerVisual> {
    let color = band.alert_color();
    points
        .iter()
        .map(|&position| MarkerVisual { position, radius: style.radius, color })
        .collect()
}

/// What [`PhaseLockMarkerLayer::update`] had to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerChange {
    /// Same points and band as last time.
    Unchanged,
    /// Same points, new band: colors rewritten in place.
    Recolored,
    /// New point set: markers rebuilt.
    Rebuilt,
}

/// Cached marker set for one visualization.
#[derive(Clone, Debug, Default)]
pub struct PhaseLockMarkerLayer {
    style: MarkerStyle,
    markers: Vec<MarkerVisual>,
    band: Option<SeverityBand>,
}

impl PhaseLockMarkerLayer {
    /// Empty layer.
    pub fn new(style: MarkerStyle) -> Self {
        Self { style, markers: Vec::new(), band: None }
    }

    /// Bring the cache in line with `points` and `band`.
    pub fn update(&mut self, points: &[[f32; 3]], band: SeverityBand) -> MarkerChange {
        let same_points = self.markers.len() == points.len()
            && self.markers.iter().zip(points).all(|(m, p)| m.position == *p);

        if !same_points || self.band.is_none() {
            self.markers = render(points, band, &self.style);
            self.band = Some(band);
            return MarkerChange::Rebuilt;
        }
        if self.band == Some(band) {
            return MarkerChange::Unchanged;
        }
        let color = band.alert_color();
        for m in &mut self.markers {
            m.color = color;
        }
        self.band = Some(band);
        MarkerChange::Recolored
    }

    /// Current markers.
    pub fn markers(&self) -> &[MarkerVisual] {
        &self.markers
    }

    /// Drop all markers (frame cleared or view torn down).
    pub fn clear(&mut self) {
        self.markers.clear();
        self.band = None;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
