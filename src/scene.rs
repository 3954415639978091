/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Scene composition: the per-tick assembly of mesh, surface and markers.
//!
//! [`SceneComposer`] holds the pure mappers plus the vertex templates and
//! reuses one [`Scene`] buffer across ticks. It owns no business state: the
//! frame, band and time all come in as arguments.
//!
//! Two geometry variants exist:
//!
//! | Variant | Geometry | Deformation |
//! |---------|----------|-------------|
//! | [`SceneVariant::Plane`] | `(segments+1)²` vertices over `[-extent, extent]²` | [`WaveFieldSampler`] |
//! | [`SceneVariant::Sphere`] | UV sphere, `(rings+1)·(sectors+1)` vertices | [`SurfaceSynthesizer`] |
//!
//! Markers are composed for both.

use core::f32::consts::{PI, TAU};

use crate::alert::SeverityBand;
use crate::color::{Rgb, VisualMode};
use crate::error::ConfigError;
use crate::frame::{CymaticFrame, Day};
use crate::markers::{MarkerStyle, MarkerVisual, PhaseLockMarkerLayer};
use crate::sampler::WaveFieldSampler;
use crate::surface::{OscillatorBank, SurfaceSample, SurfaceSynthesizer};

/// Which geometry the composer deforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SceneVariant {
    /// Flat grid displaced vertically by the wave field.
    #[default]
    Plane,
    /// Sphere displaced radially by the oscillator bank.
    Sphere,
}

/// Geometry resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeshConfig {
    /// Geometry to build.
    pub variant: SceneVariant,
    /// Plane subdivisions per side. 49 gives 50×50 vertices.
    pub segments: usize,
    /// Sphere latitude bands.
    pub sphere_rings: usize,
    /// Sphere longitude bands.
    pub sphere_sectors: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            variant: SceneVariant::Plane,
            segments: 49,
            sphere_rings: 16,
            sphere_sectors: 32,
        }
    }
}

impl MeshConfig {
    /// Reject geometry too coarse to form a surface.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segments == 0 {
            return Err(ConfigError::OutOfRange { name: "mesh.segments", value: 0.0 });
        }
        if self.sphere_rings < 2 {
            return Err(ConfigError::OutOfRange {
                name: "mesh.sphere_rings",
                value: self.sphere_rings as f64,
            });
        }
        if self.sphere_sectors < 3 {
            return Err(ConfigError::OutOfRange {
                name: "mesh.sphere_sectors",
                value: self.sphere_sectors as f64,
            });
        }
        Ok(())
    }
}

// ─── Scene ──────────────────────────────────────────────────────────────────

/// Renderable snapshot handed to the host renderer.
///
/// Plane vertices are `[x, y, height]` in row-major order over
/// `(segments + 1)²`; the sphere is a list of perturbed samples. Only the
/// active variant is populated.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Scene {
    /// Day of the frame on display, `None` when empty.
    pub day: Option<Day>,
    /// Animation time in seconds.
    pub time: f32,
    /// Severity band the markers are colored for.
    pub band: SeverityBand,
    /// `true` if the frame on display is older than the latest failed request.
    pub stale: bool,
    /// Active color mode.
    pub mode: VisualMode,
    /// Material color of the plane mesh.
    pub base_color: Rgb,
    /// Geometry variant populated below.
    pub variant: SceneVariant,
    /// Plane vertices per row.
    pub row_len: usize,
    /// Displaced plane vertices.
    pub plane: Vec<[f32; 3]>,
    /// Displaced sphere samples.
    pub sphere: Vec<SurfaceSample>,
    /// Phase-lock markers.
    pub markers: Vec<MarkerVisual>,
}

impl Scene {
    /// `true` if no frame has been composed.
    pub fn is_empty(&self) -> bool {
        self.day.is_none()
    }

    /// JSON snapshot for an external renderer.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ─── SceneComposer ──────────────────────────────────────────────────────────

/// Reassembles the [`Scene`] every tick from the latest frame.
#[derive(Clone, Debug)]
pub struct SceneComposer {
    sampler: WaveFieldSampler,
    surface: SurfaceSynthesizer,
    bank: OscillatorBank,
    markers: PhaseLockMarkerLayer,
    mesh: MeshConfig,
    mode: VisualMode,
    plane_template: Vec<[f32; 2]>,
    sphere_template: Vec<[f32; 3]>,
    scene: Scene,
}

impl SceneComposer {
    /// Build the composer and precompute vertex templates.
    pub fn new(
        sampler: WaveFieldSampler,
        surface: SurfaceSynthesizer,
        bank: OscillatorBank,
        marker_style: MarkerStyle,
        mesh: MeshConfig,
        mode: VisualMode,
    ) -> Result<Self, ConfigError> {
        mesh.validate()?;
        let plane_template = plane_vertices(mesh.segments, sampler.config().extent);
        let sphere_template =
            sphere_vertices(mesh.sphere_rings, mesh.sphere_sectors, surface.config().base_radius);
        Ok(Self {
            sampler,
            surface,
            bank,
            markers: PhaseLockMarkerLayer::new(marker_style),
            mesh,
            mode,
            plane_template,
            sphere_template,
            scene: Scene::default(),
        })
    }

    /// Change the color mode. Takes effect on the next compose.
    pub fn set_mode(&mut self, mode: VisualMode) {
        self.mode = mode;
    }

    /// Active color mode.
    pub fn mode(&self) -> VisualMode {
        self.mode
    }

    /// Replace the oscillator bank used by the sphere variant.
    pub fn set_bank(&mut self, bank: OscillatorBank) {
        self.bank = bank;
    }

    /// Geometry settings.
    pub fn mesh(&self) -> &MeshConfig {
        &self.mesh
    }

    /// Compose one tick.
    ///
    /// `intensity` and `confidence` are clamped to [0, 1] by the surface
    /// synthesizer; they only affect the sphere variant.
    pub fn compose(
        &mut self,
        frame: &CymaticFrame,
        band: SeverityBand,
        t: f32,
        intensity: f32,
        confidence: f32,
    ) -> &Scene {
        let scene = &mut self.scene;
        scene.day = Some(frame.day());
        scene.time = t;
        scene.band = band;
        scene.mode = self.mode;
        scene.base_color = self.mode.color();
        scene.variant = self.mesh.variant;

        match self.mesh.variant {
            SceneVariant::Plane => {
                scene.sphere.clear();
                scene.row_len = self.mesh.segments + 1;
                let grid = frame.grid();
                let sampler = &self.sampler;
                scene.plane.clear();
                scene.plane.extend(self.plane_template.iter().map(|&[x, y]| {
                    [x, y, sampler.displacement(grid, [x, y], t)]
                }));
            }
            SceneVariant::Sphere => {
                scene.plane.clear();
                scene.row_len = self.mesh.sphere_sectors + 1;
                let (surface, bank) = (&self.surface, &self.bank);
                scene.sphere.clear();
                scene.sphere.extend(
                    self.sphere_template
                        .iter()
                        .map(|&p| surface.perturb(p, bank, t, intensity, confidence)),
                );
            }
        }

        self.markers.update(frame.phase_lock_points(), band);
        scene.markers.clear();
        scene.markers.extend_from_slice(self.markers.markers());
        &self.scene
    }

    /// Mark the scene on display as stale or fresh.
    pub fn set_stale(&mut self, stale: bool) {
        self.scene.stale = stale;
    }

    /// Last composed scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Empty the scene and marker cache.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.scene = Scene::default();
    }
}

impl Default for SceneComposer {
    fn default() -> Self {
        let mesh = MeshConfig::default();
        let sampler = WaveFieldSampler::default();
        let surface = SurfaceSynthesizer::default();
        let plane_template = plane_vertices(mesh.segments, sampler.config().extent);
        let sphere_template =
            sphere_vertices(mesh.sphere_rings, mesh.sphere_sectors, surface.config().base_radius);
        Self {
            sampler,
            surface,
            bank: OscillatorBank::new(),
            markers: PhaseLockMarkerLayer::default(),
            mesh,
            mode: VisualMode::default(),
            plane_template,
            sphere_template,
            scene: Scene::default(),
        }
    }
}

fn plane_vertices(segments: usize, extent: f32) -> Vec<[f32; 2]> {
    let n = segments + 1;
    let step = 2.0 * extent / segments as f32;
    let mut out = Vec::with_capacity(n * n);
    for iy in 0..n {
        for ix in 0..n {
            out.push([-extent + ix as f32 * step, -extent + iy as f32 * step]);
        }
    }
    out
}

fn sphere_vertices(rings: usize, sectors: usize, radius: f32) -> Vec<[f32; 3]> {
    let mut out = Vec::with_capacity((rings + 1) * (sectors + 1));
    for r in 0..=rings {
        let theta = PI * r as f32 / rings as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for s in 0..=sectors {
            let phi = TAU * s as f32 / sectors as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            out.push([radius * sin_t * cos_p, radius * cos_t, radius * sin_t * sin_p]);
        }
    }
    out
}

// ─── Tests ──────────────────────────────────────────────────────────────────
