//! Integration tests for per-tick scene composition.
//!
//! Checks geometry bounds on both variants, marker coloring across severity
//! bands, and that the composer stays finite for hostile grid values.

use cymatic_core::color::Rgb;
use cymatic_core::field::{DailyForecast, FieldConfig, FieldGenerator};
use cymatic_core::markers::MarkerStyle;
use cymatic_core::scene::SceneVariant;
use cymatic_core::surface::SurfaceConfig;
use cymatic_core::{
    CymaticFrame, Day, MagmaType, MeshConfig, OscillatorBank, SamplerConfig, SceneComposer,
    SeverityBand, SurfaceSynthesizer, VisualMode, WaveFieldSampler, WaveGrid,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ─── helpers ─────────────────────────────────────────────────────────────────

fn composer(variant: SceneVariant) -> SceneComposer {
    SceneComposer::new(
        WaveFieldSampler::new(SamplerConfig::default()).unwrap(),
        SurfaceSynthesizer::new(SurfaceConfig::default()).unwrap(),
        OscillatorBank::new(),
        MarkerStyle::default(),
        MeshConfig { variant, ..MeshConfig::default() },
        VisualMode::Seismic,
    )
    .unwrap()
}

fn frame(value: f32, points: Vec<[f32; 3]>) -> CymaticFrame {
    let grid = WaveGrid::from_nested(&vec![vec![vec![value; 2]; 50]; 50]).unwrap();
    CymaticFrame::new(grid, points, 40.0, None, Day::new(4).unwrap()).unwrap()
}

fn generated(p: f64) -> CymaticFrame {
    let forecast = vec![DailyForecast { probability: p, resonance_factor: Some(0.8) }];
    let g = FieldGenerator::new(FieldConfig { depth: 2, ..FieldConfig::default() }, forecast).unwrap();
    g.frame(Day::new(1).unwrap()).unwrap()
}

// ─── plane ───────────────────────────────────────────────────────────────────

#[test]
fn test_plane_has_50_by_50_vertices_in_bounds() {
    let mut c = composer(SceneVariant::Plane);
    let f = frame(1.0, vec![]);
    let scene = c.compose(&f, SeverityBand::Normal, 0.75, 0.4, 1.0);
    assert_eq!(scene.row_len, 50);
    assert_eq!(scene.plane.len(), 2_500);
    assert!(scene.sphere.is_empty());
    for &[x, y, z] in &scene.plane {
        assert!(x.abs() <= 5.0 + 1e-4 && y.abs() <= 5.0 + 1e-4);
        // |grid · 0.5| + 0.1 bound on the traveling wave
        assert!(z.abs() <= 0.6 + 1e-5, "z = {z}");
    }
    assert_eq!(scene.day, Day::new(4).ok());
}

#[test]
fn test_static_grid_still_animates() {
    let mut c = composer(SceneVariant::Plane);
    let f = frame(0.3, vec![]);
    let a = c.compose(&f, SeverityBand::Normal, 0.0, 0.3, 1.0).plane.clone();
    let b = c.compose(&f, SeverityBand::Normal, 0.5, 0.3, 1.0).plane.clone();
    assert_ne!(a, b);
}

#[test]
fn test_generated_frame_surface_is_finite() {
    let mut c = composer(SceneVariant::Plane);
    for p in [0.0, 0.35, 1.0] {
        let f = generated(p);
        for t in [0.0, 1.0, 1_000.0] {
            let scene = c.compose(&f, SeverityBand::High, t, 0.5, 1.0);
            assert!(scene.plane.iter().all(|v| v.iter().all(|c| c.is_finite())));
        }
    }
}

#[test]
fn test_nan_grid_values_become_flat() {
    let mut c = composer(SceneVariant::Plane);
    let f = frame(f32::NAN, vec![]);
    let scene = c.compose(&f, SeverityBand::Normal, 0.0, 0.0, 1.0);
    assert!(scene.plane.iter().all(|v| v[2].is_finite() && v[2].abs() <= 0.1 + 1e-5));
}

#[test]
fn test_visual_mode_changes_color_only() {
    let mut c = composer(SceneVariant::Plane);
    let f = frame(0.5, vec![[0.0, 0.0, 0.0]]);
    let seismic = c.compose(&f, SeverityBand::Normal, 1.0, 0.5, 1.0).clone();
    c.set_mode(VisualMode::Harmonic);
    let harmonic = c.compose(&f, SeverityBand::Normal, 1.0, 0.5, 1.0).clone();
    assert_ne!(seismic.base_color, harmonic.base_color);
    assert_eq!(seismic.plane, harmonic.plane);
    assert_eq!(seismic.markers, harmonic.markers);
}

// ─── markers ─────────────────────────────────────────────────────────────────

#[test]
fn test_empty_points_give_no_markers_in_every_band() {
    let mut c = composer(SceneVariant::Plane);
    let f = frame(0.5, vec![]);
    for band in SeverityBand::ALL {
        assert!(c.compose(&f, band, 0.0, 0.5, 1.0).markers.is_empty());
    }
}

#[test]
fn test_markers_red_only_when_critical() {
    let mut c = composer(SceneVariant::Plane);
    let points = vec![[3.0, 0.0, 0.0], [0.0, 3.0, 0.5], [-3.0, 0.0, -0.2]];
    let f = frame(0.5, points.clone());
    for band in SeverityBand::ALL {
        let scene = c.compose(&f, band, 0.0, 0.5, 1.0);
        assert_eq!(scene.markers.len(), 3);
        let want = if band == SeverityBand::Critical { Rgb::RED } else { Rgb::YELLOW };
        for (m, p) in scene.markers.iter().zip(&points) {
            assert_eq!(m.color, want);
            assert_eq!(&m.position, p);
            assert_eq!(m.radius, 0.1);
        }
    }
}

// ─── sphere ──────────────────────────────────────────────────────────────────

#[test]
fn test_sphere_radius_stays_near_base() {
    let mut c = composer(SceneVariant::Sphere);
    c.set_bank(OscillatorBank::for_magma(MagmaType::Basaltic, 1.0, &mut StdRng::seed_from_u64(3)));
    let f = frame(0.5, vec![[0.0, 0.0, 1.0]]);
    let scene = c.compose(&f, SeverityBand::Critical, 2.5, 1.0, 0.5);
    assert!(scene.plane.is_empty());
    assert_eq!(scene.sphere.len(), 17 * 33);
    assert_eq!(scene.row_len, 33);
    for s in &scene.sphere {
        let r = s.position.iter().map(|c| c * c).sum::<f32>().sqrt();
        // three components, amplitude < 1.5 each, scaled by 0.1
        assert!((r - 1.0).abs() <= 0.45 + 1e-4, "r = {r}");
        assert!((0.0..=1.0).contains(&s.opacity));
    }
    assert_eq!(scene.markers.len(), 1);
    assert_eq!(scene.markers[0].color, Rgb::RED);
}

#[test]
fn test_sphere_zero_intensity_is_undeformed() {
    let mut c = composer(SceneVariant::Sphere);
    let f = frame(0.5, vec![]);
    let scene = c.compose(&f, SeverityBand::Normal, 7.0, 0.0, 1.0);
    assert!(scene.sphere.iter().all(|s| s.radius_offset == 0.0));
}

// ─── lifecycle ───────────────────────────────────────────────────────────────

#[test]
fn test_clear_empties_scene() {
    let mut c = composer(SceneVariant::Plane);
    let f = frame(0.5, vec![[1.0, 1.0, 1.0]]);
    c.compose(&f, SeverityBand::High, 0.0, 0.5, 1.0);
    assert!(!c.scene().is_empty());
    c.clear();
    assert!(c.scene().is_empty());
    assert!(c.scene().markers.is_empty());
    assert_eq!(c.scene().day, None);
}
