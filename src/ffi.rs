//! Python FFI bindings via PyO3.
//!
//! Exposes the severity classifier, the rising-edge evaluator and the
//! wave-field sampler to Python. Scene composition and audio stay on the Rust
//! side.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from cymatic_core import AlertEvaluator, SeverityBand, ThresholdTable, displacement
//!
//! table = ThresholdTable.overlap_percent()
//! print(table.classify(52.0))           # SeverityBand.ELEVATED
//!
//! ev = AlertEvaluator(table)
//! for overlap in [10, 20, 90, 95, 60, 97]:
//!     band, edge = ev.evaluate(overlap)
//!     if edge and ev.take_rising_edge():
//!         print("sound the alarm")
//!
//! grid = [[[0.5]] * 50] * 50           # [x][y][channel]
//! print(displacement(grid, 0.0, 0.0, t=1.25))
//! ```

#![allow(non_snake_case)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::alert::{
    AlertEvaluator as RustAlertEvaluator, Cut, CutEdge, SeverityBand as RustSeverityBand,
    ThresholdTable as RustThresholdTable,
};
use crate::frame::WaveGrid;
use crate::sampler::{SamplerConfig, WaveFieldSampler};

fn band_from_label(label: &str) -> PyResult<RustSeverityBand> {
    RustSeverityBand::ALL
        .into_iter()
        .find(|b| b.label().eq_ignore_ascii_case(label))
        .ok_or_else(|| PyValueError::new_err(format!("unknown severity band {label:?}")))
}

// ── SeverityBand ──────────────────────────────────────────────────────────────

/// Discretised hazard level: NORMAL < ELEVATED < HIGH < CRITICAL.
#[pyclass(name = "SeverityBand")]
#[derive(Clone)]
pub struct PySeverityBand {
    inner: RustSeverityBand,
}

#[pymethods]
impl PySeverityBand {
    /// NORMAL class attribute.
    #[classattr]
    pub fn NORMAL() -> Self {
        Self { inner: RustSeverityBand::Normal }
    }

    /// ELEVATED class attribute.
    #[classattr]
    pub fn ELEVATED() -> Self {
        Self { inner: RustSeverityBand::Elevated }
    }

    /// HIGH class attribute.
    #[classattr]
    pub fn HIGH() -> Self {
        Self { inner: RustSeverityBand::High }
    }

    /// CRITICAL class attribute.
    #[classattr]
    pub fn CRITICAL() -> Self {
        Self { inner: RustSeverityBand::Critical }
    }

    /// Upper-case label.
    #[getter]
    pub fn label(&self) -> &'static str {
        self.inner.label()
    }

    /// Severity rank, 0 (NORMAL) to 3 (CRITICAL).
    #[getter]
    pub fn rank(&self) -> u8 {
        self.inner as u8
    }

    /// Banner tint as [r, g, b] bytes.
    pub fn banner_tint(&self) -> [u8; 3] {
        self.inner.banner_tint()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!("SeverityBand.{}", self.inner.label())
    }

    /// Python equality comparison.
    pub fn __eq__(&self, other: &PySeverityBand) -> bool {
        self.inner == other.inner
    }
}

// ── ThresholdTable ────────────────────────────────────────────────────────────

/// Monotone step function from a statistic to a SeverityBand.
///
/// Build from ``[(cut, "BAND"), ...]`` pairs or use a preset.
#[pyclass(name = "ThresholdTable")]
#[derive(Clone)]
pub struct PyThresholdTable {
    inner: RustThresholdTable,
}

#[pymethods]
impl PyThresholdTable {
    /// Create a table.
    ///
    /// Args:
    ///     cuts:      list of (cut_point, band_label) in ascending order
    ///     inclusive: True if a value equal to a cut enters the band above it
    #[new]
    #[pyo3(signature = (cuts, inclusive=false))]
    pub fn new(cuts: Vec<(f64, String)>, inclusive: bool) -> PyResult<Self> {
        let cuts = cuts
            .iter()
            .map(|(at, label)| Ok(Cut { at: *at, band: band_from_label(label)? }))
            .collect::<PyResult<Vec<_>>>()?;
        let edge = if inclusive { CutEdge::AtOrAbove } else { CutEdge::Above };
        RustThresholdTable::new(cuts, edge)
            .map(|inner| Self { inner })
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Wave-field overlap table (35 / 52).
    #[staticmethod]
    pub fn overlap_percent() -> Self {
        Self { inner: RustThresholdTable::overlap_percent() }
    }

    /// Probability table on [0, 1] (0.4 / 0.6 / 0.8).
    #[staticmethod]
    pub fn probability() -> Self {
        Self { inner: RustThresholdTable::probability() }
    }

    /// Classify a value.
    pub fn classify(&self, value: f64) -> PySeverityBand {
        PySeverityBand { inner: self.inner.classify(value) }
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        let cuts: Vec<String> = self
            .inner
            .cuts()
            .iter()
            .map(|c| format!("({}, {:?})", c.at, c.band.label()))
            .collect();
        format!("ThresholdTable([{}])", cuts.join(", "))
    }
}

// ── AlertEvaluator ────────────────────────────────────────────────────────────

/// Severity state machine with rising-edge detection into CRITICAL.
#[pyclass(name = "AlertEvaluator")]
pub struct PyAlertEvaluator {
    inner: RustAlertEvaluator,
}

#[pymethods]
impl PyAlertEvaluator {
    /// Create an evaluator over `table` (default: overlap table).
    #[new]
    #[pyo3(signature = (table=None))]
    pub fn new(table: Option<PyThresholdTable>) -> Self {
        let table = table.map_or_else(RustThresholdTable::default, |t| t.inner);
        Self { inner: RustAlertEvaluator::new(table) }
    }

    /// Feed one sample.
    ///
    /// Returns:
    ///     (band, just_entered_critical)
    #[pyo3(signature = (value, server_label=None))]
    pub fn evaluate(&mut self, value: f64, server_label: Option<&str>) -> (PySeverityBand, bool) {
        let signal = self.inner.evaluate(value, server_label);
        (PySeverityBand { inner: signal.band }, signal.just_entered_critical)
    }

    /// True exactly once per rising edge; marks the edge handled.
    pub fn take_rising_edge(&mut self) -> bool {
        self.inner.take_rising_edge().is_some()
    }

    /// Rising edges seen so far.
    #[getter]
    pub fn edge_count(&self) -> u64 {
        self.inner.edge_count()
    }

    /// Forget the state (teardown).
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!("AlertEvaluator(band={}, edges={})", self.inner.signal().band, self.inner.edge_count())
    }
}

// ── Sampler ───────────────────────────────────────────────────────────────────

/// Vertical displacement of the plane vertex `(x, y)` at time `t`.
///
/// Args:
///     grid: nested [x][y][channel] list of floats
///     x, y: vertex position in [-5, 5]
///     t:    animation time in seconds
#[pyfunction]
pub fn displacement(grid: Vec<Vec<Vec<f32>>>, x: f32, y: f32, t: f32) -> PyResult<f32> {
    let grid = WaveGrid::from_nested(&grid).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let sampler = WaveFieldSampler::new(SamplerConfig::default())
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(sampler.displacement(&grid, [x, y], t))
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Cymatic wave-field severity and sampling bindings.
#[pymodule]
pub fn cymatic_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySeverityBand>()?;
    m.add_class::<PyThresholdTable>()?;
    m.add_class::<PyAlertEvaluator>()?;
    m.add_function(wrap_pyfunction!(displacement, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
