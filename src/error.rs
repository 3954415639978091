/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Error taxonomy for the visualization core.
//!
//! | Error | Surfaced to the shell? | Recovery |
//! |-------|------------------------|----------|
//! | [`PayloadError`] | yes, via [`ViewError::Payload`] | next selection or retry |
//! | [`FetchError`] | yes, via [`ViewError::Fetch`] | next selection or retry |
//! | [`AudioError`] | never | logged and swallowed by the synthesizer |
//! | [`ConfigError`] | at construction | caller fixes the config |
//!
//! Out-of-range grid access is not an error at all: the sampler clamps it to
//! zero displacement.

use thiserror::Error;

/// A received frame payload that cannot be rendered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    /// `resonance_overlap_percent` was absent.
    #[error("resonance_overlap_percent is missing")]
    MissingOverlap,
    /// `resonance_overlap_percent` was present but not a finite number.
    #[error("resonance_overlap_percent is not numeric: {0}")]
    NonNumericOverlap(String),
    /// The wave grid was absent or had a zero dimension.
    #[error("wave grid is missing or empty")]
    EmptyGrid,
    /// Rows or channel vectors of the wave grid had inconsistent lengths.
    #[error("wave grid is ragged at [{x}][{y}]: expected {expected} entries, got {got}")]
    RaggedGrid {
        /// Row index where the mismatch was found.
        x: usize,
        /// Column index where the mismatch was found (0 for row-length mismatches).
        y: usize,
        /// Expected length.
        expected: usize,
        /// Observed length.
        got: usize,
    },
    /// A phase-lock point had fewer than three coordinates or a non-finite one.
    #[error("phase-lock point {index} is malformed")]
    MalformedPoint {
        /// Index of the offending point.
        index: usize,
    },
    /// The payload carried no day.
    #[error("day is missing")]
    MissingDay,
    /// The frame's day was outside 1..=21.
    #[error(transparent)]
    Day(#[from] DayError),
    /// The frame's day differs from the day it was requested for.
    #[error("frame is for day {got} but day {expected} was requested")]
    DayMismatch {
        /// Day of the request.
        expected: u8,
        /// Day carried by the payload.
        got: u8,
    },
    /// The raw document could not be decoded at all.
    #[error("payload could not be decoded: {0}")]
    Decode(String),
}

/// Failure of the collaborator's fetch. The core never retries on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
    /// The request exceeded the collaborator's timeout.
    #[error("request timed out")]
    Timeout,
    /// The backend answered with a non-2xx status.
    #[error("backend returned status {0}")]
    Status(u16),
}

/// Audio path failures. Never surfaced beyond the synthesizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No output device is present.
    #[error("no audio output device available")]
    Unavailable,
    /// The host refused access to the output device.
    #[error("audio output permission denied")]
    PermissionDenied,
    /// Writing samples to an opened voice failed.
    #[error("audio write failed: {0}")]
    Write(String),
}

/// Invalid configuration supplied to a constructor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A threshold table must have at least one cut point.
    #[error("threshold table is empty")]
    EmptyThresholds,
    /// Cut points must be finite and strictly increasing.
    #[error("threshold cut points must be finite and strictly increasing (at index {0})")]
    UnorderedCuts(usize),
    /// Bands in a threshold table must be strictly increasing and above NORMAL.
    #[error("threshold bands must be strictly increasing above NORMAL (at index {0})")]
    UnorderedBands(usize),
    /// A numeric parameter was NaN or infinite.
    #[error("parameter `{0}` must be finite")]
    NonFinite(&'static str),
    /// A numeric parameter was outside its allowed range.
    #[error("parameter `{name}` out of range: {value}")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The configuration document could not be parsed.
    #[error("config could not be parsed: {0}")]
    Parse(String),
}

/// Day index outside the forecast window.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("day {0} is outside the forecast window 1..=21")]
pub struct DayError(pub i64);

/// Location descriptor with an out-of-range coordinate or radius.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    /// Latitude outside [-90, 90] or non-finite.
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),
    /// Longitude outside [-180, 180] or non-finite.
    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),
    /// Radius must be positive and finite.
    #[error("radius {0} km must be positive")]
    Radius(f64),
}

/// Per-request error state exposed by the view.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    /// The response arrived but could not be rendered.
    #[error("invalid payload: {0}")]
    Payload(#[from] PayloadError),
    /// The response never arrived.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}
