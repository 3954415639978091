/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Frame data model: what the collaborator hands to the core.
//!
//! - [`Day`]: forecast day index, 1..=21.
//! - [`Location`]: where the forecast is for.
//! - [`FrameRequest`]: one `(location, day)` pair asked of the collaborator.
//! - [`WaveGrid`]: dense `[x][y][channel]` scalar field.
//! - [`CymaticFrame`]: validated, immutable frame bound to one day.
//! - [`RawFrame`]: the untrusted payload before validation.
//!
//! # Invariants
//!
//! - A [`CymaticFrame`] only exists if its overlap is finite and its grid is
//!   rectangular and non-empty. There is no partially valid frame.
//! - Frames are never mutated after construction; the core derives renderable
//!   state from them.

use crate::error::{DayError, LocationError, PayloadError};

/// First forecast day.
pub const FIRST_DAY: u8 = 1;
/// Last forecast day.
pub const LAST_DAY: u8 = 21;

// ─── Day ────────────────────────────────────────────────────────────────────

/// A forecast day in `1..=21`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "u8"))]
pub struct Day(u8);

impl Day {
    /// Validate a day index.
    pub fn new(day: i64) -> Result<Self, DayError> {
        if (i64::from(FIRST_DAY)..=i64::from(LAST_DAY)).contains(&day) {
            Ok(Self(day as u8))
        } else {
            Err(DayError(day))
        }
    }

    /// The day as a plain integer.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based offset into a 21-entry forecast.
    pub fn index(self) -> usize {
        usize::from(self.0 - FIRST_DAY)
    }
}

impl TryFrom<i64> for Day {
    type Error = DayError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Day::new(value)
    }
}

impl From<Day> for u8 {
    fn from(day: Day) -> u8 {
        day.0
    }
}

impl core::fmt::Display for Day {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "day {}", self.0)
    }
}

// ─── Location ───────────────────────────────────────────────────────────────

/// Location descriptor supplied by the shell.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,
    /// Search radius in kilometres, > 0.
    pub radius_km: f64,
}

impl Location {
    /// Validate and construct a location.
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Result<Self, LocationError> {
        let loc = Self { latitude, longitude, radius_km };
        loc.validate()?;
        Ok(loc)
    }

    /// Check coordinate ranges. NaN fails every check.
    pub fn validate(&self) -> Result<(), LocationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(LocationError::Latitude(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(LocationError::Longitude(self.longitude));
        }
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(LocationError::Radius(self.radius_km));
        }
        Ok(())
    }
}

// ─── FrameRequest ───────────────────────────────────────────────────────────

/// One request to the collaborator, tagged with a ticket so the response can
/// be matched against the selection that was current when it resolves.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameRequest {
    /// Monotonic per-view ticket. Later selections get larger tickets.
    pub ticket: u64,
    /// Where.
    pub location: Location,
    /// Which forecast day.
    pub day: Day,
}

// ─── WaveGrid ───────────────────────────────────────────────────────────────

/// Dense scalar field indexed `[x][y][channel]`, stored flat.
///
/// Only channel 0 is consumed by the sampler; the rest are carried through.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WaveGrid {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

impl WaveGrid {
    /// Build from flat storage in `x`-major, then `y`, then `channel` order.
    pub fn from_flat(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, PayloadError> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(PayloadError::EmptyGrid);
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(PayloadError::RaggedGrid { x: 0, y: 0, expected, got: data.len() });
        }
        Ok(Self { width, height, channels, data })
    }

    /// Build from the nested `[x][y][channel]` shape the backend sends.
    ///
    /// Every row must have the same length and every cell the same channel count.
    pub fn from_nested(nested: &[Vec<Vec<f32>>]) -> Result<Self, PayloadError> {
        let width = nested.len();
        let height = nested.first().map_or(0, Vec::len);
        let channels = nested.first().and_then(|r| r.first()).map_or(0, Vec::len);
        if width == 0 || height == 0 || channels == 0 {
            return Err(PayloadError::EmptyGrid);
        }

        let mut data = Vec::with_capacity(width * height * channels);
        for (x, row) in nested.iter().enumerate() {
            if row.len() != height {
                return Err(PayloadError::RaggedGrid { x, y: 0, expected: height, got: row.len() });
            }
            for (y, cell) in row.iter().enumerate() {
                if cell.len() != channels {
                    return Err(PayloadError::RaggedGrid {
                        x,
                        y,
                        expected: channels,
                        got: cell.len(),
                    });
                }
                data.extend_from_slice(cell);
            }
        }
        Ok(Self { width, height, channels, data })
    }

    /// Number of `x` rows.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of `y` columns.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of sub-band channels per cell.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Bounds-checked lookup. Returns `None` outside the grid.
    pub fn get(&self, x: usize, y: usize, channel: usize) -> Option<f32> {
        if x >= self.width || y >= self.height || channel >= self.channels {
            return None;
        }
        self.data.get((x * self.height + y) * self.channels + channel).copied()
    }

    /// Largest absolute channel-0 value, used to normalise intensity. 0 if all NaN.
    pub fn peak_amplitude(&self) -> f32 {
        self.data
            .iter()
            .step_by(self.channels)
            .filter(|v| v.is_finite())
            .fold(0.0f32, |acc, v| acc.max(v.abs()))
    }
}

// ─── CymaticFrame ───────────────────────────────────────────────────────────

/// One validated frame for a single `(location, day)` pair.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CymaticFrame {
    grid: WaveGrid,
    phase_lock_points: Vec<[f32; 3]>,
    resonance_overlap_percent: f64,
    alert_level: Option<String>,
    day: Day,
}

impl CymaticFrame {
    /// Construct a frame, rejecting a non-finite overlap.
    pub fn new(
        grid: WaveGrid,
        phase_lock_points: Vec<[f32; 3]>,
        resonance_overlap_percent: f64,
        alert_level: Option<String>,
        day: Day,
    ) -> Result<Self, PayloadError> {
        if !resonance_overlap_percent.is_finite() {
            return Err(PayloadError::NonNumericOverlap(resonance_overlap_percent.to_string()));
        }
        if let Some(index) = phase_lock_points
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(PayloadError::MalformedPoint { index });
        }
        Ok(Self { grid, phase_lock_points, resonance_overlap_percent, alert_level, day })
    }

    /// The scalar field.
    pub fn grid(&self) -> &WaveGrid {
        &self.grid
    }

    /// Phase-lock marker positions in insertion order.
    pub fn phase_lock_points(&self) -> &[[f32; 3]] {
        &self.phase_lock_points
    }

    /// The overlap statistic driving severity. Finite, nominally [0, 100].
    pub fn resonance_overlap_percent(&self) -> f64 {
        self.resonance_overlap_percent
    }

    /// The collaborator's own severity label, if it sent one.
    pub fn alert_level(&self) -> Option<&str> {
        self.alert_level.as_deref()
    }

    /// The forecast day this frame belongs to.
    pub fn day(&self) -> Day {
        self.day
    }
}

// ─── RawFrame ───────────────────────────────────────────────────────────────

/// Loosely typed overlap value as it arrives on the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum RawNumber {
    /// A JSON number.
    Number(f64),
    /// Anything else, kept verbatim for the error message.
    Other(String),
}

/// An untrusted payload. Every field may be missing or wrong.
///
/// [`CymaticFrame::try_from`] is the only way in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawFrame {
    /// `wave_field` as nested `[x][y][channel]` arrays.
    pub wave_field: Option<Vec<Vec<Vec<f32>>>>,
    /// Points as arrays of at least three numbers; extra values are ignored.
    pub phase_lock_points: Vec<Vec<f64>>,
    /// Overlap statistic, possibly non-numeric.
    pub resonance_overlap_percent: Option<RawNumber>,
    /// Server severity label.
    pub alert_level: Option<String>,
    /// Day the payload claims to be for.
    pub day: Option<i64>,
}

impl TryFrom<RawFrame> for CymaticFrame {
    type Error = PayloadError;

    fn try_from(raw: RawFrame) -> Result<Self, Self::Error> {
        let overlap = match raw.resonance_overlap_percent {
            None => return Err(PayloadError::MissingOverlap),
            Some(RawNumber::Number(v)) if v.is_finite() => v,
            Some(RawNumber::Number(v)) => return Err(PayloadError::NonNumericOverlap(v.to_string())),
            Some(RawNumber::Other(s)) => return Err(PayloadError::NonNumericOverlap(s)),
        };

        let nested = raw.wave_field.ok_or(PayloadError::EmptyGrid)?;
        let grid = WaveGrid::from_nested(&nested)?;

        let mut points = Vec::with_capacity(raw.phase_lock_points.len());
        for (index, p) in raw.phase_lock_points.iter().enumerate() {
            match p.as_slice() {
                [x, y, z, ..] => points.push([*x as f32, *y as f32, *z as f32]),
                _ => return Err(PayloadError::MalformedPoint { index }),
            }
        }

        let day = Day::new(raw.day.ok_or(PayloadError::MissingDay)?)?;
        CymaticFrame::new(grid, points, overlap, raw.alert_level, day)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(w: usize, h: usize, c: usize) -> Vec<Vec<Vec<f32>>> {
        (0..w)
            .map(|x| (0..h).map(|y| (0..c).map(|ch| (x * 100 + y * 10 + ch) as f32).collect()).collect())
            .collect()
    }

    fn raw_ok() -> RawFrame {
        RawFrame {
            wave_field: Some(nested(4, 3, 2)),
            phase_lock_points: vec![vec![1.0, 2.0, 3.0, 0.4]],
            resonance_overlap_percent: Some(RawNumber::Number(42.5)),
            alert_level: Some("CRITICAL".into()),
            day: Some(5),
        }
    }

    #[test]
    fn test_day_bounds() {
        assert!(Day::new(0).is_err());
        assert_eq!(Day::new(1).map(Day::get), Ok(1));
        assert_eq!(Day::new(21).map(Day::index), Ok(20));
        assert_eq!(Day::new(22), Err(DayError(22)));
    }

    #[test]
    fn test_location_validation() {
        assert!(Location::new(19.4, -155.3, 100.0).is_ok());
        assert!(matches!(Location::new(91.0, 0.0, 1.0), Err(LocationError::Latitude(_))));
        assert!(matches!(Location::new(0.0, 181.0, 1.0), Err(LocationError::Longitude(_))));
        assert!(matches!(Location::new(0.0, 0.0, 0.0), Err(LocationError::Radius(_))));
        assert!(Location::new(f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_grid_from_nested_indexing() {
        let g = WaveGrid::from_nested(&nested(4, 3, 2)).unwrap();
        assert_eq!((g.width(), g.height(), g.channels()), (4, 3, 2));
        assert_eq!(g.get(2, 1, 0), Some(210.0));
        assert_eq!(g.get(2, 1, 1), Some(211.0));
        assert_eq!(g.get(4, 0, 0), None);
        assert_eq!(g.get(0, 3, 0), None);
    }

    #[test]
    fn test_grid_rejects_ragged_rows() {
        let mut n = nested(3, 3, 1);
        n[1].pop();
        assert!(matches!(
            WaveGrid::from_nested(&n),
            Err(PayloadError::RaggedGrid { x: 1, expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn test_grid_rejects_empty() {
        assert_eq!(WaveGrid::from_nested(&[]), Err(PayloadError::EmptyGrid));
        assert_eq!(WaveGrid::from_flat(0, 1, 1, vec![]), Err(PayloadError::EmptyGrid));
    }

    #[test]
    fn test_peak_amplitude_uses_channel_zero() {
        let g = WaveGrid::from_flat(1, 2, 2, vec![-3.0, 99.0, 1.0, 99.0]).unwrap();
        assert_eq!(g.peak_amplitude(), 3.0);
    }

    #[test]
    fn test_raw_frame_valid() {
        let frame = CymaticFrame::try_from(raw_ok()).unwrap();
        assert_eq!(frame.day().get(), 5);
        assert_eq!(frame.phase_lock_points(), &[[1.0, 2.0, 3.0]]);
        assert_eq!(frame.alert_level(), Some("CRITICAL"));
        assert!((frame.resonance_overlap_percent() - 42.5).abs() < 1e-12);
    }

    #[test]
    fn test_raw_frame_missing_overlap_is_error() {
        let raw = RawFrame { resonance_overlap_percent: None, ..raw_ok() };
        assert_eq!(CymaticFrame::try_from(raw), Err(PayloadError::MissingOverlap));
    }

    #[test]
    fn test_raw_frame_non_numeric_overlap_is_error() {
        let raw = RawFrame {
            resonance_overlap_percent: Some(RawNumber::Other("\"high\"".into())),
            ..raw_ok()
        };
        assert!(matches!(CymaticFrame::try_from(raw), Err(PayloadError::NonNumericOverlap(_))));
    }

    #[test]
    fn test_raw_frame_nan_overlap_is_error() {
        let raw = RawFrame {
            resonance_overlap_percent: Some(RawNumber::Number(f64::NAN)),
            ..raw_ok()
        };
        assert!(matches!(CymaticFrame::try_from(raw), Err(PayloadError::NonNumericOverlap(_))));
    }

    #[test]
    fn test_raw_frame_short_point_is_error() {
        let raw = RawFrame { phase_lock_points: vec![vec![1.0, 2.0]], ..raw_ok() };
        assert_eq!(CymaticFrame::try_from(raw), Err(PayloadError::MalformedPoint { index: 0 }));
    }

    #[test]
    fn test_raw_frame_missing_grid_is_error() {
        let raw = RawFrame { wave_field: None, ..raw_ok() };
        assert_eq!(CymaticFrame::try_from(raw), Err(PayloadError::EmptyGrid));
    }

    #[test]
    fn test_raw_frame_bad_day_is_error() {
        let raw = RawFrame { day: Some(30), ..raw_ok() };
        assert_eq!(CymaticFrame::try_from(raw), Err(PayloadError::Day(DayError(30))));
    }

    #[test]
    fn test_raw_frame_missing_day_is_error() {
        let raw = RawFrame { day: None, ..raw_ok() };
        let err = CymaticFrame::try_from(raw).unwrap_err();
        assert_eq!(err, PayloadError::MissingDay);
        assert_eq!(err.to_string(), "day is missing");
    }
}
