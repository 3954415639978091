/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! JSON wire format of frame payloads.
//!
//! ```json
//! {
//!   "wave_field": [[[0.1, ...], ...], ...],
//!   "phase_lock_points": [[3.0, 0.0, 0.0, 0.42], ...],
//!   "resonance_overlap_percent": 37.5,
//!   "alert_level": "HIGH",
//!   "day": 4
//! }
//! ```
//!
//! camelCase keys (`waveField`, `phaseLockPoints`, `resonanceOverlapPercent`,
//! `alertLevel`) are accepted too. Decoding is loose: it only
//! produces a [`RawFrame`]. Every semantic check (numeric overlap, rectangular
//! grid, day range) happens in [`CymaticFrame::try_from`].
//!
//! This module requires the `serde` feature.

use serde_json::Value;

use crate::error::PayloadError;
use crate::frame::{CymaticFrame, RawFrame, RawNumber};

/// The payload document as it appears on the wire.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FrameRecord {
    /// Nested `[x][y][channel]` grid, kept untyped until conversion.
    #[serde(default, alias = "waveField", skip_serializing_if = "Option::is_none")]
    pub wave_field: Option<Value>,
    /// Marker coordinates; extra trailing values are carried through.
    #[serde(default, alias = "phaseLockPoints")]
    pub phase_lock_points: Vec<Vec<f64>>,
    /// Overlap statistic, any JSON type.
    #[serde(default, alias = "resonanceOverlapPercent", skip_serializing_if = "Option::is_none")]
    pub resonance_overlap_percent: Option<Value>,
    /// Server severity label.
    #[serde(default, alias = "alertLevel", skip_serializing_if = "Option::is_none")]
    pub alert_level: Option<String>,
    /// Forecast day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i64>,
}

impl TryFrom<FrameRecord> for RawFrame {
    type Error = PayloadError;

    fn try_from(record: FrameRecord) -> Result<Self, Self::Error> {
        let wave_field = match record.wave_field {
            None | Some(Value::Null) => None,
            Some(v) => Some(
                serde_json::from_value::<Vec<Vec<Vec<f32>>>>(v)
                    .map_err(|e| PayloadError::Decode(format!("wave_field: {e}")))?,
            ),
        };
        let resonance_overlap_percent = match record.resonance_overlap_percent {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(match n.as_f64() {
                Some(v) => RawNumber::Number(v),
                None => RawNumber::Other(n.to_string()),
            }),
            Some(Value::String(s)) => Some(RawNumber::Other(s)),
            Some(other) => Some(RawNumber::Other(other.to_string())),
        };
        Ok(RawFrame {
            wave_field,
            phase_lock_points: record.phase_lock_points,
            resonance_overlap_percent,
            alert_level: record.alert_level,
            day: record.day,
        })
    }
}

impl From<RawFrame> for FrameRecord {
    fn from(raw: RawFrame) -> Self {
        let overlap = raw.resonance_overlap_percent.map(|n| match n {
            RawNumber::Number(v) => serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number),
            RawNumber::Other(s) => Value::String(s),
        });
        Self {
            wave_field: raw.wave_field.map(|grid| {
                Value::Array(
                    grid.into_iter()
                        .map(|row| {
                            Value::Array(
                                row.into_iter()
                                    .map(|cell| {
                                        Value::Array(
                                            cell.into_iter()
                                                .map(|v| {
                                                    serde_json::Number::from_f64(f64::from(v))
                                                        .map_or(Value::Null, Value::Number)
                                                })
                                                .collect(),
                                        )
                                    })
                                    .collect(),
                            )
                        })
                        .collect(),
                )
            }),
            phase_lock_points: raw.phase_lock_points,
            resonance_overlap_percent: overlap,
            alert_level: raw.alert_level,
            day: raw.day,
        }
    }
}

/// Decode a payload document. Only malformed JSON or wrongly typed fields fail here.
pub fn decode_frame(json: &str) -> Result<RawFrame, PayloadError> {
    let record: FrameRecord =
        serde_json::from_str(json).map_err(|e| PayloadError::Decode(e.to_string()))?;
    RawFrame::try_from(record)
}

/// Decode and validate in one step.
pub fn parse_frame(json: &str) -> Result<CymaticFrame, PayloadError> {
    CymaticFrame::try_from(decode_frame(json)?)
}

/// Encode a payload in wire shape.
pub fn encode_frame(raw: RawFrame) -> Result<String, PayloadError> {
    serde_json::to_string(&FrameRecord::from(raw)).map_err(|e| PayloadError::Decode(e.to_string()))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
