/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Severity classification and the rising-edge state machine.
//!
//! - [`SeverityBand`]: NORMAL < ELEVATED < HIGH < CRITICAL.
//! - [`ThresholdTable`]: injected step function from a scalar to a band.
//! - [`AlertState`]: current/previous band plus the "already sounded" flag.
//! - [`AlertEvaluator`]: owns the table and the state; hands out at most one
//!   [`RisingEdge`] per entry into CRITICAL.
//!
//! # Threshold tables
//!
//! Two tables are in use by different views and they do not agree:
//!
//! | Table | Cut points | Bands | Edge |
//! |-------|-----------|-------|------|
//! | [`ThresholdTable::overlap_percent`] | 35 / 52 | ELEVATED / CRITICAL | above |
//! | [`ThresholdTable::probability`] | 0.4 / 0.6 / 0.8 | ELEVATED / HIGH / CRITICAL | at or above |
//! | [`ThresholdTable::probability_percent`] | 40 / 60 / 80 | ELEVATED / HIGH / CRITICAL | at or above |
//! | [`ThresholdTable::backend_hint`] | 20 / 40 | HIGH / CRITICAL | above |
//!
//! The table is always configuration, never a constant at the call site.
//!
//! # Boundary rule
//!
//! Each table carries its own [`CutEdge`]. The overlap and backend tables use
//! [`CutEdge::Above`]: a band applies only when the value is strictly greater
//! than its cut, so 52.0 is ELEVATED and 52.1 is CRITICAL. The probability
//! tables use [`CutEdge::AtOrAbove`]: 0.6 is already HIGH and 0.8 is already
//! CRITICAL.
//!
//! # Invariants
//!
//! - `classify` is monotone: `a < b ⇒ classify(a) ≤ classify(b)`.
//! - `advance` is a pure function of `(state, value)`; re-running it with the
//!   same inputs yields the same state and never fabricates an edge.
//! - One rising edge per transition into CRITICAL; leaving CRITICAL re-arms it.

use tracing::{info, warn};

use crate::color::Rgb;
use crate::error::ConfigError;

// ─── SeverityBand ───────────────────────────────────────────────────────────

/// Discretised hazard level, totally ordered by severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum SeverityBand {
    /// Background level.
    #[default]
    Normal,
    /// Above background.
    Elevated,
    /// Likely event.
    High,
    /// Imminent; the only band that triggers the audio cue.
    Critical,
}

impl SeverityBand {
    /// All bands in ascending order.
    pub const ALL: [SeverityBand; 4] = [
        SeverityBand::Normal,
        SeverityBand::Elevated,
        SeverityBand::High,
        SeverityBand::Critical,
    ];

    /// Upper-case label.
    pub fn label(self) -> &'static str {
        match self {
            SeverityBand::Normal => "NORMAL",
            SeverityBand::Elevated => "ELEVATED",
            SeverityBand::High => "HIGH",
            SeverityBand::Critical => "CRITICAL",
        }
    }

    /// Color for alert overlays: saturated red when CRITICAL, yellow otherwise.
    pub fn alert_color(self) -> Rgb {
        match self {
            SeverityBand::Critical => Rgb::RED,
            _ => Rgb::YELLOW,
        }
    }

    /// Banner tint, one per band.
    pub fn banner_tint(self) -> [u8; 3] {
        match self {
            SeverityBand::Normal => [34, 197, 94],    // Green
            SeverityBand::Elevated => [234, 179, 8],  // Yellow
            SeverityBand::High => [249, 115, 22],     // Orange
            SeverityBand::Critical => [239, 68, 68],  // Red
        }
    }
}

impl core::fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Server alert vocabulary ────────────────────────────────────────────────

/// The collaborator's own severity label, parsed but not trusted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerAlertLevel {
    /// A label that maps onto a band.
    Known(SeverityBand),
    /// A label nobody recognises, kept verbatim.
    Unrecognised(String),
}

impl ServerAlertLevel {
    /// Parse severity names and volcanic color codes, case-insensitively.
    pub fn parse(label: &str) -> Self {
        let band = match label.trim().to_ascii_uppercase().as_str() {
            "NORMAL" | "LOW" | "MODERATE" | "GREEN" => Some(SeverityBand::Normal),
            "ELEVATED" | "YELLOW" => Some(SeverityBand::Elevated),
            "HIGH" | "ORANGE" => Some(SeverityBand::High),
            "CRITICAL" | "RED" => Some(SeverityBand::Critical),
            _ => None,
        };
        match band {
            Some(b) => ServerAlertLevel::Known(b),
            None => ServerAlertLevel::Unrecognised(label.to_owned()),
        }
    }

    /// The mapped band, if the label was recognised.
    pub fn band(&self) -> Option<SeverityBand> {
        match self {
            ServerAlertLevel::Known(b) => Some(*b),
            ServerAlertLevel::Unrecognised(_) => None,
        }
    }
}

// ─── ThresholdTable ─────────────────────────────────────────────────────────

/// Whether a value equal to a cut point belongs to the band above it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CutEdge {
    /// `value > cut` enters the band (cut is exclusive).
    #[default]
    Above,
    /// `value >= cut` enters the band (cut is inclusive).
    AtOrAbove,
}

/// One step of a threshold table.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cut {
    /// Cut point.
    pub at: f64,
    /// Band entered past the cut.
    pub band: SeverityBand,
}

/// Monotone step function from a scalar statistic to a [`SeverityBand`].
///
/// Values at or below the first cut are NORMAL.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ThresholdTableDef"))]
pub struct ThresholdTable {
    cuts: Vec<Cut>,
    edge: CutEdge,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ThresholdTableDef {
    cuts: Vec<Cut>,
    #[serde(default)]
    edge: CutEdge,
}

#[cfg(feature = "serde")]
impl TryFrom<ThresholdTableDef> for ThresholdTable {
    type Error = ConfigError;

    fn try_from(def: ThresholdTableDef) -> Result<Self, Self::Error> {
        ThresholdTable::new(def.cuts, def.edge)
    }
}

impl ThresholdTable {
    /// Validate and build a table.
    ///
    /// Cuts must be finite and strictly increasing; bands must be strictly
    /// increasing and above NORMAL.
    pub fn new(cuts: Vec<Cut>, edge: CutEdge) -> Result<Self, ConfigError> {
        if cuts.is_empty() {
            return Err(ConfigError::EmptyThresholds);
        }
        let mut prev: Option<Cut> = None;
        for (i, c) in cuts.iter().enumerate() {
            if !c.at.is_finite() || prev.is_some_and(|p| c.at <= p.at) {
                return Err(ConfigError::UnorderedCuts(i));
            }
            let floor = prev.map_or(SeverityBand::Normal, |p| p.band);
            if c.band <= floor {
                return Err(ConfigError::UnorderedBands(i));
            }
            prev = Some(*c);
        }
        Ok(Self { cuts, edge })
    }

    /// Wave-field overlap table: ELEVATED past 35 %, CRITICAL past 52 %.
    pub fn overlap_percent() -> Self {
        Self {
            cuts: vec![
                Cut { at: 35.0, band: SeverityBand::Elevated },
                Cut { at: 52.0, band: SeverityBand::Critical },
            ],
            edge: CutEdge::Above,
        }
    }

    /// Sphere-view probability table on [0, 1]: ELEVATED from 0.4, HIGH from
    /// 0.6, CRITICAL from 0.8. Cuts are inclusive.
    pub fn probability() -> Self {
        Self {
            cuts: vec![
                Cut { at: 0.4, band: SeverityBand::Elevated },
                Cut { at: 0.6, band: SeverityBand::High },
                Cut { at: 0.8, band: SeverityBand::Critical },
            ],
            edge: CutEdge::AtOrAbove,
        }
    }

    /// [`ThresholdTable::probability`] expressed in percent: 40 / 60 / 80.
    pub fn probability_percent() -> Self {
        Self {
            cuts: vec![
                Cut { at: 40.0, band: SeverityBand::Elevated },
                Cut { at: 60.0, band: SeverityBand::High },
                Cut { at: 80.0, band: SeverityBand::Critical },
            ],
            edge: CutEdge::AtOrAbove,
        }
    }

    /// The backend's own labelling rule: HIGH past 20 %, CRITICAL past 40 %.
    pub fn backend_hint() -> Self {
        Self {
            cuts: vec![
                Cut { at: 20.0, band: SeverityBand::High },
                Cut { at: 40.0, band: SeverityBand::Critical },
            ],
            edge: CutEdge::Above,
        }
    }

    /// Same bands with every cut multiplied by `factor`.
    ///
    /// The result is validated like [`ThresholdTable::new`], so a zero,
    /// negative or non-finite factor is rejected.
    pub fn scaled(&self, factor: f64) -> Result<Self, ConfigError> {
        let cuts = self.cuts.iter().map(|c| Cut { at: c.at * factor, band: c.band }).collect();
        Self::new(cuts, self.edge)
    }

    /// Replace the boundary rule.
    pub fn with_edge(mut self, edge: CutEdge) -> Self {
        self.edge = edge;
        self
    }

    /// Cut points in ascending order.
    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    /// Active boundary rule.
    pub fn edge(&self) -> CutEdge {
        self.edge
    }

    /// Classify a value. NaN compares false against every cut and is NORMAL.
    pub fn classify(&self, value: f64) -> SeverityBand {
        let passes = |cut: f64| match self.edge {
            CutEdge::Above => value > cut,
            CutEdge::AtOrAbove => value >= cut,
        };
        self.cuts
            .iter()
            .take_while(|c| passes(c.at))
            .last()
            .map_or(SeverityBand::Normal, |c| c.band)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::overlap_percent()
    }
}

// ─── AlertState ─────────────────────────────────────────────────────────────

/// Evaluator state between samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertState {
    /// Band of the latest sample.
    pub current_band: SeverityBand,
    /// Band of the sample before it.
    pub previous_band: SeverityBand,
    /// `true` once the cue for the current CRITICAL stretch has been handled.
    pub sounded_for_current_band: bool,
}

impl AlertState {
    /// State after the very first sample.
    ///
    /// The pre-history is taken as NORMAL, so a first sample that is already
    /// CRITICAL is a rising edge.
    pub fn initial(band: SeverityBand) -> Self {
        Self {
            current_band: band,
            previous_band: SeverityBand::Normal,
            sounded_for_current_band: false,
        }
    }

    /// `true` while in CRITICAL with the cue not yet handled.
    pub fn edge_pending(&self) -> bool {
        self.current_band == SeverityBand::Critical && !self.sounded_for_current_band
    }

    /// Transition on a new band.
    pub fn advance_band(self, new_band: SeverityBand) -> Self {
        let critical = SeverityBand::Critical;
        let sounded = if new_band != critical {
            false
        } else if self.current_band != critical {
            // rising edge: arm the cue
            false
        } else {
            self.sounded_for_current_band
        };
        Self {
            current_band: new_band,
            previous_band: self.current_band,
            sounded_for_current_band: sounded,
        }
    }
}

/// Proof that a rising edge into CRITICAL occurred and has not been handled.
///
/// Only [`AlertEvaluator::take_rising_edge`] creates one, at most once per edge.
#[derive(Debug, PartialEq, Eq)]
pub struct RisingEdge {
    seq: u64,
}

impl RisingEdge {
    /// 1-based count of edges seen by the evaluator that issued this one.
    pub fn sequence(&self) -> u64 {
        self.seq
    }
}

/// What the shell sees after each sample.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlertSignal {
    /// Locally computed band.
    pub band: SeverityBand,
    /// `true` if this sample crossed into CRITICAL.
    pub just_entered_critical: bool,
    /// Band parsed from the collaborator's label, if recognised.
    pub server_band: Option<SeverityBand>,
    /// Collaborator label present, recognised, and different from `band`.
    pub hint_disagrees: bool,
}

impl AlertSignal {
    /// Signal before any sample has been classified.
    pub fn idle() -> Self {
        Self {
            band: SeverityBand::Normal,
            just_entered_critical: false,
            server_band: None,
            hint_disagrees: false,
        }
    }
}

// ─── AlertEvaluator ─────────────────────────────────────────────────────────

/// Owns the threshold table and the [`AlertState`].
///
/// The state is created by the first sample and dropped by [`AlertEvaluator::reset`].
#[derive(Clone, Debug)]
pub struct AlertEvaluator {
    table: ThresholdTable,
    state: Option<AlertState>,
    edges: u64,
}

impl AlertEvaluator {
    /// Evaluator with no state yet.
    pub fn new(table: ThresholdTable) -> Self {
        Self { table, state: None, edges: 0 }
    }

    /// The injected table.
    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Current state, `None` before the first sample.
    pub fn state(&self) -> Option<AlertState> {
        self.state
    }

    /// Number of rising edges observed over this evaluator's life.
    pub fn edge_count(&self) -> u64 {
        self.edges
    }

    /// Classify with the injected table.
    pub fn classify(&self, value: f64) -> SeverityBand {
        self.table.classify(value)
    }

    /// Pure transition: `None` prior state means "first sample".
    pub fn advance(&self, state: Option<AlertState>, value: f64) -> AlertState {
        let band = self.classify(value);
        match state {
            None => AlertState::initial(band),
            Some(s) => s.advance_band(band),
        }
    }

    /// Feed one sample, update the owned state, and report.
    ///
    /// `server_label` is the collaborator's severity string, compared but never
    /// used to decide the band.
    pub fn evaluate(&mut self, value: f64, server_label: Option<&str>) -> AlertSignal {
        let before = self.state;
        let next = self.advance(before, value);
        self.state = Some(next);

        let just_entered_critical = next.edge_pending()
            && before.map_or(true, |s| s.current_band != SeverityBand::Critical);
        if just_entered_critical {
            self.edges += 1;
            info!(value, edge = self.edges, "severity entered CRITICAL");
        }

        let server = server_label.map(ServerAlertLevel::parse);
        let server_band = server.as_ref().and_then(ServerAlertLevel::band);
        let hint_disagrees = server_band.is_some_and(|b| b != next.current_band);
        match &server {
            Some(ServerAlertLevel::Unrecognised(raw)) => {
                warn!(label = %raw, "unrecognised server alert level");
            }
            Some(ServerAlertLevel::Known(b)) if hint_disagrees => {
                warn!(server = %b, local = %next.current_band, value, "server alert level disagrees with local classification");
            }
            _ => {}
        }

        AlertSignal {
            band: next.current_band,
            just_entered_critical,
            server_band,
            hint_disagrees,
        }
    }

    /// Hand out the pending rising edge, marking it handled.
    ///
    /// Returns `None` if no edge is pending; a second call for the same edge
    /// always returns `None`.
    pub fn take_rising_edge(&mut self) -> Option<RisingEdge> {
        let state = self.state.as_mut()?;
        if !state.edge_pending() {
            return None;
        }
        state.sounded_for_current_band = true;
        Some(RisingEdge { seq: self.edges })
    }

    /// Current signal without feeding a sample.
    pub fn signal(&self) -> AlertSignal {
        match self.state {
            None => AlertSignal::idle(),
            Some(s) => AlertSignal {
                band: s.current_band,
                just_entered_critical: false,
                server_band: None,
                hint_disagrees: false,
            },
        }
    }

    /// Drop the state (teardown). The edge counter survives for diagnostics.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(ThresholdTable::default())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── SeverityBand ──────────────────────────────────────────────────────

    #[test]
    fn test_band_order() {
        assert!(SeverityBand::Normal < SeverityBand::Elevated);
        assert!(SeverityBand::Elevated < SeverityBand::High);
        assert!(SeverityBand::High < SeverityBand::Critical);
    }

    #[test]
    fn test_alert_color() {
        assert_eq!(SeverityBand::Critical.alert_color(), Rgb::RED);
        for b in [SeverityBand::Normal, SeverityBand::Elevated, SeverityBand::High] {
            assert_eq!(b.alert_color(), Rgb::YELLOW);
        }
    }

    // ── ThresholdTable ────────────────────────────────────────────────────

    #[test]
    fn test_overlap_table_bands() {
        let t = ThresholdTable::overlap_percent();
        assert_eq!(t.classify(0.0), SeverityBand::Normal);
        assert_eq!(t.classify(35.0), SeverityBand::Normal);
        assert_eq!(t.classify(35.1), SeverityBand::Elevated);
        assert_eq!(t.classify(52.0), SeverityBand::Elevated);
        assert_eq!(t.classify(52.1), SeverityBand::Critical);
        assert_eq!(t.classify(250.0), SeverityBand::Critical);
    }

    #[test]
    fn test_probability_table_bands() {
        let t = ThresholdTable::probability();
        assert_eq!(t.classify(0.3), SeverityBand::Normal);
        assert_eq!(t.classify(0.5), SeverityBand::Elevated);
        assert_eq!(t.classify(0.7), SeverityBand::High);
        assert_eq!(t.classify(0.9), SeverityBand::Critical);
    }

    #[test]
    fn test_probability_cuts_are_inclusive() {
        let t = ThresholdTable::probability();
        assert_eq!(t.classify(0.4), SeverityBand::Elevated);
        assert_eq!(t.classify(0.6), SeverityBand::High);
        assert_eq!(t.classify(0.8), SeverityBand::Critical);
        assert_eq!(t.classify(0.59), SeverityBand::Elevated);
        let t = ThresholdTable::probability_percent();
        assert_eq!(t.classify(60.0), SeverityBand::High);
        assert_eq!(t.classify(80.0), SeverityBand::Critical);
        // overlap table keeps its exclusive cuts
        assert_eq!(ThresholdTable::overlap_percent().classify(52.0), SeverityBand::Elevated);
    }

    #[test]
    fn test_probability_percent_matches_scaled_probability() {
        let scaled = ThresholdTable::probability().scaled(100.0).unwrap();
        let direct = ThresholdTable::probability_percent();
        for v in [0.0, 39.9, 40.0, 59.9, 60.0, 79.9, 80.0, 100.0] {
            assert_eq!(scaled.classify(v), direct.classify(v), "v = {v}");
        }
    }

    #[test]
    fn test_scaled_rejects_degenerate_factors() {
        let t = ThresholdTable::overlap_percent();
        assert_eq!(t.scaled(-1.0), Err(ConfigError::UnorderedCuts(1)));
        assert_eq!(t.scaled(0.0), Err(ConfigError::UnorderedCuts(1)));
        assert_eq!(t.scaled(f64::NAN), Err(ConfigError::UnorderedCuts(0)));
        assert_eq!(t.scaled(f64::INFINITY), Err(ConfigError::UnorderedCuts(0)));
        assert!(t.scaled(0.01).is_ok());
    }

    #[test]
    fn test_inclusive_edge() {
        let t = ThresholdTable::overlap_percent().with_edge(CutEdge::AtOrAbove);
        assert_eq!(t.classify(52.0), SeverityBand::Critical);
        assert_eq!(t.classify(51.9), SeverityBand::Elevated);
    }

    #[test]
    fn test_nan_is_normal() {
        assert_eq!(ThresholdTable::probability().classify(f64::NAN), SeverityBand::Normal);
    }

    #[test]
    fn test_table_validation() {
        let c = |at, band| Cut { at, band };
        assert_eq!(ThresholdTable::new(vec![], CutEdge::Above), Err(ConfigError::EmptyThresholds));
        assert_eq!(
            ThresholdTable::new(vec![c(5.0, SeverityBand::High), c(5.0, SeverityBand::Critical)], CutEdge::Above),
            Err(ConfigError::UnorderedCuts(1))
        );
        assert_eq!(
            ThresholdTable::new(vec![c(1.0, SeverityBand::High), c(2.0, SeverityBand::Elevated)], CutEdge::Above),
            Err(ConfigError::UnorderedBands(1))
        );
        assert_eq!(
            ThresholdTable::new(vec![c(1.0, SeverityBand::Normal)], CutEdge::Above),
            Err(ConfigError::UnorderedBands(0))
        );
        assert_eq!(
            ThresholdTable::new(vec![c(f64::INFINITY, SeverityBand::High)], CutEdge::Above),
            Err(ConfigError::UnorderedCuts(0))
        );
    }

    // ── State machine ─────────────────────────────────────────────────────

    #[test]
    fn test_advance_is_pure() {
        let ev = AlertEvaluator::new(ThresholdTable::overlap_percent());
        let s = Some(AlertState::initial(SeverityBand::Elevated));
        assert_eq!(ev.advance(s, 60.0), ev.advance(s, 60.0));
    }

    #[test]
    fn test_repeated_critical_samples_edge_once() {
        let mut ev = AlertEvaluator::new(ThresholdTable::overlap_percent());
        assert!(!ev.evaluate(10.0, None).just_entered_critical);
        assert!(ev.evaluate(80.0, None).just_entered_critical);
        assert!(ev.take_rising_edge().is_some());
        for _ in 0..5 {
            assert!(!ev.evaluate(80.0, None).just_entered_critical);
            assert!(ev.take_rising_edge().is_none());
        }
        assert_eq!(ev.edge_count(), 1);
    }

    #[test]
    fn test_first_sample_critical_is_edge() {
        let mut ev = AlertEvaluator::default();
        let sig = ev.evaluate(99.0, None);
        assert!(sig.just_entered_critical);
        assert_eq!(ev.take_rising_edge().map(|e| e.sequence()), Some(1));
    }

    #[test]
    fn test_take_edge_without_state() {
        let mut ev = AlertEvaluator::default();
        assert!(ev.take_rising_edge().is_none());
    }

    #[test]
    fn test_reset_drops_state() {
        let mut ev = AlertEvaluator::default();
        ev.evaluate(99.0, None);
        ev.reset();
        assert_eq!(ev.state(), None);
        assert_eq!(ev.signal(), AlertSignal::idle());
    }

    // ── Server hint ───────────────────────────────────────────────────────

    #[test]
    fn test_server_label_parsing() {
        assert_eq!(ServerAlertLevel::parse("critical").band(), Some(SeverityBand::Critical));
        assert_eq!(ServerAlertLevel::parse("Orange").band(), Some(SeverityBand::High));
        assert_eq!(ServerAlertLevel::parse("GREEN").band(), Some(SeverityBand::Normal));
        assert_eq!(ServerAlertLevel::parse("moderate").band(), Some(SeverityBand::Normal));
        assert_eq!(ServerAlertLevel::parse("Yellow").band(), Some(SeverityBand::Elevated));
        assert_eq!(
            ServerAlertLevel::parse("PURPLE"),
            ServerAlertLevel::Unrecognised("PURPLE".into())
        );
    }

    #[test]
    fn test_hint_disagreement_flagged() {
        let mut ev = AlertEvaluator::new(ThresholdTable::overlap_percent());
        let sig = ev.evaluate(45.0, Some("CRITICAL"));
        assert_eq!(sig.band, SeverityBand::Elevated);
        assert_eq!(sig.server_band, Some(SeverityBand::Critical));
        assert!(sig.hint_disagrees);

        let sig = ev.evaluate(60.0, Some("CRITICAL"));
        assert!(!sig.hint_disagrees);

        let sig = ev.evaluate(60.0, Some("PURPLE"));
        assert_eq!(sig.server_band, None);
        assert!(!sig.hint_disagrees);
    }
}
