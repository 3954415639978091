/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! One-shot alert tone for rising edges into CRITICAL.
//!
//! The tone is a 1.5 s sine sweeping 800 → 400 → 800 Hz while its gain decays
//! exponentially from 0.3 to near silence. It is rendered to PCM and written
//! to a [`Voice`] opened on an [`AudioOutput`]; the voice is closed when the
//! write finishes, fails, or unwinds.
//!
//! # Invariants
//!
//! - A [`RisingEdge`] is consumed by [`AudioAlertSynthesizer::maybe_sound`],
//!   so one edge can start at most one tone.
//! - Muted or shut-down synthesizers never open a voice.
//! - Audio failures are logged and returned as [`ToneOutcome::Failed`]; they
//!   never propagate as errors.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::alert::RisingEdge;
use crate::error::{AudioError, ConfigError};

// ─── ToneSpec ───────────────────────────────────────────────────────────────

/// Shape of the alert tone.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToneSpec {
    /// Total length in seconds.
    pub duration_secs: f32,
    /// Frequency at the start and end of the sweep (Hz).
    pub edge_hz: f32,
    /// Frequency at the midpoint of the sweep (Hz).
    pub mid_hz: f32,
    /// Gain at t = 0.
    pub start_gain: f32,
    /// Gain at t = duration. Must be > 0 for the exponential ramp.
    pub end_gain: f32,
    /// Output sample rate.
    pub sample_rate: u32,
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self {
            duration_secs: 1.5,
            edge_hz: 800.0,
            mid_hz: 400.0,
            start_gain: 0.3,
            end_gain: 0.001,
            sample_rate: 44_100,
        }
    }
}

impl ToneSpec {
    /// Reject shapes that cannot be rendered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("tone.duration_secs", self.duration_secs),
            ("tone.edge_hz", self.edge_hz),
            ("tone.mid_hz", self.mid_hz),
            ("tone.start_gain", self.start_gain),
            ("tone.end_gain", self.end_gain),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
            if v <= 0.0 {
                return Err(ConfigError::OutOfRange { name, value: f64::from(v) });
            }
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::OutOfRange { name: "tone.sample_rate", value: 0.0 });
        }
        Ok(())
    }

    /// Number of PCM frames in the tone.
    pub fn sample_count(&self) -> usize {
        (self.duration_secs * self.sample_rate as f32).round() as usize
    }

    /// Instantaneous frequency: linear down to `mid_hz` at the midpoint, then back up.
    pub fn frequency_at(&self, t: f32) -> f32 {
        let half = self.duration_secs * 0.5;
        let t = t.clamp(0.0, self.duration_secs);
        if t <= half {
            self.edge_hz + (self.mid_hz - self.edge_hz) * (t / half)
        } else {
            self.mid_hz + (self.edge_hz - self.mid_hz) * ((t - half) / half)
        }
    }

    /// Instantaneous gain: exponential ramp from `start_gain` to `end_gain`.
    pub fn gain_at(&self, t: f32) -> f32 {
        let frac = (t / self.duration_secs).clamp(0.0, 1.0);
        self.start_gain * (self.end_gain / self.start_gain).powf(frac)
    }

    /// Render mono PCM in [-1, 1].
    pub fn render(&self) -> Vec<f32> {
        let n = self.sample_count();
        let dt = 1.0 / self.sample_rate as f32;
        let mut phase = 0.0f32;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f32 * dt;
            out.push(phase.sin() * self.gain_at(t));
            phase = (phase + core::f32::consts::TAU * self.frequency_at(t) * dt) % core::f32::consts::TAU;
        }
        out
    }
}

// ─── Output seam ────────────────────────────────────────────────────────────

/// A host audio device.
pub trait AudioOutput: Send {
    /// Acquire a voice. Fails when no device is present or access is denied.
    fn open_voice(&mut self, sample_rate: u32) -> Result<Box<dyn Voice>, AudioError>;
}

/// One acquired playback channel. Released by [`Voice::close`].
pub trait Voice: Send {
    /// Queue mono samples.
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError>;
    /// Release the underlying resource. Called exactly once.
    fn close(&mut self);
}

/// Closes its voice on drop, whatever path leaves the scope.
struct VoiceGuard(Box<dyn Voice>);

impl Drop for VoiceGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Output with no device: every open fails with [`AudioError::Unavailable`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn open_voice(&mut self, _sample_rate: u32) -> Result<Box<dyn Voice>, AudioError> {
        Err(AudioError::Unavailable)
    }
}

/// Shared record of what a [`CaptureOutput`] received.
#[derive(Debug, Default)]
pub struct CaptureLog {
    /// Each completed tone's samples.
    pub tones: Vec<Vec<f32>>,
    /// Voices opened.
    pub opened: usize,
    /// Voices closed.
    pub closed: usize,
}

/// Offline output that keeps every tone in memory, for headless hosts and
/// tests. Clones share one log.
#[derive(Clone, Debug, Default)]
pub struct CaptureOutput {
    log: Arc<Mutex<CaptureLog>>,
    fail_writes: bool,
}

impl CaptureOutput {
    /// Capture into a fresh log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture whose voices open but reject every write.
    pub fn failing_writes() -> Self {
        Self { fail_writes: true, ..Self::default() }
    }

    /// Number of tones fully written.
    pub fn tone_count(&self) -> usize {
        self.log.lock().tones.len()
    }

    /// `(opened, closed)` voice counts.
    pub fn voice_counts(&self) -> (usize, usize) {
        let log = self.log.lock();
        (log.opened, log.closed)
    }

    /// Copy of the samples of tone `i`.
    pub fn tone(&self, i: usize) -> Option<Vec<f32>> {
        self.log.lock().tones.get(i).cloned()
    }
}

impl AudioOutput for CaptureOutput {
    fn open_voice(&mut self, _sample_rate: u32) -> Result<Box<dyn Voice>, AudioError> {
        self.log.lock().opened += 1;
        Ok(Box::new(CaptureVoice {
            log: Arc::clone(&self.log),
            buffer: Vec::new(),
            fail_writes: self.fail_writes,
        }))
    }
}

struct CaptureVoice {
    log: Arc<Mutex<CaptureLog>>,
    buffer: Vec<f32>,
    fail_writes: bool,
}

impl Voice for CaptureVoice {
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        if self.fail_writes {
            return Err(AudioError::Write("capture configured to fail".into()));
        }
        self.buffer.extend_from_slice(samples);
        Ok(())
    }

    fn close(&mut self) {
        let mut log = self.log.lock();
        if !self.buffer.is_empty() {
            log.tones.push(core::mem::take(&mut self.buffer));
        }
        log.closed += 1;
    }
}

// ─── AudioAlertSynthesizer ──────────────────────────────────────────────────

/// Result of one [`AudioAlertSynthesizer::maybe_sound`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToneOutcome {
    /// The tone was written and the voice released.
    Played,
    /// Muted: the edge was consumed silently.
    Muted,
    /// The synthesizer was shut down; nothing starts any more.
    ShutDown,
    /// The audio path failed; logged and swallowed.
    Failed(AudioError),
}

/// Plays the alert tone on rising edges.
pub struct AudioAlertSynthesizer {
    output: Box<dyn AudioOutput>,
    spec: ToneSpec,
    pcm: Option<Vec<f32>>,
    shut_down: bool,
    played: u64,
}

impl AudioAlertSynthesizer {
    /// Synthesizer writing to `output`.
    pub fn new(output: Box<dyn AudioOutput>, spec: ToneSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self { output, spec, pcm: None, shut_down: false, played: 0 })
    }

    /// Synthesizer with no device; every edge fails silently.
    pub fn silent() -> Self {
        Self {
            output: Box::new(NullOutput),
            spec: ToneSpec::default(),
            pcm: None,
            shut_down: false,
            played: 0,
        }
    }

    /// Tone shape.
    pub fn spec(&self) -> &ToneSpec {
        &self.spec
    }

    /// Tones played to completion.
    pub fn played(&self) -> u64 {
        self.played
    }

    /// `true` after [`AudioAlertSynthesizer::shutdown`].
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Consume `edge` and play the tone unless muted or shut down.
    pub fn maybe_sound(&mut self, edge: RisingEdge, muted: bool) -> ToneOutcome {
        if self.shut_down {
            debug!(edge = edge.sequence(), "tone suppressed after shutdown");
            return ToneOutcome::ShutDown;
        }
        if muted {
            debug!(edge = edge.sequence(), "tone suppressed by mute");
            return ToneOutcome::Muted;
        }
        match self.play() {
            Ok(()) => {
                self.played += 1;
                info!(edge = edge.sequence(), "alert tone played");
                ToneOutcome::Played
            }
            Err(err) => {
                warn!(edge = edge.sequence(), %err, "alert tone failed");
                ToneOutcome::Failed(err)
            }
        }
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let voice = self.output.open_voice(self.spec.sample_rate)?;
        let mut guard = VoiceGuard(voice);
        let pcm = self.pcm.get_or_insert_with(|| self.spec.render());
        guard.0.write(pcm)
    }

    /// Refuse every future tone. A tone already written is not recalled.
    pub fn shutdown(&mut self) {
        self.shut_down = true;
    }
}

impl core::fmt::Debug for AudioAlertSynthesizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioAlertSynthesizer")
            .field("spec", &self.spec)
            .field("shut_down", &self.shut_down)
            .field("played", &self.played)
            .finish_non_exhaustive()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
