/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! One visualization instance: selection, frame intake, alerting and ticks.
//!
//! [`CymaticView`] is the only stateful piece of the core. The shell drives it
//! with four inputs (select, resolve, mute, tick) and reads back a [`Scene`],
//! an [`AlertSignal`] and a [`ViewStatus`].
//!
//! # Request lifecycle
//!
//! ```text
//! select(loc, day) ──► ticket n registered ──► collaborator fetches
//!                                                   │
//! resolve(n, result) ◄──────────────────────────────┘
//!   n unknown / superseded / torn down ──► Discarded (no-op)
//!   Err(fetch)                          ──► status Error, last frame kept stale
//!   Ok(raw) invalid                     ──► status Error, last frame kept stale
//!   Ok(raw) valid                       ──► frame replaced, evaluator fed,
//!                                            rising edge handed to the synth
//! ```
//!
//! # Invariants
//!
//! - Only the response for the latest ticket can replace the frame, so a late
//!   response for an earlier selection never overwrites a newer one.
//! - After [`CymaticView::teardown`] every input is a no-op and no tone starts.
//! - An error state belongs to one request; the next `select` clears it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use hashbrown::HashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::alert::{AlertEvaluator, AlertSignal, SeverityBand};
use crate::audio::{AudioAlertSynthesizer, AudioOutput, ToneOutcome};
use crate::clock::{StopHandle, TimerClock};
use crate::color::VisualMode;
use crate::config::CymaticConfig;
use crate::error::{ConfigError, FetchError, LocationError, PayloadError, ViewError};
use crate::frame::{CymaticFrame, Day, FrameRequest, Location, RawFrame};
use crate::sampler::WaveFieldSampler;
use crate::scene::{Scene, SceneComposer};
use crate::surface::{OscillatorBank, SurfaceSynthesizer};

/// Where the current request stands.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewStatus {
    /// Nothing selected yet.
    Idle,
    /// Waiting on the response for `ticket`.
    Loading {
        /// Ticket of the outstanding request.
        ticket: u64,
        /// Day it was made for.
        day: Day,
    },
    /// The latest request produced the frame on display.
    Ready,
    /// The latest request failed; a previous frame, if any, is shown stale.
    Error(ViewError),
    /// The view was torn down.
    TornDown,
}

/// Why a response was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discard {
    /// A later selection superseded the request.
    Superseded,
    /// The ticket was never issued or was already resolved.
    Unknown,
    /// The view no longer exists.
    TornDown,
}

/// What [`CymaticView::resolve`] did with a response.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolveOutcome {
    /// The frame is now on display.
    Applied {
        /// Alert state after feeding the frame's overlap.
        signal: AlertSignal,
        /// Outcome of the tone, if the frame produced a rising edge.
        tone: Option<ToneOutcome>,
    },
    /// The response belonged to the current request but was unusable.
    Rejected(ViewError),
    /// The response was ignored.
    Discarded(Discard),
}

/// Supplies frames for requests. Implemented by the shell's network client.
pub trait FrameSource: Send + Sync {
    /// Fetch the payload for `request`. May block.
    fn fetch(&self, request: &FrameRequest) -> Result<RawFrame, FetchError>;
}

// ─── CymaticView ────────────────────────────────────────────────────────────

/// State of one mounted visualization.
#[derive(Debug)]
pub struct CymaticView {
    composer: SceneComposer,
    evaluator: AlertEvaluator,
    synth: AudioAlertSynthesizer,
    in_flight: HashMap<u64, FrameRequest>,
    next_ticket: u64,
    current: Option<FrameRequest>,
    frame: Option<CymaticFrame>,
    signal: AlertSignal,
    status: ViewStatus,
    muted: bool,
    time: f32,
}

impl CymaticView {
    /// Build a view after validating `config`.
    pub fn new(config: CymaticConfig, audio: Box<dyn AudioOutput>) -> Result<Self, ConfigError> {
        config.validate()?;
        let composer = SceneComposer::new(
            WaveFieldSampler::new(config.sampler)?,
            SurfaceSynthesizer::new(config.surface)?,
            config.oscillators,
            config.markers,
            config.mesh,
            config.visual_mode,
        )?;
        Ok(Self {
            composer,
            evaluator: AlertEvaluator::new(config.thresholds),
            synth: AudioAlertSynthesizer::new(audio, config.tone)?,
            in_flight: HashMap::new(),
            next_ticket: 0,
            current: None,
            frame: None,
            signal: AlertSignal::idle(),
            status: ViewStatus::Idle,
            muted: false,
            time: 0.0,
        })
    }

    // ── inputs ──

    /// Select a `(location, day)` pair and issue a request for it.
    ///
    /// Supersedes any outstanding request and clears a previous error.
    pub fn select(&mut self, location: Location, day: Day) -> Result<FrameRequest, LocationError> {
        location.validate()?;
        Ok(self.issue(location, day))
    }

    /// Day selector: re-select the current location for another day.
    ///
    /// `None` before the first [`CymaticView::select`] or after teardown.
    pub fn select_day(&mut self, day: Day) -> Option<FrameRequest> {
        let location = self.current?.location;
        if self.is_torn_down() {
            return None;
        }
        Some(self.issue(location, day))
    }

    /// Re-issue the current selection under a fresh ticket.
    pub fn retry(&mut self) -> Option<FrameRequest> {
        let FrameRequest { location, day, .. } = self.current?;
        if self.is_torn_down() {
            return None;
        }
        debug!(%day, "retrying selection");
        Some(self.issue(location, day))
    }

    fn issue(&mut self, location: Location, day: Day) -> FrameRequest {
        self.next_ticket += 1;
        let request = FrameRequest { ticket: self.next_ticket, location, day };
        if self.is_torn_down() {
            return request;
        }
        self.in_flight.insert(request.ticket, request);
        self.current = Some(request);
        self.status = ViewStatus::Loading { ticket: request.ticket, day };
        debug!(ticket = request.ticket, %day, in_flight = self.in_flight.len(), "frame requested");
        request
    }

    /// Deliver the collaborator's answer for `ticket`.
    pub fn resolve(&mut self, ticket: u64, result: Result<RawFrame, FetchError>) -> ResolveOutcome {
        self.settle(ticket, result.map_err(ViewError::from))
    }

    /// Deliver a JSON response body for `ticket`.
    #[cfg(feature = "serde")]
    pub fn resolve_json(&mut self, ticket: u64, body: Result<&str, FetchError>) -> ResolveOutcome {
        let raw = body
            .map_err(ViewError::from)
            .and_then(|json| crate::wire::decode_frame(json).map_err(ViewError::from));
        self.settle(ticket, raw)
    }

    fn settle(&mut self, ticket: u64, result: Result<RawFrame, ViewError>) -> ResolveOutcome {
        if self.is_torn_down() {
            debug!(ticket, "response after teardown ignored");
            return ResolveOutcome::Discarded(Discard::TornDown);
        }
        let Some(request) = self.in_flight.remove(&ticket) else {
            debug!(ticket, "response for unknown ticket ignored");
            return ResolveOutcome::Discarded(Discard::Unknown);
        };
        if self.current.map(|c| c.ticket) != Some(ticket) {
            debug!(ticket, day = %request.day, "stale response discarded");
            return ResolveOutcome::Discarded(Discard::Superseded);
        }
        // older tickets can no longer win
        self.in_flight.retain(|&t, _| t > ticket);

        let frame =
            result.and_then(|raw| Self::validate(raw, request.day).map_err(ViewError::from));
        match frame {
            Ok(frame) => self.apply(frame),
            Err(err) => {
                warn!(ticket, day = %request.day, %err, "frame request failed");
                self.composer.set_stale(self.frame.is_some());
                self.status = ViewStatus::Error(err.clone());
                ResolveOutcome::Rejected(err)
            }
        }
    }

    fn validate(raw: RawFrame, day: Day) -> Result<CymaticFrame, PayloadError> {
        let frame = CymaticFrame::try_from(raw)?;
        if frame.day() != day {
            return Err(PayloadError::DayMismatch { expected: day.get(), got: frame.day().get() });
        }
        Ok(frame)
    }

    fn apply(&mut self, frame: CymaticFrame) -> ResolveOutcome {
        let signal = self
            .evaluator
            .evaluate(frame.resonance_overlap_percent(), frame.alert_level());
        let tone = self
            .evaluator
            .take_rising_edge()
            .map(|edge| self.synth.maybe_sound(edge, self.muted));

        debug!(day = %frame.day(), band = %signal.band, "frame applied");
        self.frame = Some(frame);
        self.signal = signal.clone();
        self.status = ViewStatus::Ready;
        self.composer.set_stale(false);
        ResolveOutcome::Applied { signal, tone }
    }

    /// Mute or unmute. Affects only tones for future rising edges.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Switch the mesh palette.
    pub fn set_visual_mode(&mut self, mode: VisualMode) {
        self.composer.set_mode(mode);
    }

    /// Swap the sphere's oscillator bank, e.g. after the magma type changes.
    pub fn set_bank(&mut self, bank: OscillatorBank) {
        self.composer.set_bank(bank);
    }

    /// Advance animation time by `dt` seconds and recompose.
    ///
    /// `None` until a frame has arrived, and after teardown.
    pub fn tick(&mut self, dt: f32) -> Option<&Scene> {
        if self.is_torn_down() {
            return None;
        }
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
        let frame = self.frame.as_ref()?;
        let intensity = (frame.resonance_overlap_percent() / 100.0).clamp(0.0, 1.0) as f32;
        Some(self.composer.compose(frame, self.signal.band, self.time, intensity, 1.0))
    }

    /// Release everything: pending requests become no-ops, no tone starts again.
    pub fn teardown(&mut self) {
        if self.is_torn_down() {
            return;
        }
        self.in_flight.clear();
        self.synth.shutdown();
        self.evaluator.reset();
        self.composer.clear();
        self.frame = None;
        self.signal = AlertSignal::idle();
        self.status = ViewStatus::TornDown;
        debug!("view torn down");
    }

    // ── outputs ──

    /// Latest alert state for banners.
    pub fn alert_signal(&self) -> &AlertSignal {
        &self.signal
    }

    /// Current band; NORMAL before the first frame.
    pub fn band(&self) -> SeverityBand {
        self.signal.band
    }

    /// Request status.
    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    /// Frame on display.
    pub fn frame(&self) -> Option<&CymaticFrame> {
        self.frame.as_ref()
    }

    /// Last composed scene.
    pub fn scene(&self) -> &Scene {
        self.composer.scene()
    }

    /// The latest selection.
    pub fn current_request(&self) -> Option<&FrameRequest> {
        self.current.as_ref()
    }

    /// Requests issued and not yet resolved or superseded.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Mute flag.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Rising edges seen over the view's life.
    pub fn edge_count(&self) -> u64 {
        self.evaluator.edge_count()
    }

    /// Tones played over the view's life.
    pub fn tones_played(&self) -> u64 {
        self.synth.played()
    }

    /// `true` after teardown.
    pub fn is_torn_down(&self) -> bool {
        self.status == ViewStatus::TornDown
    }
}

// ─── Threaded hosting ───────────────────────────────────────────────────────

/// A view shared between the render loop and fetch workers.
pub type SharedView = Arc<Mutex<CymaticView>>;

/// Wrap a view for threaded hosting.
pub fn share(view: CymaticView) -> SharedView {
    Arc::new(Mutex::new(view))
}

/// Fetch `request` on a worker thread and resolve it into `view`.
pub fn spawn_fetch(
    view: &SharedView,
    source: Arc<dyn FrameSource>,
    request: FrameRequest,
) -> JoinHandle<()> {
    let view = Arc::clone(view);
    thread::spawn(move || {
        let result = source.fetch(&request);
        view.lock().resolve(request.ticket, result);
    })
}

/// Tick `view` from a [`TimerClock`].
pub fn spawn_render_loop(view: &SharedView, clock: &TimerClock) -> StopHandle {
    let view = Arc::clone(view);
    clock.start(move |dt| {
        view.lock().tick(dt);
    })
}

/// Scoped mount of a shared view and its render loop.
///
/// Closing (or dropping) stops the clock first, then tears the view down, so
/// no tick runs against a torn-down view and no lock is held while joining.
#[derive(Debug)]
pub struct ViewSession {
    view: SharedView,
    clock: Option<StopHandle>,
}

impl ViewSession {
    /// Start a render loop for `view`.
    pub fn mount(view: SharedView, clock: &TimerClock) -> Self {
        let handle = spawn_render_loop(&view, clock);
        Self { view, clock: Some(handle) }
    }

    /// The mounted view.
    pub fn view(&self) -> &SharedView {
        &self.view
    }

    /// Issue `request` through `source` on a worker.
    pub fn fetch(&self, source: Arc<dyn FrameSource>, request: FrameRequest) -> JoinHandle<()> {
        spawn_fetch(&self.view, source, request)
    }

    /// Unmount: stop the clock, then tear the view down.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.stop();
            self.view.lock().teardown();
        }
    }
}

impl Drop for ViewSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
