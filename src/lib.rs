//! # cymatic-core
//!
//! Real-time wave-field visualization and threshold alerting for 21-day hazard
//! forecasts.
//!
//! ---
//!
//! ## What it does
//!
//! A forecast backend hands over one [`CymaticFrame`] per `(location, day)`: a
//! `[x][y][channel]` scalar grid, a set of phase-lock points, and a resonance
//! overlap percentage. The core turns that into three things:
//!
//! **An animated mesh.** Every tick the grid is sampled under each vertex of a
//! 50×50 plane and a traveling wave is added, so the surface moves even when
//! the grid is static. A sphere variant displaces radially with up to three
//! oscillators instead.
//!
//! **A severity band.** The overlap is classified against an injected
//! [`ThresholdTable`]. The backend's own label is compared but never trusted.
//!
//! **A one-shot alarm.** Entering CRITICAL produces a [`RisingEdge`] token.
//! Consuming it plays at most one 1.5 s tone, unless muted.
//!
//! ## The pipeline
//!
//! ```text
//! select(loc, day) ─► FrameSource ─► resolve ─► CymaticFrame
//!                                                  │
//!                          ┌───────────────────────┼───────────────────────┐
//!                          ▼                       ▼                       ▼
//!                  WaveFieldSampler         AlertEvaluator          PhaseLockMarkerLayer
//!                  SurfaceSynthesizer             │ RisingEdge              ▲
//!                          │                       ▼                       │ band
//!                          └──► SceneComposer ◄─ AudioAlertSynthesizer ────┘
//!                                    ▲
//!                              TimerClock / FrameClock
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`frame`] | [`CymaticFrame`], [`RawFrame`], [`Day`], [`Location`] | Payload model and validation |
//! | [`sampler`] | [`WaveFieldSampler`] | Grid + traveling wave → vertex height |
//! | [`surface`] | [`SurfaceSynthesizer`], [`OscillatorBank`], [`MagmaType`] | Three-oscillator sphere deformation |
//! | [`markers`] | [`PhaseLockMarkerLayer`] | Severity-colored point markers |
//! | [`alert`] | [`SeverityBand`], [`ThresholdTable`], [`AlertEvaluator`] | Classification and rising-edge state machine |
//! | [`audio`] | [`AudioAlertSynthesizer`], [`ToneSpec`] | 800 → 400 → 800 Hz alert tone |
//! | [`clock`] | [`TimerClock`], [`FrameClock`], [`StopHandle`] | Cancellable animation clocks |
//! | [`scene`] | [`SceneComposer`], [`Scene`] | Per-tick scene assembly |
//! | [`view`] | [`CymaticView`], [`ViewSession`] | Request tickets, stale rejection, teardown |
//! | [`field`] | [`field::FieldGenerator`] | Reference frame generator |
//! | [`config`] | [`CymaticConfig`] | Aggregate configuration |
//! | [`color`] | [`Rgb`], [`VisualMode`] | Colors and palettes |
//! | [`wire`] | [`wire::FrameRecord`] | JSON payload format (requires `serde` feature) |
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber. Nothing
//! is logged per tick.
//!
//! ## License
//!
//! Business Source License 1.1. Free for evaluation and non-production use.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod color;
pub mod frame;
pub mod sampler;
pub mod surface;
pub mod markers;
pub mod alert;
pub mod audio;
pub mod clock;
pub mod scene;
pub mod config;
pub mod view;
pub mod field;
#[cfg(feature = "serde")]
pub mod wire;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use alert::{AlertEvaluator, AlertSignal, AlertState, CutEdge, RisingEdge, SeverityBand, ThresholdTable};
pub use audio::{AudioAlertSynthesizer, AudioOutput, ToneOutcome, ToneSpec};
pub use clock::{ClockConfig, FrameClock, StopHandle, TimerClock};
pub use color::{Rgb, VisualMode};
pub use config::CymaticConfig;
pub use error::{AudioError, ConfigError, FetchError, PayloadError, ViewError};
pub use frame::{CymaticFrame, Day, FrameRequest, Location, RawFrame, WaveGrid};
pub use markers::{MarkerVisual, PhaseLockMarkerLayer};
pub use sampler::{SamplerConfig, WaveFieldSampler};
pub use scene::{MeshConfig, Scene, SceneComposer};
pub use surface::{MagmaType, OscillatorBank, OscillatorComponent, SurfaceSynthesizer};
pub use view::{CymaticView, FrameSource, SharedView, ViewSession, ViewStatus};
