/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Cancellable animation clocks.
//!
//! Two cadences drive per-frame work:
//!
//! - [`TimerClock`]: a background thread ticking on a fixed period (16 ms by
//!   default) for hosts without a redraw callback.
//! - [`FrameClock`]: ticks only when the host calls [`FrameClock::frame`] from
//!   its own redraw callback (display refresh).
//!
//! Both return a [`StopHandle`]. Stopping is idempotent, is also performed on
//! drop, and once `stop` returns the tick function is never invoked again.
//! Calling `stop` from inside the tick function is allowed: the current tick
//! completes and no further tick starts.
//!
//! `dt` passed to the tick is in seconds and clamped to
//! [`ClockConfig::max_dt_secs`] so a stalled host does not produce a huge jump.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::ConfigError;

/// Clock tunables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClockConfig {
    /// Timer period in milliseconds.
    pub period_ms: u64,
    /// Upper bound on a single `dt`, in seconds.
    pub max_dt_secs: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { period_ms: 16, max_dt_secs: 0.25 }
    }
}

impl ClockConfig {
    /// Period must be non-zero, `max_dt_secs` finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::OutOfRange { name: "clock.period_ms", value: 0.0 });
        }
        if !(self.max_dt_secs.is_finite() && self.max_dt_secs > 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "clock.max_dt_secs",
                value: f64::from(self.max_dt_secs),
            });
        }
        Ok(())
    }

    /// Timer period as a [`Duration`].
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

fn clamp_dt(dt: f32, max: f32) -> f32 {
    if dt.is_finite() && dt >= 0.0 { dt.min(max) } else { 0.0 }
}

// ─── StopHandle ─────────────────────────────────────────────────────────────

/// Scoped ownership of a running clock.
///
/// Dropping the handle stops the clock.
#[derive(Debug)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    worker_id: Option<ThreadId>,
}

impl StopHandle {
    fn detached(running: Arc<AtomicBool>) -> Self {
        Self { running, worker: None, worker_id: None }
    }

    /// `true` until [`StopHandle::stop`] is called.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the clock and wait for an in-flight tick to finish.
    ///
    /// When called from the clock's own thread (inside the tick), it only
    /// flags the stop; the loop exits as soon as the tick returns.
    pub fn stop(&mut self) {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        if was_running {
            debug!("animation clock stopped");
        }
        let on_worker = self.worker_id == Some(thread::current().id());
        if on_worker {
            return;
        }
        if let Some(worker) = self.worker.take() {
            // a panicking tick already unwound its own thread
            let _ = worker.join();
        }
    }
}

impl Drop for StopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── TimerClock ─────────────────────────────────────────────────────────────

/// Fixed-period clock on a dedicated thread.
#[derive(Clone, Debug, Default)]
pub struct TimerClock {
    config: ClockConfig,
}

impl TimerClock {
    /// Clock with a validated config.
    pub fn new(config: ClockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Start ticking. `tick` receives `dt` in seconds.
    pub fn start<F>(&self, mut tick: F) -> StopHandle
    where
        F: FnMut(f32) + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let period = self.config.period();
        let max_dt = self.config.max_dt_secs;

        let worker = thread::spawn(move || {
            let mut last = Instant::now();
            loop {
                thread::sleep(period);
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                let now = Instant::now();
                let dt = clamp_dt((now - last).as_secs_f32(), max_dt);
                last = now;
                tick(dt);
            }
        });
        debug!(period_ms = self.config.period_ms, "animation clock started");

        let worker_id = Some(worker.thread().id());
        StopHandle { running, worker: Some(worker), worker_id }
    }
}

// ─── FrameClock ─────────────────────────────────────────────────────────────

type TickFn = Box<dyn FnMut(f32) + Send>;

/// Clock driven by the host's redraw callback.
///
/// The host calls [`FrameClock::frame`] with a monotonic timestamp once per
/// displayed frame; the first frame after `start` ticks with `dt = 0`.
pub struct FrameClock {
    config: ClockConfig,
    tick: Option<TickFn>,
    running: Arc<AtomicBool>,
    last: Option<Duration>,
}

impl FrameClock {
    /// Idle clock.
    pub fn new(config: ClockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            tick: None,
            running: Arc::new(AtomicBool::new(false)),
            last: None,
        })
    }

    /// Install `tick` and arm the clock. Replaces and stops any previous tick.
    pub fn start<F>(&mut self, tick: F) -> StopHandle
    where
        F: FnMut(f32) + Send + 'static,
    {
        self.running.store(false, Ordering::Release);
        self.running = Arc::new(AtomicBool::new(true));
        self.tick = Some(Box::new(tick));
        self.last = None;
        StopHandle::detached(Arc::clone(&self.running))
    }

    /// One host redraw at monotonic time `now`. Returns `true` if `tick` ran.
    pub fn frame(&mut self, now: Duration) -> bool {
        if !self.running.load(Ordering::Acquire) {
            self.tick = None;
            return false;
        }
        let Some(tick) = self.tick.as_mut() else {
            return false;
        };
        let dt = match self.last {
            Some(prev) => clamp_dt(now.saturating_sub(prev).as_secs_f32(), self.config.max_dt_secs),
            None => 0.0,
        };
        self.last = Some(now);
        tick(dt);
        true
    }
}

impl core::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameClock")
            .field("config", &self.config)
            .field("armed", &self.tick.is_some())
            .field("last", &self.last)
            .finish()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
