//! # Cymatic Forecast Session Simulation
//!
//! Walks a single visualization through a 21-day forecast: days are selected
//! in order, frames come from the reference generator on worker threads, the
//! render loop ticks on a 16 ms timer, and every rising edge into CRITICAL
//! lands in an in-memory audio capture.
//!
//! Midway the user mutes, a fetch times out, and two selections race so the
//! earlier response arrives last.
//!
//! Run with `RUST_LOG=cymatic_core=debug` to see the request lifecycle.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cymatic_core::audio::CaptureOutput;
use cymatic_core::field::{DailyForecast, FieldConfig, FieldGenerator};
use cymatic_core::view::{share, ResolveOutcome, ViewSession};
use cymatic_core::{
    ClockConfig, CymaticConfig, CymaticView, Day, FetchError, FrameSource, Location, TimerClock,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn banner(view: &CymaticView) -> String {
    let s = view.alert_signal();
    let [r, g, b] = s.band.banner_tint();
    let edge = if s.just_entered_critical { "  ◀ entered CRITICAL" } else { "" };
    let hint = match (s.server_band, s.hint_disagrees) {
        (Some(server), true) => format!("  (server says {server})"),
        _ => String::new(),
    };
    format!("{:<9} rgb({r:>3},{g:>3},{b:>3}){edge}{hint}", s.band.label())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║  Cymatic Forecast Session: 21 simulated days, Kīlauea               ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let mut rng = StdRng::seed_from_u64(7_830);
    let mut forecast = FieldGenerator::random_forecast(&mut rng);
    // guarantee a CRITICAL stretch and a re-entry
    forecast[4] = DailyForecast { probability: 0.9, resonance_factor: Some(0.8) };
    forecast[5] = DailyForecast { probability: 0.85, resonance_factor: Some(0.9) };
    forecast[6] = DailyForecast { probability: 0.2, resonance_factor: Some(0.5) };
    forecast[12] = DailyForecast { probability: 0.95, resonance_factor: Some(0.9) };

    let field = FieldConfig { grid_size: 50, depth: 4, ..FieldConfig::default() };
    let source: Arc<dyn FrameSource> = Arc::new(FieldGenerator::new(field, forecast)?);

    let capture = CaptureOutput::new();
    let config = CymaticConfig::default();
    let clock = TimerClock::new(ClockConfig::default())?;
    let view = share(CymaticView::new(config, Box::new(capture.clone()))?);
    let session = ViewSession::mount(Arc::clone(&view), &clock);

    let here = Location::new(19.421, -155.287, 100.0)?;

    // ── Days 1–21 in order ──────────────────────────────────────────────────
    println!("▶  Stepping through the forecast\n");
    for d in 1..=21 {
        let day = Day::new(d)?;
        if d == 9 {
            view.lock().set_muted(true);
            println!("  [user mutes]");
        }
        if d == 12 {
            view.lock().set_muted(false);
            println!("  [user unmutes]");
        }

        let request = view.lock().select(here, day)?;
        if d == 15 {
            // the collaborator times out on day 15
            let outcome = view.lock().resolve(request.ticket, Err(FetchError::Timeout));
            if let ResolveOutcome::Rejected(err) = outcome {
                println!("  Day {d:>2}: error: {err} (previous frame stays, marked stale)");
            }
            let retry = view.lock().retry();
            if let Some(request) = retry {
                session.fetch(Arc::clone(&source), request).join().ok();
            }
        } else {
            session.fetch(Arc::clone(&source), request).join().ok();
        }

        thread::sleep(Duration::from_millis(40));
        let v = view.lock();
        let overlap = v.frame().map_or(f64::NAN, |f| f.resonance_overlap_percent());
        let markers = v.scene().markers.len();
        println!("  Day {d:>2}: overlap {overlap:>5.1}%  markers {markers:>2}  {}", banner(&v));
    }

    // ── Racing selections ───────────────────────────────────────────────────
    println!("\n▶  Racing selections: day 3 then day 7, day 3 answers last\n");
    let early = view.lock().select(here, Day::new(3)?)?;
    let late = view.lock().select_day(Day::new(7)?).ok_or("no selection")?;
    let late_raw = source.fetch(&late);
    let early_raw = source.fetch(&early);
    let applied = view.lock().resolve(late.ticket, late_raw);
    let discarded = view.lock().resolve(early.ticket, early_raw);
    println!("  day 7 response: {}", if matches!(applied, ResolveOutcome::Applied { .. }) { "applied" } else { "?" });
    println!("  day 3 response: {discarded:?}");
    println!("  on screen:      {}", view.lock().frame().map_or(0, |f| f.day().get()));

    // ── Teardown ────────────────────────────────────────────────────────────
    let (edges, played) = {
        let v = view.lock();
        (v.edge_count(), v.tones_played())
    };
    session.close();

    println!("\n▶  Session closed\n");
    println!("  Rising edges into CRITICAL: {edges}");
    println!("  Tones played:               {played}  (muted edges are consumed silently)");
    println!("  Tones captured:             {}", capture.tone_count());
    let (opened, closed) = capture.voice_counts();
    println!("  Audio voices opened/closed: {opened}/{closed}");
    println!("  View torn down:             {}", view.lock().is_torn_down());
    Ok(())
}
