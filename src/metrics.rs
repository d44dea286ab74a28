// Prometheus metrics for rounds, guesses and sessions.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Rounds handed to the player, by mode.
    pub static ref ROUNDS_SELECTED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tftdle_rounds_selected_total", "Rounds selected"),
        &["mode"],
    )
    .unwrap();

    /// Candidates skipped because their image failed to resolve, by mode.
    pub static ref ASSET_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tftdle_asset_failures_total", "Candidate images that failed to resolve"),
        &["mode"],
    )
    .unwrap();

    /// Selections that ran out of playable candidates, by mode.
    pub static ref SELECTION_EXHAUSTED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tftdle_selection_exhausted_total", "Selections with no playable candidate"),
        &["mode"],
    )
    .unwrap();

    /// Guesses submitted, by mode and verdict.
    pub static ref GUESSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tftdle_guesses_total", "Guesses submitted"),
        &["mode", "verdict"],
    )
    .unwrap();

    /// Sessions that ran out of time, by mode.
    pub static ref SESSIONS_FINISHED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tftdle_sessions_finished_total", "Sessions finished"),
        &["mode"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Final score of each finished session, by mode.
    pub static ref SESSION_SCORE: HistogramVec = HistogramVec::new(
        HistogramOpts::new("tftdle_session_score", "Final session score")
            .buckets(vec![0.0, 1.0, 3.0, 5.0, 10.0, 15.0, 20.0, 30.0, 50.0]),
        &["mode"],
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(ROUNDS_SELECTED_TOTAL.clone()),
            Box::new(ASSET_FAILURES_TOTAL.clone()),
            Box::new(SELECTION_EXHAUSTED_TOTAL.clone()),
            Box::new(GUESSES_TOTAL.clone()),
            Box::new(SESSIONS_FINISHED_TOTAL.clone()),
            Box::new(SESSION_SCORE.clone()),
        ];

        for c in collectors {
            REGISTRY.register(c).expect("failed to register metric");
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
