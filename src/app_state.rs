// =============================================================================
// Central Application State — OI Pulse Signal Engine
// =============================================================================
//
// Shared state for the HTTP handlers: runtime config, the aggregator with its
// upstream clients, the rolling timeline, the last aggregation snapshot, and
// the error ring buffer.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared collections.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::aggregator::Aggregator;
use crate::runtime_config::RuntimeConfig;
use crate::signals::SignalTimeline;
use crate::types::SignalResult;

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded per-source error for the errors endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message, prefixed with the failing source symbol.
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// Live Snapshot
// =============================================================================

/// The most recent aggregation, kept for the summary endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LiveSnapshot {
    pub at: String,
    pub results: Vec<SignalResult>,
}

// =============================================================================
// AppState
// =============================================================================

/// Central application state shared across handlers via `Arc<AppState>`.
pub struct AppState {
    /// Monotonically increasing version counter, incremented on every
    /// aggregation and config change.
    pub state_version: AtomicU64,

    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    pub aggregator: Aggregator,

    /// Rolling buy/sell-count timeline, bounded by the configured capacity.
    pub timeline: RwLock<SignalTimeline>,

    /// Last aggregation result set (None until the first request).
    pub last_snapshot: RwLock<Option<LiveSnapshot>>,

    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Instant when the engine was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct a new `AppState` from the given runtime configuration.
    ///
    /// The returned value is typically wrapped in `Arc` immediately.
    pub fn new(config: RuntimeConfig) -> Self {
        let aggregator = Aggregator::new(config.fetch_timeout_secs);
        let timeline = SignalTimeline::new(config.timeline_capacity);

        Self {
            state_version: AtomicU64::new(1),
            runtime_config: Arc::new(RwLock::new(config)),
            aggregator,
            timeline: RwLock::new(timeline),
            last_snapshot: RwLock::new(None),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Aggregation bookkeeping ─────────────────────────────────────────

    /// Record a completed aggregation: one timeline point, the snapshot for
    /// the summary endpoint, and a version bump.
    pub fn record_aggregation(&self, results: &[SignalResult]) {
        self.timeline.write().record(results);
        *self.last_snapshot.write() = Some(LiveSnapshot {
            at: Utc::now().to_rfc3339(),
            results: results.to_vec(),
        });
        self.increment_version();
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message. The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted when the limit is
    /// reached.
    pub fn push_error(&self, message: String) {
        let mut errors = self.recent_errors.write();
        if errors.len() == MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        errors.push(ErrorRecord {
            message,
            at: Utc::now().to_rfc3339(),
        });
    }

    // ── Timing ──────────────────────────────────────────────────────────

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Signal;

    fn buy_result() -> SignalResult {
        SignalResult {
            symbol: "NIFTY".to_string(),
            strike_price: 24900.0,
            oi_change: 15200,
            price: Some(24925.0),
            signal: Signal::Buy,
            signal_strength: Some(0.42),
        }
    }

    #[test]
    fn record_aggregation_updates_snapshot_timeline_and_version() {
        let state = AppState::new(RuntimeConfig::default());
        let v0 = state.current_state_version();

        state.record_aggregation(&[buy_result()]);

        assert!(state.current_state_version() > v0);
        assert_eq!(state.timeline.read().len(), 1);
        let snapshot = state.last_snapshot.read();
        let snapshot = snapshot.as_ref().unwrap();
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.results[0].symbol, "NIFTY");
    }

    #[test]
    fn error_ring_buffer_is_bounded() {
        let state = AppState::new(RuntimeConfig::default());
        for i in 0..(MAX_RECENT_ERRORS + 10) {
            state.push_error(format!("error {i}"));
        }
        let errors = state.recent_errors.read();
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        // Oldest entries were evicted.
        assert_eq!(errors[0].message, "error 10");
    }

    #[test]
    fn timeline_respects_configured_capacity() {
        let config = RuntimeConfig {
            timeline_capacity: 2,
            ..RuntimeConfig::default()
        };
        let state = AppState::new(config);
        for _ in 0..5 {
            state.record_aggregation(&[buy_result()]);
        }
        assert_eq!(state.timeline.read().len(), 2);
    }
}
