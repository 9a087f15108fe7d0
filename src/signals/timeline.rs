// =============================================================================
// Signal Timeline — Bounded rolling record of aggregation cycles
// =============================================================================
//
// Each aggregation appends one point carrying its buy/sell counts; the buffer
// holds the most recent `capacity` points (default 20) and evicts from the
// front.  Only the counts are retained — never the SignalResult records
// themselves.

use std::collections::VecDeque;

use chrono::Utc;
use serde::Serialize;

use crate::types::{Signal, SignalResult};

/// Buy/sell counts of one aggregation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    /// ISO 8601 timestamp of the aggregation.
    pub at: String,
    pub buy_count: usize,
    pub sell_count: usize,
}

/// Rolling buffer of the last `capacity` aggregation cycles.
#[derive(Debug)]
pub struct SignalTimeline {
    points: VecDeque<TimelinePoint>,
    capacity: usize,
}

impl SignalTimeline {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one point for `results`, evicting the oldest beyond capacity.
    pub fn record(&mut self, results: &[SignalResult]) {
        let buy_count = results.iter().filter(|r| r.signal == Signal::Buy).count();
        let sell_count = results.iter().filter(|r| r.signal == Signal::Sell).count();

        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(TimelinePoint {
            at: Utc::now().to_rfc3339(),
            buy_count,
            sell_count,
        });
    }

    /// Oldest-first snapshot of the buffer.
    pub fn points(&self) -> Vec<TimelinePoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// =============================================================================
// Market summary
// =============================================================================

/// Bullish/bearish breakdown of one aggregation — the dashboard-side
/// percentage computation, hosted server-side.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    pub total: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub neutral_count: usize,
    /// Percentage of BUY entries over all entries (NEUTRAL included in the
    /// denominator, matching the dashboard's table-wide ratio).
    pub bullish_pct: f64,
    pub bearish_pct: f64,
}

impl MarketSummary {
    pub fn from_results(results: &[SignalResult]) -> Self {
        let total = results.len();
        let buy_count = results.iter().filter(|r| r.signal == Signal::Buy).count();
        let sell_count = results.iter().filter(|r| r.signal == Signal::Sell).count();
        let neutral_count = total - buy_count - sell_count;

        let pct = |count: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            }
        };

        Self {
            total,
            buy_count,
            sell_count,
            neutral_count,
            bullish_pct: pct(buy_count),
            bearish_pct: pct(sell_count),
        }
    }
}
