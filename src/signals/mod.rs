// =============================================================================
// Signals Module
// =============================================================================
//
// Signal pipeline for the engine:
// - Per-strike OI-delta scoring and top-N ranking
// - Rolling buy/sell timeline and market summary

pub mod compute;
pub mod timeline;

pub use compute::compute_signals;
pub use timeline::{MarketSummary, SignalTimeline, TimelinePoint};
