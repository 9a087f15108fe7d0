// =============================================================================
// Live-Data Aggregator — Sequential per-symbol fetch + compute
// =============================================================================
//
// Walks the configured universe one symbol at a time (indices first, then
// stocks), runs the signal pipeline on each chain, and concatenates the
// ranked entries in symbol-list order.  A SENSEX placeholder entry is
// appended last.
//
// Failure policy: a failed fetch or parse for one source yields zero entries
// (or a null-price placeholder for SENSEX) for that source only.  The
// aggregate call itself never fails — errors are logged and pushed to the
// shared error ring, nothing more.
//
// Fetches are strictly sequential; total latency is the sum of the per-symbol
// latencies, each bounded by the client timeout.

use tracing::{debug, warn};

use crate::app_state::AppState;
use crate::bse::SensexTracker;
use crate::nse::{NseClient, OptionChain};
use crate::signals::compute_signals;
use crate::types::{ScoringStrategy, Signal, SignalResult};

/// Symbol used for the scalar index entry.
const SENSEX_SYMBOL: &str = "SENSEX";

/// Owns the upstream clients and runs one aggregation cycle per call.
#[derive(Debug)]
pub struct Aggregator {
    nse: NseClient,
    sensex: SensexTracker,
}

impl Aggregator {
    pub fn new(fetch_timeout_secs: u64) -> Self {
        Self {
            nse: NseClient::new(fetch_timeout_secs),
            sensex: SensexTracker::new(fetch_timeout_secs),
        }
    }

    /// Fetch and score the whole universe, returning the ordered aggregate.
    pub async fn live_data(&self, state: &AppState) -> Vec<SignalResult> {
        let (index_symbols, stock_symbols, scoring, top_n) = {
            let config = state.runtime_config.read();
            (
                config.index_symbols.clone(),
                config.stock_symbols.clone(),
                config.scoring,
                config.top_n,
            )
        };

        let mut results = Vec::new();

        for symbol in &index_symbols {
            let outcome = self.nse.fetch_index_chain(symbol).await;
            absorb_chain(&mut results, state, symbol, outcome, scoring, top_n);
        }

        for symbol in &stock_symbols {
            let outcome = self.nse.fetch_equity_chain(symbol).await;
            absorb_chain(&mut results, state, symbol, outcome, scoring, top_n);
        }

        let sensex_price = match self.sensex.fetch_last_price().await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(error = %e, "SENSEX fetch failed — placeholder gets null price");
                state.push_error(format!("{SENSEX_SYMBOL}: {e:#}"));
                None
            }
        };
        results.push(neutral_sensex_entry(sensex_price));

        debug!(entries = results.len(), "aggregation cycle complete");
        results
    }
}

/// Fold one symbol's fetch outcome into the aggregate: ranked entries on
/// success, nothing but a logged + recorded error on failure.
fn absorb_chain(
    results: &mut Vec<SignalResult>,
    state: &AppState,
    symbol: &str,
    outcome: anyhow::Result<OptionChain>,
    scoring: ScoringStrategy,
    top_n: usize,
) {
    match outcome {
        Ok(chain) => {
            results.extend(compute_signals(&chain.records.data, symbol, scoring, top_n));
        }
        Err(e) => {
            warn!(symbol, error = %e, "chain fetch failed — skipping symbol");
            state.push_error(format!("{symbol}: {e:#}"));
        }
    }
}

/// The always-appended scalar entry: NEUTRAL, zero OI change, zero strength,
/// price from the time series (or null when that fetch failed).
fn neutral_sensex_entry(price: Option<f64>) -> SignalResult {
    SignalResult {
        symbol: SENSEX_SYMBOL.to_string(),
        strike_price: 0.0,
        oi_change: 0,
        price,
        signal: Signal::Neutral,
        signal_strength: Some(0.0),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::nse::{OptionLeg, StrikeRow};
    use crate::runtime_config::RuntimeConfig;

    fn chain_with_one_strike(oi_change: i64) -> OptionChain {
        let leg = |change_in_oi| OptionLeg {
            change_in_oi,
            last_price: 100.0,
            implied_volatility: 12.0,
            underlying_value: Some(24925.0),
        };
        OptionChain {
            records: crate::nse::option_chain::Records {
                timestamp: "07-Aug-2026 15:30:00".to_string(),
                underlying_value: 24925.0,
                data: vec![StrikeRow {
                    strike_price: 24900.0,
                    ce: Some(leg(oi_change)),
                    pe: Some(leg(0)),
                }],
            },
        }
    }

    #[test]
    fn one_failed_symbol_does_not_suppress_others() {
        let state = AppState::new(RuntimeConfig::default());
        let mut results = Vec::new();

        absorb_chain(
            &mut results,
            &state,
            "NIFTY",
            Err(anyhow::anyhow!("connection reset")),
            ScoringStrategy::OiSign,
            3,
        );
        absorb_chain(
            &mut results,
            &state,
            "BANKNIFTY",
            Ok(chain_with_one_strike(9_000)),
            ScoringStrategy::OiSign,
            3,
        );

        // BANKNIFTY's entry survives NIFTY's failure; the failure only lands
        // in the error ring.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "BANKNIFTY");
        let errors = state.recent_errors.read();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("NIFTY:"));
    }

    #[test]
    fn sensex_entry_carries_fetched_price() {
        let entry = neutral_sensex_entry(Some(83350.0));
        assert_eq!(entry.symbol, "SENSEX");
        assert_eq!(entry.oi_change, 0);
        assert_eq!(entry.signal, Signal::Neutral);
        assert_eq!(entry.signal_strength, Some(0.0));
        assert_eq!(entry.price, Some(83350.0));
    }

    #[test]
    fn sensex_entry_has_null_price_on_failure() {
        let entry = neutral_sensex_entry(None);
        assert_eq!(entry.signal, Signal::Neutral);
        assert_eq!(entry.price, None);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["price"], serde_json::Value::Null);
        assert_eq!(json["signal"], "NEUTRAL");
    }
}
