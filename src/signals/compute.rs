// =============================================================================
// Per-Strike Signal Computation — OI delta scoring and top-N ranking
// =============================================================================
//
// The core of the engine: a pure, deterministic pipeline from a symbol's
// option-chain rows to its ranked signal entries.
//
// Step 1 — Drop rows missing either leg (no CE or no PE).
// Step 2 — oi_change = CE.changeinOpenInterest − PE.changeinOpenInterest.
// Step 3 — signal = BUY when oi_change > 0, otherwise SELL.  Zero counts as
//          SELL.
// Step 4 — Under WeightedStrength, blend three scaled deltas:
//            strength = 0.6·tanh(oi_change / 50000)
//                     + 0.3·tanh((CE.lastPrice − PE.lastPrice) / 100)
//                     + 0.1·(CE.impliedVolatility − PE.impliedVolatility) / 100
//          clamped to [-1, 1], rounded to 2 decimals.
// Step 5 — Rank by |oi_change| descending (|strength| under WeightedStrength),
//          stable on ties, keep the first `top_n`.
// =============================================================================

use crate::nse::{OptionLeg, StrikeRow};
use crate::types::{ScoringStrategy, Signal, SignalResult};

/// OI delta that saturates the tanh normalisation.
const OI_SCALE: f64 = 50_000.0;
/// Price-leg divergence that saturates the tanh normalisation.
const PRICE_SCALE: f64 = 100.0;
/// IV is quoted in percent; the shift term rescales it to a unit range.
const IV_SCALE: f64 = 100.0;

/// Blend weights; they sum to 1.0.
const W_OI: f64 = 0.6;
const W_PRICE: f64 = 0.3;
const W_IV: f64 = 0.1;

/// Compute ranked signal entries for one symbol's chain rows.
///
/// Pure and deterministic: the same rows always produce the same output.
/// Rows missing either leg contribute nothing.  The result is ordered by the
/// ranking key descending and holds at most `top_n` entries; ties keep input
/// order (stable sort).
pub fn compute_signals(
    rows: &[StrikeRow],
    symbol: &str,
    strategy: ScoringStrategy,
    top_n: usize,
) -> Vec<SignalResult> {
    let mut results: Vec<SignalResult> = rows
        .iter()
        .filter_map(|row| {
            let ce = row.ce.as_ref()?;
            let pe = row.pe.as_ref()?;

            let oi_change = ce.change_in_oi - pe.change_in_oi;
            let signal = if oi_change > 0 { Signal::Buy } else { Signal::Sell };

            let signal_strength = match strategy {
                ScoringStrategy::OiSign => None,
                ScoringStrategy::WeightedStrength => Some(strength(ce, pe, oi_change)),
            };

            Some(SignalResult {
                symbol: symbol.to_string(),
                strike_price: row.strike_price,
                oi_change,
                price: ce.underlying_value,
                signal,
                signal_strength,
            })
        })
        .collect();

    match strategy {
        ScoringStrategy::OiSign => {
            results.sort_by(|a, b| b.oi_change.unsigned_abs().cmp(&a.oi_change.unsigned_abs()));
        }
        ScoringStrategy::WeightedStrength => {
            results.sort_by(|a, b| {
                let ka = a.signal_strength.unwrap_or(0.0).abs();
                let kb = b.signal_strength.unwrap_or(0.0).abs();
                kb.total_cmp(&ka)
            });
        }
    }

    results.truncate(top_n);
    results
}

/// Weighted strength score in [-1.0, 1.0], rounded to 2 decimals.
///
/// The tanh terms are bounded by construction; the IV shift is not, so the
/// blend is clamped before rounding to keep the documented output range
/// unconditional even for pathological IV differentials.
fn strength(ce: &OptionLeg, pe: &OptionLeg, oi_change: i64) -> f64 {
    let normalized_oi = (oi_change as f64 / OI_SCALE).tanh();
    let normalized_price = ((ce.last_price - pe.last_price) / PRICE_SCALE).tanh();
    let iv_shift = (ce.implied_volatility - pe.implied_volatility) / IV_SCALE;

    let blend = W_OI * normalized_oi + W_PRICE * normalized_price + W_IV * iv_shift;

    (blend.clamp(-1.0, 1.0) * 100.0).round() / 100.0
}
