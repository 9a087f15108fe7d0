// =============================================================================
// Shared types used across the OI Pulse signal engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Directional signal derived from a strike's OI change.
///
/// `Neutral` is never produced by the per-strike rule; it is reserved for the
/// separately-sourced SENSEX scalar entry appended by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// How per-strike records are scored and ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Sign of the OI change only; ranked by |oi_change|.
    OiSign,
    /// Weighted tanh blend of OI, price-leg, and IV deltas; ranked by
    /// |signal_strength|.
    WeightedStrength,
}

impl Default for ScoringStrategy {
    fn default() -> Self {
        Self::WeightedStrength
    }
}

impl std::fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OiSign => write!(f, "oi_sign"),
            Self::WeightedStrength => write!(f, "weighted_strength"),
        }
    }
}

/// One ranked entry of the live-data response.
///
/// Wire format note: `strikePrice` stays camelCase because the dashboard
/// consumes the field under the same name the upstream chain uses; the
/// derived fields are snake_case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResult {
    pub symbol: String,

    #[serde(rename = "strikePrice")]
    pub strike_price: f64,

    /// CE changeinOpenInterest minus PE changeinOpenInterest.
    pub oi_change: i64,

    /// Underlying spot level (call-side `underlyingValue`), or the scalar
    /// index level for the SENSEX entry. `null` when the source omits it.
    pub price: Option<f64>,

    pub signal: Signal,

    /// Bounded heuristic score in [-1.0, 1.0]; present only under
    /// `ScoringStrategy::WeightedStrength` (and fixed at 0.0 for SENSEX).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_wire_format_is_uppercase() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Signal::Sell).unwrap(), "\"SELL\"");
        assert_eq!(
            serde_json::to_string(&Signal::Neutral).unwrap(),
            "\"NEUTRAL\""
        );
    }

    #[test]
    fn signal_display_matches_wire_format() {
        assert_eq!(Signal::Buy.to_string(), "BUY");
        assert_eq!(Signal::Sell.to_string(), "SELL");
        assert_eq!(Signal::Neutral.to_string(), "NEUTRAL");
    }

    #[test]
    fn scoring_strategy_round_trips_snake_case() {
        let s: ScoringStrategy = serde_json::from_str("\"oi_sign\"").unwrap();
        assert_eq!(s, ScoringStrategy::OiSign);
        assert_eq!(
            serde_json::to_string(&ScoringStrategy::WeightedStrength).unwrap(),
            "\"weighted_strength\""
        );
    }

    #[test]
    fn result_serialises_strike_price_camel_case() {
        let r = SignalResult {
            symbol: "NIFTY".to_string(),
            strike_price: 24900.0,
            oi_change: 15200,
            price: Some(24925.0),
            signal: Signal::Buy,
            signal_strength: Some(0.42),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["strikePrice"], 24900.0);
        assert_eq!(json["oi_change"], 15200);
        assert_eq!(json["signal"], "BUY");
        assert_eq!(json["signal_strength"], 0.42);
    }

    #[test]
    fn absent_strength_is_omitted_from_json() {
        let r = SignalResult {
            symbol: "NIFTY".to_string(),
            strike_price: 24900.0,
            oi_change: -100,
            price: None,
            signal: Signal::Sell,
            signal_strength: None,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("signal_strength").is_none());
        assert_eq!(json["price"], serde_json::Value::Null);
    }
}
