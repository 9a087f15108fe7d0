// =============================================================================
// NSE Option-Chain Payload Models
// =============================================================================
//
// Typed view over the JSON returned by the NSE option-chain endpoints
// (`/api/option-chain-indices` and `/api/option-chain-equities`).  Only the
// fields the signal pipeline consumes are modelled; everything else in the
// payload is ignored by serde.
//
// The upstream uses camelCase keys (`changeinOpenInterest`, `lastPrice`,
// `impliedVolatility`, `underlyingValue`), mapped here via serde renames.
// Either leg of a strike may be absent — a strike can trade calls without
// puts near the edges of the chain.

use serde::Deserialize;

/// Top-level envelope of an option-chain response.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionChain {
    pub records: Records,
}

/// The `records` section: timestamp, underlying level, and all strike rows.
#[derive(Debug, Clone, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub timestamp: String,

    #[serde(rename = "underlyingValue", default)]
    pub underlying_value: f64,

    #[serde(default)]
    pub data: Vec<StrikeRow>,
}

/// One strike's combined call/put snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct StrikeRow {
    #[serde(rename = "strikePrice", default)]
    pub strike_price: f64,

    /// Call leg; absent when no CE trades at this strike.
    #[serde(rename = "CE")]
    pub ce: Option<OptionLeg>,

    /// Put leg; absent when no PE trades at this strike.
    #[serde(rename = "PE")]
    pub pe: Option<OptionLeg>,
}

/// One side (CE or PE) of a strike.
///
/// Missing numeric fields default to zero — the NSE feed intermittently drops
/// them for illiquid strikes, and a zero delta is the neutral reading for
/// every formula downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionLeg {
    #[serde(rename = "changeinOpenInterest", default)]
    pub change_in_oi: i64,

    #[serde(rename = "lastPrice", default)]
    pub last_price: f64,

    #[serde(rename = "impliedVolatility", default)]
    pub implied_volatility: f64,

    /// Spot level of the underlying; the feed repeats it on each leg but the
    /// pipeline reads it from the call side only.
    #[serde(rename = "underlyingValue")]
    pub underlying_value: Option<f64>,
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "records": {
            "timestamp": "07-Aug-2026 15:30:00",
            "underlyingValue": 24925.35,
            "data": [
                {
                    "strikePrice": 24900,
                    "expiryDate": "14-Aug-2026",
                    "CE": {
                        "strikePrice": 24900,
                        "changeinOpenInterest": 15200,
                        "lastPrice": 182.5,
                        "impliedVolatility": 12.4,
                        "underlyingValue": 24925.35,
                        "totalTradedVolume": 991231
                    },
                    "PE": {
                        "strikePrice": 24900,
                        "changeinOpenInterest": 4100,
                        "lastPrice": 140.1,
                        "impliedVolatility": 13.9,
                        "underlyingValue": 24925.35
                    }
                },
                {
                    "strikePrice": 26000,
                    "CE": {
                        "changeinOpenInterest": 300,
                        "lastPrice": 4.2,
                        "impliedVolatility": 18.0,
                        "underlyingValue": 24925.35
                    }
                }
            ],
            "expiryDates": ["14-Aug-2026", "21-Aug-2026"]
        },
        "filtered": { "data": [] }
    }"#;

    #[test]
    fn deserialises_nse_payload() {
        let chain: OptionChain = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(chain.records.data.len(), 2);
        assert!((chain.records.underlying_value - 24925.35).abs() < 1e-9);

        let row = &chain.records.data[0];
        assert!((row.strike_price - 24900.0).abs() < 1e-9);
        let ce = row.ce.as_ref().unwrap();
        assert_eq!(ce.change_in_oi, 15200);
        assert!((ce.last_price - 182.5).abs() < 1e-9);
        assert!((ce.implied_volatility - 12.4).abs() < 1e-9);
        assert_eq!(ce.underlying_value, Some(24925.35));
    }

    #[test]
    fn missing_leg_deserialises_as_none() {
        let chain: OptionChain = serde_json::from_str(SAMPLE).unwrap();
        let edge = &chain.records.data[1];
        assert!(edge.ce.is_some());
        assert!(edge.pe.is_none());
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let json = r#"{
            "records": {
                "data": [
                    { "strikePrice": 100, "CE": {}, "PE": {} }
                ]
            }
        }"#;
        let chain: OptionChain = serde_json::from_str(json).unwrap();
        let row = &chain.records.data[0];
        let ce = row.ce.as_ref().unwrap();
        assert_eq!(ce.change_in_oi, 0);
        assert_eq!(ce.last_price, 0.0);
        assert_eq!(ce.underlying_value, None);
    }
}
