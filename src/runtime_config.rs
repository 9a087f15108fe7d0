// =============================================================================
// Runtime Configuration — Hot-loadable engine settings with atomic save
// =============================================================================
//
// Central configuration hub for the OI Pulse engine.  Symbol lists, scoring
// strategy, and fetch tuning all live here so the engine can be pointed at a
// different universe without a rebuild.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::ScoringStrategy;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_index_symbols() -> Vec<String> {
    vec![
        "NIFTY".to_string(),
        "BANKNIFTY".to_string(),
        "FINNIFTY".to_string(),
        "MIDCPNIFTY".to_string(),
    ]
}

fn default_stock_symbols() -> Vec<String> {
    vec![
        "RELIANCE".to_string(),
        "HDFCBANK".to_string(),
        "TCS".to_string(),
        "INFY".to_string(),
        "SBIN".to_string(),
    ]
}

fn default_top_n() -> usize {
    3
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_timeline_capacity() -> usize {
    20
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the OI Pulse engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Symbol universe ----------------------------------------------------

    /// Index underlyings fetched from the index option-chain endpoint.
    /// Aggregation order: indices first, in list order.
    #[serde(default = "default_index_symbols")]
    pub index_symbols: Vec<String>,

    /// Equity underlyings fetched from the equity option-chain endpoint,
    /// appended after the indices.
    #[serde(default = "default_stock_symbols")]
    pub stock_symbols: Vec<String>,

    // --- Scoring ------------------------------------------------------------

    /// Per-strike scoring strategy (plain OI sign vs. weighted strength).
    #[serde(default)]
    pub scoring: ScoringStrategy,

    /// How many ranked strikes to keep per symbol.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    // --- Fetch tuning -------------------------------------------------------

    /// Timeout applied independently to each outbound HTTP call, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    // --- Timeline -----------------------------------------------------------

    /// Number of aggregation cycles retained by the rolling timeline.
    #[serde(default = "default_timeline_capacity")]
    pub timeline_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            index_symbols: default_index_symbols(),
            stock_symbols: default_stock_symbols(),
            scoring: ScoringStrategy::default(),
            top_n: default_top_n(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            timeline_capacity: default_timeline_capacity(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            index_symbols = ?config.index_symbols,
            stock_symbols = ?config.stock_symbols,
            scoring = %config.scoring,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    ///
    /// This prevents corruption if the process crashes mid-write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        // Atomic write: write to a temporary sibling file, then rename.
        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.index_symbols.len(), 4);
        assert_eq!(cfg.index_symbols[0], "NIFTY");
        assert_eq!(cfg.index_symbols[1], "BANKNIFTY");
        assert_eq!(cfg.stock_symbols.len(), 5);
        assert_eq!(cfg.stock_symbols[0], "RELIANCE");
        assert_eq!(cfg.scoring, ScoringStrategy::WeightedStrength);
        assert_eq!(cfg.top_n, 3);
        assert_eq!(cfg.fetch_timeout_secs, 10);
        assert_eq!(cfg.timeline_capacity, 20);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.scoring, ScoringStrategy::WeightedStrength);
        assert_eq!(cfg.top_n, 3);
        assert_eq!(cfg.index_symbols[0], "NIFTY");
        assert_eq!(cfg.timeline_capacity, 20);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "scoring": "oi_sign", "index_symbols": ["NIFTY"] }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.scoring, ScoringStrategy::OiSign);
        assert_eq!(cfg.index_symbols, vec!["NIFTY"]);
        assert_eq!(cfg.stock_symbols.len(), 5);
        assert_eq!(cfg.top_n, 3);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.index_symbols, cfg2.index_symbols);
        assert_eq!(cfg.stock_symbols, cfg2.stock_symbols);
        assert_eq!(cfg.scoring, cfg2.scoring);
        assert_eq!(cfg.top_n, cfg2.top_n);
    }
}
