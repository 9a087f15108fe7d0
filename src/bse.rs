// =============================================================================
// SENSEX Tracker — Scalar index level from a public chart time series
// =============================================================================
//
// The BSE SENSEX has no option-chain endpoint on the NSE side, so the
// aggregator sources its level from the Yahoo chart API (`^BSESN`) and takes
// the last populated element of the intraday close series.  The entry it
// feeds is always NEUTRAL — there is no OI to derive a direction from.

use anyhow::{Context, Result};
use tracing::debug;

/// Yahoo chart symbol for the BSE SENSEX index.
const CHART_SYMBOL: &str = "%5EBSESN";

/// Fetches the current SENSEX level.
#[derive(Debug)]
pub struct SensexTracker {
    client: reqwest::Client,
    base_url: String,
}

impl SensexTracker {
    /// Create a new tracker with `timeout_secs` applied to every call.
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("failed to build reqwest client for SensexTracker"),
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    /// Fetch the intraday close series and return its last populated value.
    pub async fn fetch_last_price(&self) -> Result<f64> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=5m",
            self.base_url, CHART_SYMBOL
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET SENSEX chart series failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse SENSEX chart response")?;

        if !status.is_success() {
            anyhow::bail!("SENSEX chart API returned {}: {}", status, body);
        }

        let price = extract_last_close(&body)
            .context("SENSEX chart response contained no populated close values")?;

        debug!(price, "SENSEX level fetched");
        Ok(price)
    }
}

/// Pull the last non-null element of the close series out of a Yahoo chart
/// response body.
///
/// The series routinely ends with nulls for bars that have not printed yet,
/// so the scan runs from the tail backwards.
fn extract_last_close(body: &serde_json::Value) -> Option<f64> {
    let closes = body["chart"]["result"]
        .get(0)?
        .pointer("/indicators/quote/0/close")?
        .as_array()?;

    closes.iter().rev().find_map(|v| v.as_f64())
}
