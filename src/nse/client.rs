// =============================================================================
// NSE REST Client — Cookie-primed option-chain fetches
// =============================================================================
//
// The NSE site refuses API calls that arrive without the session cookies its
// landing page sets, so the client keeps a cookie store and lazily primes the
// session with a GET to the site root before the first chain fetch.  A fetch
// rejected with 401/403 re-primes once and retries — the cookies expire
// server-side every few minutes of inactivity.
//
// All calls share one `reqwest::Client` with browser-like headers and a fixed
// per-call timeout.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::nse::option_chain::OptionChain;

/// Browser-like UA string; the NSE edge drops requests from obvious bots.
const UA: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";

/// NSE option-chain API client.
pub struct NseClient {
    client: reqwest::Client,
    base_url: String,
    primed: AtomicBool,
}

impl NseClient {
    /// Create a new client with a cookie store and `timeout_secs` applied
    /// independently to every outbound call.
    pub fn new(timeout_secs: u64) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(UA));
        default_headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        default_headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build reqwest client for NseClient");

        Self {
            client,
            base_url: "https://www.nseindia.com".to_string(),
            primed: AtomicBool::new(false),
        }
    }

    /// GET the site root so the cookie store picks up a fresh session.
    async fn prime_session(&self) -> Result<()> {
        let resp = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .context("GET NSE root for session cookies failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("NSE root returned {} while priming session", resp.status());
        }

        self.primed.store(true, Ordering::SeqCst);
        debug!("NSE session primed");
        Ok(())
    }

    /// Fetch the option chain for an index underlying (NIFTY, BANKNIFTY, ...).
    pub async fn fetch_index_chain(&self, symbol: &str) -> Result<OptionChain> {
        self.fetch_chain("option-chain-indices", symbol).await
    }

    /// Fetch the option chain for an equity underlying (RELIANCE, TCS, ...).
    pub async fn fetch_equity_chain(&self, symbol: &str) -> Result<OptionChain> {
        self.fetch_chain("option-chain-equities", symbol).await
    }

    async fn fetch_chain(&self, endpoint: &str, symbol: &str) -> Result<OptionChain> {
        if !self.primed.load(Ordering::SeqCst) {
            self.prime_session().await?;
        }

        let url = format!("{}/api/{}?symbol={}", self.base_url, endpoint, symbol);

        let mut resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET option chain for {symbol}"))?;

        // Expired session cookies come back as 401/403. Re-prime once.
        if resp.status() == StatusCode::UNAUTHORIZED || resp.status() == StatusCode::FORBIDDEN {
            warn!(symbol, status = %resp.status(), "NSE session rejected — re-priming");
            self.prime_session().await?;
            resp = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("retry GET option chain for {symbol}"))?;
        }

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("NSE option chain API returned {} for {}", status, symbol);
        }

        let chain: OptionChain = resp
            .json()
            .await
            .with_context(|| format!("failed to parse option chain response for {symbol}"))?;

        debug!(
            symbol,
            rows = chain.records.data.len(),
            underlying = chain.records.underlying_value,
            chain_time = %chain.records.timestamp,
            "option chain fetched"
        );

        Ok(chain)
    }
}

impl std::fmt::Debug for NseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NseClient")
            .field("base_url", &self.base_url)
            .field("primed", &self.primed.load(Ordering::SeqCst))
            .finish()
    }
}
