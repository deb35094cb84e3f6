//! Router quotes with slippage bounds, debouncing and a last-good cache

use std::sync::Arc;
use std::time::{Duration, Instant};
use ethers::types::{Address, U256};
use serde::Serialize;
use crate::core::ChainClient;
use crate::utils::amounts::format_amount_short;
use crate::utils::{retry_with_backoff, DappError, Result};

pub const BPS_DENOMINATOR: u32 = 10_000;

/// Reject tolerances above 100%
pub fn validate_slippage(slippage_bps: u32) -> Result<u32> {
    if slippage_bps > BPS_DENOMINATOR {
        return Err(DappError::InvalidSlippage(slippage_bps));
    }
    Ok(slippage_bps)
}

/// `floor(out * (10000 - bps) / 10000)`, computed without overflowing U256
pub fn min_out(out: U256, slippage_bps: u32) -> U256 {
    let keep = U256::from(BPS_DENOMINATOR - slippage_bps.min(BPS_DENOMINATOR));
    let denom = U256::from(BPS_DENOMINATOR);
    let (q, r) = (out / denom, out % denom);
    q * keep + r * keep / denom
}

/// A successful router quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub amount_in: U256,
    pub amount_out: U256,
    pub min_out: U256,
    /// Decimals of the output token, for formatting
    pub decimals: u8,
    pub path: Vec<Address>,
    /// Input text the quote was computed for
    pub input_text: String,
}

impl Quote {
    pub fn out_formatted(&self) -> String {
        format_amount_short(self.amount_out, self.decimals, 6)
    }
}

/// Build a quote from the router's amounts array. The last element is the output;
/// an empty array or a zero output means there is no quote.
pub fn derive_quote(
    amounts: &[U256],
    amount_in: U256,
    path: &[Address],
    slippage_bps: u32,
    decimals: u8,
    input_text: &str,
) -> Option<Quote> {
    let amount_out = *amounts.last()?;
    if amount_out.is_zero() {
        return None;
    }
    Some(Quote {
        amount_in,
        amount_out,
        min_out: min_out(amount_out, slippage_bps),
        decimals,
        path: path.to_vec(),
        input_text: input_text.to_string(),
    })
}

/// What a form shows for the current quote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    pub min_out: Option<U256>,
    pub out_formatted: Option<String>,
    pub is_stale: bool,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

/// Emits a value once it has been left alone for `window`
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T: Clone> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    /// Replace the pending value and restart the window
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// The pending value, if its window has elapsed. Fires once per push.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, since)) if now.saturating_duration_since(*since) >= self.window => {
                self.pending.take().map(|(v, _)| v)
            }
            _ => None,
        }
    }
}

/// Identifies one quote request so superseded responses can be dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTicket {
    seq: u64,
    pub input_text: String,
}

/// Form-side quote state: raw text, its debounced copy and the last good quote
#[derive(Debug, Clone)]
pub struct QuoteTracker {
    raw_text: String,
    debounced_text: String,
    debouncer: Debouncer<String>,
    last_good: Option<Quote>,
    loading: bool,
    error: Option<String>,
    latest_seq: u64,
}

impl QuoteTracker {
    pub fn new(debounce: Duration) -> Self {
        Self {
            raw_text: String::new(),
            debounced_text: String::new(),
            debouncer: Debouncer::new(debounce),
            last_good: None,
            loading: false,
            error: None,
            latest_seq: 0,
        }
    }

    /// Record a keystroke
    pub fn set_input(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.debouncer.push(text.clone(), now);
        self.raw_text = text;
    }

    /// Settled input text once the debounce window has passed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let settled = self.debouncer.poll(now)?;
        self.debounced_text = settled.clone();
        Some(settled)
    }

    /// Start a request. The previous good quote stays visible meanwhile.
    pub fn begin(&mut self, input_text: impl Into<String>) -> QuoteTicket {
        self.latest_seq += 1;
        self.loading = true;
        self.error = None;
        QuoteTicket {
            seq: self.latest_seq,
            input_text: input_text.into(),
        }
    }

    /// Nothing to quote (blank input)
    pub fn clear(&mut self) {
        self.latest_seq += 1;
        self.loading = false;
        self.last_good = None;
        self.error = None;
    }

    /// Apply a response. Returns false when a newer request superseded it.
    pub fn complete(&mut self, ticket: QuoteTicket, result: Result<Option<Quote>>) -> bool {
        if ticket.seq != self.latest_seq {
            tracing::debug!("Dropping superseded quote for '{}'", ticket.input_text);
            return false;
        }
        self.loading = false;
        match result {
            Ok(quote) => {
                self.last_good = quote;
                self.error = None;
            }
            Err(e) => {
                self.last_good = None;
                self.error = Some(e.user_message());
            }
        }
        true
    }

    /// Raw text has moved past the debounced text
    pub fn is_stale(&self) -> bool {
        self.raw_text != self.debounced_text
    }

    /// Last good quote, possibly for an older input
    pub fn quote(&self) -> Option<&Quote> {
        self.last_good.as_ref()
    }

    /// The quote, only if it may be used for submission right now
    pub fn submittable(&self) -> Result<&Quote> {
        if self.is_stale() || self.loading {
            return Err(DappError::StaleQuote);
        }
        let quote = self.last_good.as_ref().ok_or(DappError::NoQuote)?;
        if quote.input_text != self.raw_text {
            return Err(DappError::StaleQuote);
        }
        Ok(quote)
    }

    pub fn view(&self) -> QuoteView {
        QuoteView {
            min_out: self.last_good.as_ref().map(|q| q.min_out),
            out_formatted: self.last_good.as_ref().map(|q| q.out_formatted()),
            is_stale: self.is_stale(),
            is_loading: self.loading,
            error_message: self.error.clone(),
        }
    }
}

/// Fetches quotes from the router
pub struct QuoteEngine {
    chain: Arc<dyn ChainClient>,
    router: Address,
    retries: u32,
    backoff: Duration,
}

impl QuoteEngine {
    pub fn new(chain: Arc<dyn ChainClient>, router: Address) -> Self {
        Self {
            chain,
            router,
            retries: 3,
            backoff: Duration::from_millis(750),
        }
    }

    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }

    /// Query the router. `amount_in = None` issues no request.
    pub async fn fetch(
        &self,
        amount_in: Option<U256>,
        path: &[Address],
        slippage_bps: u32,
        out_decimals: u8,
        input_text: &str,
    ) -> Result<Option<Quote>> {
        let amount_in = match amount_in {
            Some(a) if !a.is_zero() => a,
            _ => return Ok(None),
        };
        validate_slippage(slippage_bps)?;
        if path.len() < 2 {
            return Err(DappError::InvalidRoute("path needs at least 2 tokens".to_string()));
        }

        let chain = &self.chain;
        let router = self.router;
        let amounts = retry_with_backoff("getAmountsOut", self.retries, self.backoff, move || {
            chain.amounts_out(router, amount_in, path)
        })
        .await?;

        let quote = derive_quote(&amounts, amount_in, path, slippage_bps, out_decimals, input_text);
        match &quote {
            Some(q) => tracing::debug!("Quote {} -> {} (min {})", amount_in, q.amount_out, q.min_out),
            None => tracing::debug!("No quote for {} along {} hops", amount_in, path.len() - 1),
        }
        Ok(quote)
    }

    /// One-shot quote for callers without a form
    pub async fn get_quote(
        &self,
        amount_in: Option<U256>,
        path: &[Address],
        slippage_bps: u32,
        out_decimals: u8,
    ) -> QuoteView {
        let text = amount_in.map(|a| a.to_string()).unwrap_or_default();
        let mut tracker = QuoteTracker::new(Duration::ZERO);
        tracker.raw_text = text.clone();
        tracker.debounced_text = text.clone();
        if amount_in.is_none() {
            tracker.clear();
            return tracker.view();
        }
        let ticket = tracker.begin(text.clone());
        let result = self.fetch(amount_in, path, slippage_bps, out_decimals, &text).await;
        tracker.complete(ticket, result);
        tracker.view()
    }

    /// Drive a tracker: if its input has settled, fetch and apply a quote.
    /// `parse` turns the settled text into an amount (`None` for blank input).
    pub async fn refresh<F>(
        &self,
        tracker: &mut QuoteTracker,
        now: Instant,
        path: &[Address],
        slippage_bps: u32,
        out_decimals: u8,
        parse: F,
    ) -> bool
    where
        F: FnOnce(&str) -> Result<Option<U256>>,
    {
        let settled = match tracker.poll(now) {
            Some(text) => text,
            None => return false,
        };

        let amount_in = match parse(&settled) {
            Ok(Some(a)) => a,
            Ok(None) => {
                tracker.clear();
                return true;
            }
            Err(e) => {
                let ticket = tracker.begin(settled);
                return tracker.complete(ticket, Err(e));
            }
        };

        let ticket = tracker.begin(settled.clone());
        let result = self.fetch(Some(amount_in), path, slippage_bps, out_decimals, &settled).await;
        tracker.complete(ticket, result)
    }
}
