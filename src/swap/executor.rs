//! Swap/check-in execution with approval sequencing and receipt tracking

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use ethers::types::{Address, TxHash, U256};
use tokio::sync::{mpsc, Mutex, MutexGuard};
use crate::config::Settings;
use crate::contracts::TxRequest;
use crate::core::{ChainClient, Gate, RefreshBus};
use crate::models::{
    resolve_route, Notification, PendingTxTracker, SwapShape, Token, TokenRegistry, TxKind,
    TxOutcome, TxStage,
};
use crate::utils::amounts::format_amount_short;
use crate::utils::{parse_amount, retry_with_backoff, DappError, Result};
use super::approval::{ApprovalOrchestrator, ApprovalPolicy};
use super::quote::{min_out, validate_slippage, Quote};

/// A swap as entered in the form
#[derive(Debug, Clone)]
pub struct SwapOrder {
    pub from: Token,
    pub to: Token,
    /// Current, un-debounced input text
    pub input_text: String,
    /// Quote shown to the user, if any
    pub quote: Option<Quote>,
    /// Input changed after the quote was requested, or a refetch is in flight
    pub quote_stale: bool,
    pub slippage_bps: u32,
    /// Defaults to the connected wallet
    pub recipient: Option<Address>,
}

/// Result of a confirmed execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    pub hash: TxHash,
    pub kind: TxKind,
    /// Approval transactions sent beforehand
    pub approvals: Vec<TxHash>,
}

/// One feature's executor. At most one execution runs at a time.
pub struct Executor {
    source: String,
    pub(crate) chain: Arc<dyn ChainClient>,
    pub(crate) registry: Arc<TokenRegistry>,
    pub(crate) settings: Settings,
    pub(crate) approvals: ApprovalOrchestrator,
    bus: RefreshBus,
    pending: Mutex<PendingTxTracker>,
    notifications: Option<mpsc::UnboundedSender<Notification>>,
    in_flight: Mutex<()>,
}

impl Executor {
    pub fn new(
        source: impl Into<String>,
        chain: Arc<dyn ChainClient>,
        registry: Arc<TokenRegistry>,
        settings: Settings,
        bus: RefreshBus,
    ) -> Self {
        let policy = ApprovalPolicy {
            amount: settings.approval_amount,
            receipt_timeout: settings.receipt_timeout,
            poll_interval: settings.approval_poll_interval,
            poll_timeout: settings.approval_poll_timeout,
        };
        Self {
            source: source.into(),
            approvals: ApprovalOrchestrator::new(chain.clone(), policy),
            chain,
            registry,
            settings,
            bus,
            pending: Mutex::new(PendingTxTracker::new()),
            notifications: None,
            in_flight: Mutex::new(()),
        }
    }

    /// Send toasts to `sender`
    pub fn with_notifications(mut self, sender: mpsc::UnboundedSender<Notification>) -> Self {
        self.notifications = Some(sender);
        self
    }

    /// Swap `order.from` into `order.to`
    pub async fn swap(&self, gate: &Gate, order: &SwapOrder) -> Result<ExecutionReceipt> {
        let _guard = self.in_flight_guard()?;
        let result = self.run_swap(gate, order).await;
        self.report(result)
    }

    /// Daily check-in on the streak contract
    pub async fn check_in(&self, gate: &Gate) -> Result<ExecutionReceipt> {
        let _guard = self.in_flight_guard()?;
        let result = self.run_check_in(gate).await;
        self.report(result)
    }

    /// Held for the whole of one execution; a second caller gets `Busy`
    pub(crate) fn in_flight_guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.in_flight.try_lock().map_err(|_| DappError::Busy)
    }

    async fn run_swap(&self, gate: &Gate, order: &SwapOrder) -> Result<ExecutionReceipt> {
        let owner = gate.require_ready()?;
        let (shape, route) = resolve_route(&self.registry, &order.from, &order.to)?;
        let slippage_bps = validate_slippage(order.slippage_bps)?;
        let amount_in = self.parse_positive(&order.input_text, &order.from)?;

        if order.quote_stale {
            return Err(DappError::StaleQuote);
        }
        let quote = order.quote.as_ref().ok_or(DappError::NoQuote)?;
        if quote.input_text != order.input_text || quote.amount_in != amount_in || quote.path != route.path() {
            return Err(DappError::StaleQuote);
        }

        self.ensure_spendable(owner, &order.from, amount_in).await?;

        let router = self.settings.router;
        let approvals = self.approve_if_needed(owner, &order.from, router, amount_in).await?;

        // Price may have moved while approving; bound against a fresh quote
        let fresh_out = self.fresh_output(amount_in, route.path()).await?;
        let amount_out_min = min_out(fresh_out, slippage_bps);
        tracing::info!(
            "Swap {} {} -> {} (quoted {}, fresh {}, min {})",
            amount_in, order.from.symbol, order.to.symbol, quote.amount_out, fresh_out, amount_out_min
        );

        let to = order.recipient.unwrap_or(owner);
        let deadline = self.deadline();
        let path = route.path().to_vec();
        let request = match shape {
            SwapShape::NativeToToken => TxRequest::SwapExactSeiForTokens {
                router,
                value: amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            },
            SwapShape::TokenToToken => TxRequest::SwapExactTokensForTokens {
                router,
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            },
            SwapShape::TokenToNative => TxRequest::SwapExactTokensForSei {
                router,
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            },
        };

        let label = format!(
            "Swap {} {} for {}",
            format_amount_short(amount_in, order.from.decimals, 6),
            order.from.symbol,
            order.to.symbol
        );
        let hash = self.submit_and_track(owner, request, label).await?;

        Ok(ExecutionReceipt {
            hash,
            kind: TxKind::Swap,
            approvals,
        })
    }

    async fn run_check_in(&self, gate: &Gate) -> Result<ExecutionReceipt> {
        let owner = gate.require_ready()?;
        let contract = self
            .settings
            .streak_contract
            .ok_or_else(|| DappError::ConfigError("no streak contract configured".to_string()))?;

        let hash = self
            .submit_and_track(owner, TxRequest::CheckIn { contract }, "Daily check-in".to_string())
            .await?;

        Ok(ExecutionReceipt {
            hash,
            kind: TxKind::CheckIn,
            approvals: Vec::new(),
        })
    }

    /// Parse the form text as a positive amount of `token`
    pub(crate) fn parse_positive(&self, text: &str, token: &Token) -> Result<U256> {
        match parse_amount(text, token.decimals)? {
            Some(amount) if !amount.is_zero() => Ok(amount),
            _ => Err(DappError::InvalidAmount("enter an amount greater than zero".to_string())),
        }
    }

    /// Balance available for spending; native balance keeps a gas reserve
    pub async fn spendable_balance(&self, owner: Address, token: &Token) -> Result<U256> {
        match token.address {
            Some(address) => self.chain.token_balance(address, owner).await,
            None => {
                let balance = self.chain.native_balance(owner).await?;
                Ok(balance.saturating_sub(self.settings.native_gas_reserve))
            }
        }
    }

    pub(crate) async fn ensure_spendable(&self, owner: Address, token: &Token, amount: U256) -> Result<()> {
        let available = self.spendable_balance(owner, token).await?;
        if amount > available {
            return Err(DappError::InsufficientBalance {
                symbol: token.symbol.clone(),
                required: amount,
                available,
            });
        }
        Ok(())
    }

    /// Read the live allowance and approve when it is short
    pub(crate) async fn approve_if_needed(
        &self,
        owner: Address,
        token: &Token,
        spender: Address,
        amount: U256,
    ) -> Result<Vec<TxHash>> {
        let address = match token.address {
            Some(address) => address,
            None => return Ok(Vec::new()),
        };

        let current = self.chain.allowance(address, owner, spender).await?;
        let sent = self
            .approvals
            .ensure_approval(owner, token, spender, amount, current)
            .await?;

        if let Some(last) = sent.last() {
            self.notify(
                Notification::success("Approval confirmed", format!("{} approved for trading", token.symbol))
                    .with_tx(*last),
            );
        }
        Ok(sent)
    }

    async fn fresh_output(&self, amount_in: U256, path: &[Address]) -> Result<U256> {
        let chain = &self.chain;
        let router = self.settings.router;
        let amounts = retry_with_backoff(
            "fresh quote",
            self.settings.read_retries,
            self.settings.read_backoff,
            move || chain.amounts_out(router, amount_in, path),
        )
        .await?;

        match amounts.last() {
            Some(out) if !out.is_zero() => Ok(*out),
            _ => Err(DappError::NoQuote),
        }
    }

    /// Unix deadline `deadline_window` from now
    pub(crate) fn deadline(&self) -> U256 {
        deadline_from(Utc::now().timestamp(), self.settings.deadline_window)
    }

    /// Simulate, submit, wait for the receipt and publish on success
    pub(crate) async fn submit_and_track(&self, owner: Address, request: TxRequest, label: String) -> Result<TxHash> {
        let kind = request.kind();
        let mut stage = TxStage::Created;

        self.chain.simulate(owner, &request).await?;
        stage = stage.advance(TxStage::Simulated)?;

        let hash = self.chain.submit(owner, &request).await?;
        stage = stage.advance(TxStage::Submitted)?;
        self.pending.lock().await.record(hash, kind, label);
        tracing::info!("📤 {} submitted: {:?}", kind.label(), hash);

        let outcome = match self.chain.wait_for_receipt(hash, self.settings.receipt_timeout).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Lost track of {:?}: {}", hash, e);
                TxOutcome::Dropped
            }
        };
        stage = stage.advance(outcome.stage())?;
        tracing::info!("{} {:?}: {:?}", kind.label(), hash, stage);

        if let Some(notification) = self.pending.lock().await.resolve(&hash, outcome) {
            self.notify(notification);
        }

        match outcome {
            TxOutcome::Confirmed { .. } => {
                self.bus.publish(&self.source);
                Ok(hash)
            }
            TxOutcome::Reverted => Err(DappError::Reverted(hash)),
            TxOutcome::Dropped => Err(DappError::Dropped(hash)),
        }
    }

    /// Number of transactions still awaiting a receipt
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub(crate) fn notify(&self, notification: Notification) {
        if let Some(sender) = &self.notifications {
            let _ = sender.send(notification);
        }
    }

    /// Turn failures into toasts. Receipt failures were already reported by the tracker.
    pub(crate) fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_rejection() {
                self.notify(Notification::info("Cancelled", "Transaction was not signed"));
            } else if !matches!(e, DappError::Reverted(_) | DappError::Dropped(_)) {
                tracing::warn!("{} failed: {}", self.source, e);
                self.notify(Notification::error("Transaction failed", e.user_message()));
            }
        }
        result
    }
}

pub(crate) fn deadline_from(now_secs: i64, window: Duration) -> U256 {
    U256::from(now_secs.max(0) as u64 + window.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_window() {
        assert_eq!(
            deadline_from(1_700_000_000, Duration::from_secs(600)),
            U256::from(1_700_000_600u64)
        );
    }
}
