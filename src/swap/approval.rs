//! ERC-20 allowance orchestration
//!
//! The receipt for an approval only says the transaction was mined. The RPC
//! node used for the next read may still be behind, so after confirmation the
//! allowance is polled until it actually reflects the new value.

use std::sync::Arc;
use std::time::Duration;
use ethers::types::{Address, TxHash, U256};
use tokio::time::Instant;
use crate::contracts::TxRequest;
use crate::core::ChainClient;
use crate::models::{Token, TxOutcome};
use crate::utils::{DappError, Result};

/// How much to approve when the current allowance is too low
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApprovalAmount {
    /// Exactly the amount being spent
    #[default]
    Exact,
    /// `type(uint256).max`
    Unlimited,
}

#[derive(Debug, Clone)]
pub struct ApprovalPolicy {
    pub amount: ApprovalAmount,
    pub receipt_timeout: Duration,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            amount: ApprovalAmount::Exact,
            receipt_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
            poll_timeout: Duration::from_secs(25),
        }
    }
}

pub struct ApprovalOrchestrator {
    chain: Arc<dyn ChainClient>,
    policy: ApprovalPolicy,
}

impl ApprovalOrchestrator {
    pub fn new(chain: Arc<dyn ChainClient>, policy: ApprovalPolicy) -> Self {
        Self { chain, policy }
    }

    /// Make sure `spender` may move `required` of `token` for `owner`.
    ///
    /// Returns the approval transactions that were sent (empty when `current`
    /// already covers `required`).
    pub async fn ensure_approval(
        &self,
        owner: Address,
        token: &Token,
        spender: Address,
        required: U256,
        current: U256,
    ) -> Result<Vec<TxHash>> {
        let token_address = match token.address {
            Some(address) => address,
            None => return Ok(Vec::new()),
        };

        if current >= required {
            tracing::debug!("{} allowance {} covers {}", token.symbol, current, required);
            return Ok(Vec::new());
        }

        let target = match self.policy.amount {
            ApprovalAmount::Exact => required,
            ApprovalAmount::Unlimited => U256::MAX,
        };

        let mut sent = Vec::new();

        if !current.is_zero() && !target.is_zero() && token.needs_allowance_reset {
            tracing::info!("Resetting {} allowance to 0 before re-approving", token.symbol);
            let hash = self.approve(owner, token_address, spender, U256::zero()).await?;
            sent.push(hash);
        }

        tracing::info!("Approving {} {} for {:?}", target, token.symbol, spender);
        let hash = self.approve(owner, token_address, spender, target).await?;
        sent.push(hash);

        self.wait_for_allowance(owner, token_address, spender, required).await?;
        tracing::info!("✅ {} allowance visible", token.symbol);

        Ok(sent)
    }

    /// Send one approve and wait for it to be mined
    async fn approve(&self, owner: Address, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let request = TxRequest::Approve { token, spender, amount };

        let hash = self.chain.submit(owner, &request).await.map_err(|e| {
            if e.is_rejection() { DappError::UserRejected } else { e }
        })?;

        match self.chain.wait_for_receipt(hash, self.policy.receipt_timeout).await? {
            TxOutcome::Confirmed { .. } => Ok(hash),
            TxOutcome::Reverted => Err(DappError::ApprovalReverted(hash)),
            TxOutcome::Dropped => Err(DappError::Dropped(hash)),
        }
    }

    /// Poll until the allowance reaches `required` or the timeout passes
    async fn wait_for_allowance(&self, owner: Address, token: Address, spender: Address, required: U256) -> Result<()> {
        let started = Instant::now();
        loop {
            match self.chain.allowance(token, owner, spender).await {
                Ok(allowance) if allowance >= required => return Ok(()),
                Ok(allowance) => {
                    tracing::debug!("Allowance {} < {}, node not caught up yet", allowance, required);
                }
                Err(e) => tracing::warn!("Allowance read failed while polling: {}", e),
            }

            if started.elapsed() >= self.policy.poll_timeout {
                return Err(DappError::AllowanceNotObserved {
                    token,
                    spender,
                    waited_secs: self.policy.poll_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }
}
