//! Lifecycle of submitted transactions

use std::collections::HashMap;
use chrono::{DateTime, Utc};
use ethers::types::TxHash;
use serde::Serialize;
use super::notification::Notification;
use crate::utils::{DappError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TxKind {
    Approve,
    Swap,
    AddLiquidity,
    RemoveLiquidity,
    CheckIn,
}

impl TxKind {
    pub fn label(&self) -> &'static str {
        match self {
            TxKind::Approve => "Approval",
            TxKind::Swap => "Swap",
            TxKind::AddLiquidity => "Add liquidity",
            TxKind::RemoveLiquidity => "Remove liquidity",
            TxKind::CheckIn => "Check-in",
        }
    }
}

/// `Created -> Simulated -> Submitted -> (Confirmed | Reverted | Dropped)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxStage {
    Created,
    Simulated,
    Submitted,
    Confirmed,
    Reverted,
    Dropped,
}

impl TxStage {
    pub fn advance(self, next: TxStage) -> Result<TxStage> {
        let allowed = matches!(
            (self, next),
            (TxStage::Created, TxStage::Simulated)
                | (TxStage::Simulated, TxStage::Submitted)
                | (TxStage::Submitted, TxStage::Confirmed)
                | (TxStage::Submitted, TxStage::Reverted)
                | (TxStage::Submitted, TxStage::Dropped)
        );
        if allowed {
            Ok(next)
        } else {
            Err(DappError::InvalidTransition(format!("{:?} -> {:?}", self, next)))
        }
    }
}

/// How a submitted transaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxOutcome {
    Confirmed { block_number: Option<u64> },
    Reverted,
    /// No receipt before the wait timed out
    Dropped,
}

impl TxOutcome {
    pub fn stage(&self) -> TxStage {
        match self {
            TxOutcome::Confirmed { .. } => TxStage::Confirmed,
            TxOutcome::Reverted => TxStage::Reverted,
            TxOutcome::Dropped => TxStage::Dropped,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingTx {
    pub hash: TxHash,
    pub kind: TxKind,
    /// Captured at submission so later selection changes don't relabel it
    pub label: String,
    pub submitted_at: DateTime<Utc>,
}

/// Submitted transactions awaiting a receipt, keyed by hash
#[derive(Debug, Default)]
pub struct PendingTxTracker {
    pending: HashMap<TxHash, PendingTx>,
}

impl PendingTxTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, hash: TxHash, kind: TxKind, label: impl Into<String>) -> &PendingTx {
        self.pending.entry(hash).or_insert_with(|| PendingTx {
            hash,
            kind,
            label: label.into(),
            submitted_at: Utc::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Turn a receipt into a notification. Each hash resolves at most once.
    pub fn resolve(&mut self, hash: &TxHash, outcome: TxOutcome) -> Option<Notification> {
        let tx = self.pending.remove(hash)?;
        let notification = match outcome {
            TxOutcome::Confirmed { .. } => {
                Notification::success(format!("{} confirmed", tx.kind.label()), tx.label)
            }
            TxOutcome::Reverted => {
                Notification::error(format!("{} failed", tx.kind.label()), format!("{} reverted on chain", tx.label))
            }
            TxOutcome::Dropped => Notification::error(
                format!("{} not confirmed", tx.kind.label()),
                format!("{} was not mined in time", tx.label),
            ),
        };
        Some(notification.with_tx(tx.hash))
    }
}
