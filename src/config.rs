//! Runtime settings shared by the quote engine, approvals and executors

use std::time::Duration;
use ethers::types::{Address, U256};
use crate::contracts::addresses;
use crate::swap::ApprovalAmount;

/// Default slippage tolerance (0.5%)
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

#[derive(Debug, Clone)]
pub struct Settings {
    pub chain_id: u64,
    pub router: Address,
    /// Streak contract for daily check-ins, if deployed
    pub streak_contract: Option<Address>,
    pub slippage_bps: u32,
    /// Quiet period after the last keystroke before a quote is requested
    pub quote_debounce: Duration,
    /// Swap/liquidity deadline relative to submission time
    pub deadline_window: Duration,
    pub receipt_timeout: Duration,
    pub approval_amount: ApprovalAmount,
    pub approval_poll_interval: Duration,
    pub approval_poll_timeout: Duration,
    /// SEI held back from native-input amounts to pay for gas
    pub native_gas_reserve: U256,
    pub read_retries: u32,
    pub read_backoff: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chain_id: addresses::SEI_CHAIN_ID,
            router: addresses::dragon_router(),
            streak_contract: None,
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            quote_debounce: Duration::from_millis(400),
            deadline_window: Duration::from_secs(600),
            receipt_timeout: Duration::from_secs(120),
            approval_amount: ApprovalAmount::Exact,
            approval_poll_interval: Duration::from_secs(1),
            approval_poll_timeout: Duration::from_secs(25),
            // 0.05 SEI
            native_gas_reserve: U256::exp10(16) * U256::from(5u64),
            read_retries: 3,
            read_backoff: Duration::from_millis(750),
        }
    }
}

impl Settings {
    pub fn with_router(mut self, router: Address) -> Self {
        self.router = router;
        self
    }

    pub fn with_streak_contract(mut self, contract: Option<Address>) -> Self {
        self.streak_contract = contract;
        self
    }

    pub fn with_slippage_bps(mut self, bps: u32) -> Self {
        self.slippage_bps = bps;
        self
    }

    pub fn with_approval_amount(mut self, amount: ApprovalAmount) -> Self {
        self.approval_amount = amount;
        self
    }
}
