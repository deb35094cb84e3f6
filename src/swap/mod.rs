//! Swap and liquidity orchestration against the DragonSwap router
//!
//! Quote engine -> approval orchestrator -> executor. Every write goes through
//! the same simulate/submit/receipt pipeline and publishes a refresh signal
//! once confirmed.

mod approval;
mod executor;
mod liquidity;
mod quote;

pub use approval::{ApprovalAmount, ApprovalOrchestrator, ApprovalPolicy};
pub use executor::{ExecutionReceipt, Executor, SwapOrder};
pub use liquidity::{
    pair_amount, redeemable, AddEstimate, AddLiquidityOrder, LiquidityAmount, RemovalEstimate,
    RemoveLiquidityOrder,
};
pub use quote::{
    derive_quote, min_out, validate_slippage, Debouncer, Quote, QuoteEngine, QuoteTicket,
    QuoteTracker, QuoteView, BPS_DENOMINATOR,
};
