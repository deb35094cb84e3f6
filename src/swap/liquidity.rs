//! Liquidity add/remove on top of the shared executor plumbing

use ethers::types::{Address, U256};
use serde::Serialize;
use crate::contracts::TxRequest;
use crate::core::{Gate, PairReserves};
use crate::models::{Token, TxKind};
use crate::utils::amounts::format_amount_short;
use crate::utils::{DappError, Result};
use super::executor::{ExecutionReceipt, Executor};
use super::quote::{min_out, validate_slippage};

/// `amount_a * reserve_b / reserve_a`: the other side at the current pool ratio
pub fn pair_amount(amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256> {
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(DappError::NoPool);
    }
    let product = amount_a
        .checked_mul(reserve_b)
        .ok_or_else(|| DappError::InvalidAmount("amount too large".to_string()))?;
    Ok(product / reserve_a)
}

/// Share of one reserve redeemed by burning `liquidity` LP tokens
pub fn redeemable(reserve: U256, liquidity: U256, total_supply: U256) -> Result<U256> {
    if total_supply.is_zero() {
        return Err(DappError::NoPool);
    }
    let product = reserve
        .checked_mul(liquidity)
        .ok_or_else(|| DappError::InvalidAmount("amount too large".to_string()))?;
    Ok(product / total_supply)
}

#[derive(Debug, Clone)]
pub struct AddLiquidityOrder {
    pub token_a: Token,
    pub token_b: Token,
    pub amount_a_text: String,
    /// `None` fills the second amount from the pool ratio
    pub amount_b_text: Option<String>,
    pub slippage_bps: u32,
}

/// How many LP tokens to burn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityAmount {
    /// 1-100 percent of the wallet's LP balance
    Percent(u8),
    Raw(U256),
}

#[derive(Debug, Clone)]
pub struct RemoveLiquidityOrder {
    pub token_a: Token,
    pub token_b: Token,
    pub amount: LiquidityAmount,
    pub slippage_bps: u32,
}

/// Display estimate for an add
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddEstimate {
    pub amount_a: U256,
    pub amount_b: U256,
    pub min_a: U256,
    pub min_b: U256,
    pub pool_exists: bool,
}

/// Display estimate for a removal; the minimums are what gets sent on-chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalEstimate {
    pub pair: Address,
    pub lp_balance: U256,
    pub liquidity: U256,
    pub amount_a: U256,
    pub amount_b: U256,
    pub min_a: U256,
    pub min_b: U256,
}

impl Executor {
    fn distinct_pair(&self, a: &Token, b: &Token) -> Result<(Address, Address)> {
        let addr_a = self.registry.routing_address(a);
        let addr_b = self.registry.routing_address(b);
        if addr_a == addr_b {
            return Err(DappError::SameToken);
        }
        Ok((addr_a, addr_b))
    }

    async fn reserves(&self, addr_a: Address, addr_b: Address) -> Result<Option<PairReserves>> {
        self.chain.pair_reserves(self.settings.router, addr_a, addr_b).await
    }

    /// Amounts and minimums an add would use, without sending anything
    pub async fn preview_add(&self, gate: &Gate, order: &AddLiquidityOrder) -> Result<AddEstimate> {
        gate.require_readable()?;
        self.estimate_add(order).await
    }

    /// What burning the requested LP amount should return to the connected wallet
    pub async fn preview_removal(&self, gate: &Gate, order: &RemoveLiquidityOrder) -> Result<RemovalEstimate> {
        let owner = gate.require_ready()?;
        self.estimate_removal(owner, order).await
    }

    async fn estimate_add(&self, order: &AddLiquidityOrder) -> Result<AddEstimate> {
        let (addr_a, addr_b) = self.distinct_pair(&order.token_a, &order.token_b)?;
        let slippage_bps = validate_slippage(order.slippage_bps)?;
        let amount_a = self.parse_positive(&order.amount_a_text, &order.token_a)?;

        let pool = self.reserves(addr_a, addr_b).await?.filter(|p| !p.is_empty());

        let amount_b = match (&order.amount_b_text, &pool) {
            (Some(text), _) => self.parse_positive(text, &order.token_b)?,
            (None, Some(pool)) => {
                let (reserve_a, reserve_b) = pool.reserves_for(addr_a);
                pair_amount(amount_a, reserve_a, reserve_b)?
            }
            (None, None) => {
                return Err(DappError::InvalidAmount(
                    "pool is empty, enter both amounts".to_string(),
                ))
            }
        };
        if amount_b.is_zero() {
            return Err(DappError::InvalidAmount("paired amount rounds to zero".to_string()));
        }

        Ok(AddEstimate {
            amount_a,
            amount_b,
            min_a: min_out(amount_a, slippage_bps),
            min_b: min_out(amount_b, slippage_bps),
            pool_exists: pool.is_some(),
        })
    }

    async fn estimate_removal(&self, owner: Address, order: &RemoveLiquidityOrder) -> Result<RemovalEstimate> {
        let (addr_a, addr_b) = self.distinct_pair(&order.token_a, &order.token_b)?;
        let slippage_bps = validate_slippage(order.slippage_bps)?;

        let pool = self.live_pool(addr_a, addr_b).await?;
        let lp_balance = self.chain.token_balance(pool.pair, owner).await?;

        let liquidity = match order.amount {
            LiquidityAmount::Percent(pct) if (1..=100).contains(&pct) => {
                lp_balance
                    .checked_mul(U256::from(pct))
                    .ok_or_else(|| DappError::InvalidAmount("amount too large".to_string()))?
                    / U256::from(100u8)
            }
            LiquidityAmount::Percent(pct) => {
                return Err(DappError::InvalidAmount(format!("{}% is not between 1 and 100", pct)))
            }
            LiquidityAmount::Raw(amount) => amount,
        };
        if liquidity.is_zero() {
            return Err(DappError::InvalidAmount("no liquidity to remove".to_string()));
        }
        if liquidity > lp_balance {
            return Err(DappError::InsufficientBalance {
                symbol: "LP".to_string(),
                required: liquidity,
                available: lp_balance,
            });
        }

        removal_estimate(&pool, addr_a, lp_balance, liquidity, slippage_bps)
    }

    /// Pair with a non-zero LP supply
    async fn live_pool(&self, addr_a: Address, addr_b: Address) -> Result<PairReserves> {
        self.reserves(addr_a, addr_b)
            .await?
            .filter(|p| !p.total_supply.is_zero())
            .ok_or(DappError::NoPool)
    }

    pub async fn add_liquidity(&self, gate: &Gate, order: &AddLiquidityOrder) -> Result<ExecutionReceipt> {
        let _guard = self.in_flight_guard()?;
        let result = self.run_add(gate, order).await;
        self.report(result)
    }

    pub async fn remove_liquidity(&self, gate: &Gate, order: &RemoveLiquidityOrder) -> Result<ExecutionReceipt> {
        let _guard = self.in_flight_guard()?;
        let result = self.run_remove(gate, order).await;
        self.report(result)
    }

    async fn run_add(&self, gate: &Gate, order: &AddLiquidityOrder) -> Result<ExecutionReceipt> {
        let owner = gate.require_ready()?;
        let estimate = self.estimate_add(order).await?;
        let (a, b) = (&order.token_a, &order.token_b);

        self.ensure_spendable(owner, a, estimate.amount_a).await?;
        self.ensure_spendable(owner, b, estimate.amount_b).await?;

        let router = self.settings.router;
        let mut approvals = self.approve_if_needed(owner, a, router, estimate.amount_a).await?;
        approvals.extend(self.approve_if_needed(owner, b, router, estimate.amount_b).await?);

        // Reserves may have moved while approving; never spend more than was approved
        let estimate = {
            let fresh = self.estimate_add(order).await?;
            if fresh.amount_a > estimate.amount_a || fresh.amount_b > estimate.amount_b {
                tracing::warn!(
                    "Pool ratio moved: {} {} now needed, {} approved",
                    fresh.amount_b, b.symbol, estimate.amount_b
                );
                return Err(DappError::StaleQuote);
            }
            fresh
        };

        let deadline = self.deadline();
        let request = match (a.address, b.address) {
            (None, Some(token)) => TxRequest::AddLiquiditySei {
                router,
                token,
                amount_token_desired: estimate.amount_b,
                amount_token_min: estimate.min_b,
                value: estimate.amount_a,
                amount_sei_min: estimate.min_a,
                to: owner,
                deadline,
            },
            (Some(token), None) => TxRequest::AddLiquiditySei {
                router,
                token,
                amount_token_desired: estimate.amount_a,
                amount_token_min: estimate.min_a,
                value: estimate.amount_b,
                amount_sei_min: estimate.min_b,
                to: owner,
                deadline,
            },
            (Some(token_a), Some(token_b)) => TxRequest::AddLiquidity {
                router,
                token_a,
                token_b,
                amount_a_desired: estimate.amount_a,
                amount_b_desired: estimate.amount_b,
                amount_a_min: estimate.min_a,
                amount_b_min: estimate.min_b,
                to: owner,
                deadline,
            },
            (None, None) => return Err(DappError::SameToken),
        };

        let label = format!(
            "Add {} {} + {} {}",
            format_amount_short(estimate.amount_a, a.decimals, 6),
            a.symbol,
            format_amount_short(estimate.amount_b, b.decimals, 6),
            b.symbol
        );
        let hash = self.submit_and_track(owner, request, label).await?;

        Ok(ExecutionReceipt {
            hash,
            kind: TxKind::AddLiquidity,
            approvals,
        })
    }

    async fn run_remove(&self, gate: &Gate, order: &RemoveLiquidityOrder) -> Result<ExecutionReceipt> {
        let owner = gate.require_ready()?;
        let estimate = self.estimate_removal(owner, order).await?;
        let (a, b) = (&order.token_a, &order.token_b);

        let router = self.settings.router;
        let lp_token = Token::erc20("LP", 18, estimate.pair).without_allowance_reset();
        let approvals = self.approve_if_needed(owner, &lp_token, router, estimate.liquidity).await?;

        // Minimums come from reserves read after the approval landed
        let (addr_a, addr_b) = self.distinct_pair(a, b)?;
        let pool = self.live_pool(addr_a, addr_b).await?;
        let estimate = removal_estimate(&pool, addr_a, estimate.lp_balance, estimate.liquidity, order.slippage_bps)?;
        tracing::info!(
            "Removing {} LP: ~{} {} + ~{} {}",
            estimate.liquidity, estimate.amount_a, a.symbol, estimate.amount_b, b.symbol
        );

        let deadline = self.deadline();
        let request = match (a.address, b.address) {
            (None, Some(token)) => TxRequest::RemoveLiquiditySei {
                router,
                token,
                liquidity: estimate.liquidity,
                amount_token_min: estimate.min_b,
                amount_sei_min: estimate.min_a,
                to: owner,
                deadline,
            },
            (Some(token), None) => TxRequest::RemoveLiquiditySei {
                router,
                token,
                liquidity: estimate.liquidity,
                amount_token_min: estimate.min_a,
                amount_sei_min: estimate.min_b,
                to: owner,
                deadline,
            },
            (Some(token_a), Some(token_b)) => TxRequest::RemoveLiquidity {
                router,
                token_a,
                token_b,
                liquidity: estimate.liquidity,
                amount_a_min: estimate.min_a,
                amount_b_min: estimate.min_b,
                to: owner,
                deadline,
            },
            (None, None) => return Err(DappError::SameToken),
        };

        let label = format!("Remove {}/{} liquidity", a.symbol, b.symbol);
        let hash = self.submit_and_track(owner, request, label).await?;

        Ok(ExecutionReceipt {
            hash,
            kind: TxKind::RemoveLiquidity,
            approvals,
        })
    }
}

/// Amounts redeemed from `pool` by burning `liquidity`, with slippage minimums
fn removal_estimate(
    pool: &PairReserves,
    addr_a: Address,
    lp_balance: U256,
    liquidity: U256,
    slippage_bps: u32,
) -> Result<RemovalEstimate> {
    let (reserve_a, reserve_b) = pool.reserves_for(addr_a);
    let amount_a = redeemable(reserve_a, liquidity, pool.total_supply)?;
    let amount_b = redeemable(reserve_b, liquidity, pool.total_supply)?;

    Ok(RemovalEstimate {
        pair: pool.pair,
        lp_balance,
        liquidity,
        amount_a,
        amount_b,
        min_a: min_out(amount_a, slippage_bps),
        min_b: min_out(amount_b, slippage_bps),
    })
}
