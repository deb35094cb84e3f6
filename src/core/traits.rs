use std::time::Duration;
use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use crate::contracts::TxRequest;
use crate::models::TxOutcome;
use crate::utils::Result;

/// Reserves and LP supply of a router pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairReserves {
    pub pair: Address,
    pub token0: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_supply: U256,
}

impl PairReserves {
    /// Reserves ordered as (reserve of `token_a`, reserve of the other side)
    pub fn reserves_for(&self, token_a: Address) -> (U256, U256) {
        if token_a == self.token0 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reserve0.is_zero() || self.reserve1.is_zero() || self.total_supply.is_zero()
    }
}

/// Core abstraction: everything the client reads from or sends to the chain
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Chain the provider is connected to
    async fn current_chain_id(&self) -> Result<u64>;

    async fn native_balance(&self, owner: Address) -> Result<U256>;

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Router `getAmountsOut` for `path`
    async fn amounts_out(&self, router: Address, amount_in: U256, path: &[Address]) -> Result<Vec<U256>>;

    /// `None` when the factory has no pair for the tokens
    async fn pair_reserves(&self, router: Address, token_a: Address, token_b: Address) -> Result<Option<PairReserves>>;

    /// Dry-run the call against current state without spending gas
    async fn simulate(&self, from: Address, request: &TxRequest) -> Result<()>;

    /// Sign and broadcast
    async fn submit(&self, from: Address, request: &TxRequest) -> Result<TxHash>;

    /// Wait for a receipt, giving up after `timeout`
    async fn wait_for_receipt(&self, hash: TxHash, timeout: Duration) -> Result<TxOutcome>;
}
