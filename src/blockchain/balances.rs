//! Wallet balances across the registry

use ethers::types::{Address, U256};
use serde::Serialize;
use crate::core::ChainClient;
use crate::models::TokenRegistry;
use crate::utils::amounts::format_amount_short;
use crate::utils::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub raw: U256,
    pub formatted: String,
}

/// Read every registry token's balance for `owner`
pub async fn fetch_balances(
    chain: &dyn ChainClient,
    registry: &TokenRegistry,
    owner: Address,
) -> Result<Vec<TokenBalance>> {
    let mut balances = Vec::with_capacity(registry.tokens().len());
    for token in registry.tokens() {
        let raw = match token.address {
            Some(address) => chain.token_balance(address, owner).await?,
            None => chain.native_balance(owner).await?,
        };
        tracing::debug!("{} balance: {}", token.symbol, raw);
        balances.push(TokenBalance {
            symbol: token.symbol.clone(),
            raw,
            formatted: format_amount_short(raw, token.decimals, 6),
        });
    }
    Ok(balances)
}
