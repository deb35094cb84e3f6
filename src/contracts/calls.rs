//! Write calls the client can make, independent of how they get encoded
use ethers::types::{Address, U256};
use crate::models::TxKind;

/// One state-changing contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxRequest {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    SwapExactSeiForTokens {
        router: Address,
        value: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    SwapExactTokensForTokens {
        router: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    SwapExactTokensForSei {
        router: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    AddLiquidity {
        router: Address,
        token_a: Address,
        token_b: Address,
        amount_a_desired: U256,
        amount_b_desired: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
        deadline: U256,
    },
    AddLiquiditySei {
        router: Address,
        token: Address,
        amount_token_desired: U256,
        amount_token_min: U256,
        value: U256,
        amount_sei_min: U256,
        to: Address,
        deadline: U256,
    },
    RemoveLiquidity {
        router: Address,
        token_a: Address,
        token_b: Address,
        liquidity: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
        deadline: U256,
    },
    RemoveLiquiditySei {
        router: Address,
        token: Address,
        liquidity: U256,
        amount_token_min: U256,
        amount_sei_min: U256,
        to: Address,
        deadline: U256,
    },
    CheckIn {
        contract: Address,
    },
}

impl TxRequest {
    pub fn kind(&self) -> TxKind {
        match self {
            TxRequest::Approve { .. } => TxKind::Approve,
            TxRequest::SwapExactSeiForTokens { .. }
            | TxRequest::SwapExactTokensForTokens { .. }
            | TxRequest::SwapExactTokensForSei { .. } => TxKind::Swap,
            TxRequest::AddLiquidity { .. } | TxRequest::AddLiquiditySei { .. } => {
                TxKind::AddLiquidity
            }
            TxRequest::RemoveLiquidity { .. } | TxRequest::RemoveLiquiditySei { .. } => {
                TxKind::RemoveLiquidity
            }
            TxRequest::CheckIn { .. } => TxKind::CheckIn,
        }
    }

    /// Contract the transaction is sent to
    pub fn target(&self) -> Address {
        match self {
            TxRequest::Approve { token, .. } => *token,
            TxRequest::SwapExactSeiForTokens { router, .. }
            | TxRequest::SwapExactTokensForTokens { router, .. }
            | TxRequest::SwapExactTokensForSei { router, .. }
            | TxRequest::AddLiquidity { router, .. }
            | TxRequest::AddLiquiditySei { router, .. }
            | TxRequest::RemoveLiquidity { router, .. }
            | TxRequest::RemoveLiquiditySei { router, .. } => *router,
            TxRequest::CheckIn { contract } => *contract,
        }
    }

    /// Native value attached to the call
    pub fn value(&self) -> U256 {
        match self {
            TxRequest::SwapExactSeiForTokens { value, .. }
            | TxRequest::AddLiquiditySei { value, .. } => *value,
            _ => U256::zero(),
        }
    }
}
