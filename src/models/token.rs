//! Token registry for Sei EVM

use std::collections::HashSet;
use ethers::types::Address;
use once_cell::sync::Lazy;
use serde::Serialize;
use crate::contracts::addresses;
use crate::utils::{DappError, Result};

/// Native SEI uses 18 decimals on the EVM side
pub const NATIVE_SYMBOL: &str = "SEI";

/// Tokens every Sei deployment lists
static SEI_BUILTINS: Lazy<Vec<Token>> = Lazy::new(|| {
    vec![
        Token::native(NATIVE_SYMBOL, 18),
        Token::erc20("WSEI", 18, addresses::wsei()),
        Token::erc20("USDC", 6, addresses::usdc()),
        Token::erc20("WBTC", 8, addresses::wbtc()),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub symbol: String,
    pub decimals: u8,
    /// `None` for the chain's native asset
    pub address: Option<Address>,
    /// Token rejects a nonzero -> nonzero allowance change, so approvals reset to 0 first
    pub needs_allowance_reset: bool,
}

impl Token {
    pub fn native(symbol: &str, decimals: u8) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            address: None,
            needs_allowance_reset: false,
        }
    }

    pub fn erc20(symbol: &str, decimals: u8, address: Address) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            address: Some(address),
            needs_allowance_reset: true,
        }
    }

    pub fn without_allowance_reset(mut self) -> Self {
        self.needs_allowance_reset = false;
        self
    }

    pub fn is_native(&self) -> bool {
        self.address.is_none()
    }
}

/// Symbol -> token mapping for the chain in use
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
    wrapped_native: Address,
    direct_pairs: HashSet<(Address, Address)>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<Token>, wrapped_native: Address) -> Self {
        Self {
            tokens,
            wrapped_native,
            direct_pairs: HashSet::new(),
        }
    }

    /// Sei mainnet tokens. FROG is only listed when its address is known.
    pub fn sei_mainnet(frog: Option<Address>) -> Self {
        let mut tokens = SEI_BUILTINS.clone();
        if let Some(frog) = frog {
            tokens.push(Token::erc20("FROG", 18, frog));
        }
        Self::new(tokens, addresses::wsei())
    }

    /// Mark a pair as routable without hopping through wrapped native
    pub fn with_direct_pair(mut self, a: Address, b: Address) -> Self {
        self.direct_pairs.insert(ordered(a, b));
        self
    }

    /// Case-insensitive lookup
    pub fn get(&self, symbol: &str) -> Result<&Token> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| DappError::UnknownToken(symbol.to_string()))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    /// Address used in router paths (native -> wrapped native)
    pub fn routing_address(&self, token: &Token) -> Address {
        token.address.unwrap_or(self.wrapped_native)
    }

    pub fn is_direct_pair(&self, a: Address, b: Address) -> bool {
        self.direct_pairs.contains(&ordered(a, b))
    }
}

fn ordered(a: Address, b: Address) -> (Address, Address) {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = TokenRegistry::sei_mainnet(None);
        assert_eq!(registry.get("usdc").unwrap().decimals, 6);
        assert_eq!(registry.get("WbTc").unwrap().decimals, 8);
        assert!(registry.get("sei").unwrap().is_native());
    }

    #[test]
    fn test_frog_only_when_configured() {
        assert!(matches!(
            TokenRegistry::sei_mainnet(None).get("FROG"),
            Err(DappError::UnknownToken(_))
        ));

        let frog = Address::from_low_u64_be(0xf409);
        let registry = TokenRegistry::sei_mainnet(Some(frog));
        assert_eq!(registry.get("FROG").unwrap().address, Some(frog));
    }

    #[test]
    fn test_native_routes_through_wrapped() {
        let registry = TokenRegistry::sei_mainnet(None);
        let sei = registry.get("SEI").unwrap();
        assert_eq!(registry.routing_address(sei), addresses::wsei());
    }

    #[test]
    fn test_direct_pairs_are_unordered() {
        let a = Address::from_low_u64_be(1);
        let b = Address::from_low_u64_be(2);
        let registry = TokenRegistry::sei_mainnet(None).with_direct_pair(b, a);
        assert!(registry.is_direct_pair(a, b));
        assert!(registry.is_direct_pair(b, a));
    }
}
