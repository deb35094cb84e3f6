//! Swap paths through the router

use ethers::types::Address;
use serde::Serialize;
use super::token::{Token, TokenRegistry};
use crate::utils::{DappError, Result};

/// Which router entry point a swap maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwapShape {
    /// SEI -> token, value attached
    NativeToToken,
    TokenToToken,
    /// token -> SEI
    TokenToNative,
}

/// Ordered token addresses for a (possibly multi-hop) swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    path: Vec<Address>,
}

impl Route {
    pub fn new(path: Vec<Address>) -> Result<Self> {
        if path.len() < 2 {
            return Err(DappError::InvalidRoute(format!(
                "path needs at least 2 tokens, got {}",
                path.len()
            )));
        }
        if path.windows(2).any(|w| w[0] == w[1]) {
            return Err(DappError::InvalidRoute("path repeats a token".to_string()));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &[Address] {
        &self.path
    }
}

/// Pick the router entry point and path for swapping `from` into `to`.
///
/// Identical tokens (including SEI <-> WSEI, which collapse to the same routing
/// address) are rejected before anything touches the chain.
pub fn resolve_route(registry: &TokenRegistry, from: &Token, to: &Token) -> Result<(SwapShape, Route)> {
    let input = registry.routing_address(from);
    let output = registry.routing_address(to);

    if from.symbol.eq_ignore_ascii_case(&to.symbol) || input == output {
        return Err(DappError::SameToken);
    }

    let shape = match (from.is_native(), to.is_native()) {
        (true, false) => SwapShape::NativeToToken,
        (false, true) => SwapShape::TokenToNative,
        _ => SwapShape::TokenToToken,
    };

    let wrapped = registry.wrapped_native();
    let path = if input == wrapped || output == wrapped || registry.is_direct_pair(input, output) {
        vec![input, output]
    } else {
        vec![input, wrapped, output]
    };

    Ok((shape, Route::new(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::addresses;

    fn registry() -> TokenRegistry {
        TokenRegistry::sei_mainnet(Some(Address::from_low_u64_be(0xf409)))
    }

    #[test]
    fn test_native_in_is_direct_through_wrapped() {
        let reg = registry();
        let (shape, route) = resolve_route(&reg, reg.get("SEI").unwrap(), reg.get("FROG").unwrap()).unwrap();
        assert_eq!(shape, SwapShape::NativeToToken);
        assert_eq!(route.path(), &[addresses::wsei(), Address::from_low_u64_be(0xf409)]);
    }

    #[test]
    fn test_token_to_native() {
        let reg = registry();
        let (shape, route) = resolve_route(&reg, reg.get("FROG").unwrap(), reg.get("SEI").unwrap()).unwrap();
        assert_eq!(shape, SwapShape::TokenToNative);
        assert_eq!(route.path(), &[Address::from_low_u64_be(0xf409), addresses::wsei()]);
    }

    #[test]
    fn test_token_to_token_hops_through_wrapped() {
        let reg = registry();
        let (shape, route) = resolve_route(&reg, reg.get("FROG").unwrap(), reg.get("WBTC").unwrap()).unwrap();
        assert_eq!(shape, SwapShape::TokenToToken);
        assert_eq!(
            route.path(),
            &[Address::from_low_u64_be(0xf409), addresses::wsei(), addresses::wbtc()]
        );
    }

    #[test]
    fn test_direct_pair_skips_hop() {
        let reg = registry().with_direct_pair(Address::from_low_u64_be(0xf409), addresses::usdc());
        let (_, route) = resolve_route(&reg, reg.get("FROG").unwrap(), reg.get("USDC").unwrap()).unwrap();
        assert_eq!(route.path(), &[Address::from_low_u64_be(0xf409), addresses::usdc()]);
    }

    #[test]
    fn test_same_token_rejected() {
        let reg = registry();
        let sei = reg.get("SEI").unwrap();
        assert!(matches!(resolve_route(&reg, sei, sei), Err(DappError::SameToken)));
        assert!(matches!(
            resolve_route(&reg, sei, reg.get("WSEI").unwrap()),
            Err(DappError::SameToken)
        ));
    }

    #[test]
    fn test_route_validation() {
        let a = Address::from_low_u64_be(1);
        assert!(Route::new(vec![a]).is_err());
        assert!(Route::new(vec![a, a]).is_err());
    }
}
