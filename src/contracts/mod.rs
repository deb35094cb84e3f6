//! Contract interfaces for the DragonSwap DEX and the FROG streak contract
//!
//! DragonSwap is a UniswapV2 fork on Sei. These interfaces allow us to:
//! - Quote swaps through the router
//! - Read pair reserves and LP supply for liquidity estimates
//! - Submit approvals, swaps, liquidity changes and check-ins
pub mod calls;
pub mod dragon_factory;
pub mod dragon_pair;
pub mod dragon_router;
pub mod erc20;
pub mod streak;

pub use calls::TxRequest;
pub use dragon_factory::IDragonFactory;
pub use dragon_pair::IDragonPair;
pub use dragon_router::IDragonRouter;
pub use erc20::IERC20;
pub use streak::IFrogStreak;

/// Well-known addresses on Sei EVM (Chain ID: 1329)
pub mod addresses {
    use ethers::types::Address;
    use std::str::FromStr;

    /// Sei EVM mainnet chain id
    pub const SEI_CHAIN_ID: u64 = 1329;

    /// Public Sei EVM RPC
    pub const SEI_RPC_URL: &str = "https://evm-rpc.sei-apis.com";

    /// DragonSwap Router V2
    pub const DRAGON_ROUTER: &str = "0xa4cF2F53D1195aDDdE9e4D3aCa54f556895712f2";

    /// Wrapped SEI
    pub const WSEI: &str = "0xE30feDd158A2e3b13e9badaeABaFc5516e95e8C7";

    /// Native USDC
    pub const USDC: &str = "0x3894085Ef7Ff0f0aeDf52E2A2704928d1Ec074F1";

    /// Wrapped BTC
    pub const WBTC: &str = "0x0555E30da8f98308EdB960aa94C0Db47230d2B9c";

    /// Parse DRAGON_ROUTER as Address
    pub fn dragon_router() -> Address {
        Address::from_str(DRAGON_ROUTER).expect("Invalid DRAGON_ROUTER address")
    }

    /// Parse WSEI as Address
    pub fn wsei() -> Address {
        Address::from_str(WSEI).expect("Invalid WSEI address")
    }

    pub fn usdc() -> Address {
        Address::from_str(USDC).expect("Invalid USDC address")
    }

    pub fn wbtc() -> Address {
        Address::from_str(WBTC).expect("Invalid WBTC address")
    }
}
