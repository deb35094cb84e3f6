pub mod balances;
pub mod client;

pub use balances::{fetch_balances, TokenBalance};
pub use client::{BlockchainClient, SignerClient};
