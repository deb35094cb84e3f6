//! Wallet/network gate
//!
//! Nothing reads balances or sends transactions until the client is mounted,
//! a wallet is connected and that wallet is on the expected chain.

use ethers::types::Address;
use serde::Serialize;
use crate::utils::{DappError, Result};
use super::traits::ChainClient;

/// What the wallet connection currently reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub connected: bool,
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
}

impl WalletSnapshot {
    pub fn connected(address: Address, chain_id: u64) -> Self {
        Self {
            connected: true,
            address: Some(address),
            chain_id: Some(chain_id),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Snapshot for `address` on whatever chain the provider reports right now
    pub async fn observe(chain: &dyn ChainClient, address: Option<Address>) -> Result<Self> {
        let chain_id = chain.current_chain_id().await?;
        Ok(match address {
            Some(address) => Self::connected(address, chain_id),
            None => Self {
                chain_id: Some(chain_id),
                ..Self::disconnected()
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gate {
    pub mounted: bool,
    pub address: Option<Address>,
    /// Wallet chain when connected, otherwise the expected chain
    pub chain_id: u64,
    pub expected_chain_id: u64,
    pub wrong_network: bool,
}

impl Gate {
    pub fn derive(mounted: bool, wallet: &WalletSnapshot, expected_chain_id: u64) -> Self {
        if !mounted {
            return Self {
                mounted,
                address: None,
                chain_id: expected_chain_id,
                expected_chain_id,
                wrong_network: false,
            };
        }

        let address = if wallet.connected { wallet.address } else { None };
        let chain_id = match (wallet.connected, wallet.chain_id) {
            (true, Some(id)) => id,
            _ => expected_chain_id,
        };

        Self {
            mounted,
            address,
            chain_id,
            expected_chain_id,
            wrong_network: address.is_some() && chain_id != expected_chain_id,
        }
    }

    /// Public reads only need the right chain, not a wallet
    pub fn can_read(&self) -> bool {
        self.mounted && !self.wrong_network
    }

    /// Fails unless public reads are allowed
    pub fn require_readable(&self) -> Result<()> {
        if self.can_read() {
            return Ok(());
        }
        if self.wrong_network {
            return Err(DappError::WrongNetwork {
                expected: self.expected_chain_id,
                actual: self.chain_id,
            });
        }
        Err(DappError::WalletNotConnected)
    }

    /// Address of a connected wallet on the expected chain
    pub fn require_ready(&self) -> Result<Address> {
        let address = match (self.mounted, self.address) {
            (true, Some(address)) => address,
            _ => return Err(DappError::WalletNotConnected),
        };
        if self.wrong_network {
            return Err(DappError::WrongNetwork {
                expected: self.expected_chain_id,
                actual: self.chain_id,
            });
        }
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEI: u64 = 1329;

    #[test]
    fn test_unmounted_hides_wallet() {
        let wallet = WalletSnapshot::connected(Address::from_low_u64_be(1), SEI);
        let gate = Gate::derive(false, &wallet, SEI);
        assert_eq!(gate.address, None);
        assert!(!gate.can_read());
        assert!(matches!(gate.require_readable(), Err(DappError::WalletNotConnected)));
        assert!(matches!(gate.require_ready(), Err(DappError::WalletNotConnected)));
    }

    #[test]
    fn test_ready_on_expected_chain() {
        let owner = Address::from_low_u64_be(1);
        let gate = Gate::derive(true, &WalletSnapshot::connected(owner, SEI), SEI);
        assert!(!gate.wrong_network);
        assert_eq!(gate.require_ready().unwrap(), owner);
    }

    #[test]
    fn test_wrong_network_blocks() {
        let gate = Gate::derive(true, &WalletSnapshot::connected(Address::from_low_u64_be(1), 1), SEI);
        assert!(gate.wrong_network);
        assert!(!gate.can_read());
        assert!(matches!(
            gate.require_readable(),
            Err(DappError::WrongNetwork { expected: SEI, actual: 1 })
        ));
        assert!(matches!(
            gate.require_ready(),
            Err(DappError::WrongNetwork { expected: SEI, actual: 1 })
        ));
    }

    #[test]
    fn test_disconnected_reads_expected_chain() {
        let gate = Gate::derive(true, &WalletSnapshot::disconnected(), SEI);
        assert_eq!(gate.chain_id, SEI);
        assert!(gate.require_readable().is_ok());
        assert!(gate.require_ready().is_err());
    }
}
