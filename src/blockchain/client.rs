use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use crate::contracts::{IDragonFactory, IDragonPair, IDragonRouter, IFrogStreak, TxRequest, IERC20};
use crate::core::{ChainClient, PairReserves};
use crate::models::TxOutcome;
use crate::utils::{DappError, Result};

/// Provider plus a local key that signs in place of a browser wallet
pub type SignerClient = SignerMiddleware<Arc<Provider<Http>>, LocalWallet>;

/// Blockchain RPC client
pub struct BlockchainClient {
    pub provider: Arc<Provider<Http>>,
    signer: Option<Arc<SignerClient>>,
    chain_id: u64,
    receipt_poll_interval: Duration,
}

impl BlockchainClient {
    /// Create a new read-only client
    pub async fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| DappError::RpcError(
                ProviderError::CustomError(format!("Invalid RPC URL: {}", e))
            ))?;

        let provider = Arc::new(provider);

        // Get chain ID
        let chain_id = provider.get_chainid().await?;

        tracing::info!("Connected to chain ID: {}", chain_id);

        Ok(Self {
            provider,
            signer: None,
            chain_id: chain_id.as_u64(),
            receipt_poll_interval: Duration::from_secs(1),
        })
    }

    /// Attach a signing key; writes are impossible without one
    pub fn with_wallet(mut self, private_key: &str) -> Result<Self> {
        let wallet: LocalWallet = private_key
            .trim()
            .trim_start_matches("0x")
            .parse()
            .map_err(|e| DappError::ConfigError(format!("Invalid private key: {}", e)))?;
        let wallet = wallet.with_chain_id(self.chain_id);

        tracing::info!("Wallet loaded: {:?}", wallet.address());
        self.signer = Some(Arc::new(SignerMiddleware::new(self.provider.clone(), wallet)));
        Ok(self)
    }

    pub fn wallet_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    /// Get chain ID
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get chain name
    pub fn chain_name(&self) -> &'static str {
        match self.chain_id {
            1329 => "Sei EVM",
            1328 => "Sei Testnet",
            713715 => "Sei Devnet",
            _ => "Unknown Chain",
        }
    }

    /// Current streak and last check-in timestamp for `account`
    pub async fn streak_of(&self, contract: Address, account: Address) -> Result<(U256, U256)> {
        let streak = IFrogStreak::new(contract, self.provider.clone());
        streak.streak_of(account).call().await
            .map_err(|e| DappError::ContractError(format!("Failed to read streak: {}", e)))
    }

    fn signer(&self) -> Result<&Arc<SignerClient>> {
        self.signer.as_ref().ok_or(DappError::WalletNotConnected)
    }

    /// Encode a request as a transaction
    fn build_tx(&self, request: &TxRequest) -> TypedTransaction {
        let provider = self.provider.clone();
        match request {
            TxRequest::Approve { token, spender, amount } => {
                IERC20::new(*token, provider).approve(*spender, *amount).tx
            }
            TxRequest::SwapExactSeiForTokens { router, value, amount_out_min, path, to, deadline } => {
                IDragonRouter::new(*router, provider)
                    .swap_exact_sei_for_tokens(*amount_out_min, path.clone(), *to, *deadline)
                    .value(*value)
                    .tx
            }
            TxRequest::SwapExactTokensForTokens { router, amount_in, amount_out_min, path, to, deadline } => {
                IDragonRouter::new(*router, provider)
                    .swap_exact_tokens_for_tokens(*amount_in, *amount_out_min, path.clone(), *to, *deadline)
                    .tx
            }
            TxRequest::SwapExactTokensForSei { router, amount_in, amount_out_min, path, to, deadline } => {
                IDragonRouter::new(*router, provider)
                    .swap_exact_tokens_for_sei(*amount_in, *amount_out_min, path.clone(), *to, *deadline)
                    .tx
            }
            TxRequest::AddLiquidity {
                router, token_a, token_b, amount_a_desired, amount_b_desired,
                amount_a_min, amount_b_min, to, deadline,
            } => {
                IDragonRouter::new(*router, provider)
                    .add_liquidity(
                        *token_a, *token_b, *amount_a_desired, *amount_b_desired,
                        *amount_a_min, *amount_b_min, *to, *deadline,
                    )
                    .tx
            }
            TxRequest::AddLiquiditySei {
                router, token, amount_token_desired, amount_token_min, value,
                amount_sei_min, to, deadline,
            } => {
                IDragonRouter::new(*router, provider)
                    .add_liquidity_sei(*token, *amount_token_desired, *amount_token_min, *amount_sei_min, *to, *deadline)
                    .value(*value)
                    .tx
            }
            TxRequest::RemoveLiquidity {
                router, token_a, token_b, liquidity, amount_a_min, amount_b_min, to, deadline,
            } => {
                IDragonRouter::new(*router, provider)
                    .remove_liquidity(*token_a, *token_b, *liquidity, *amount_a_min, *amount_b_min, *to, *deadline)
                    .tx
            }
            TxRequest::RemoveLiquiditySei {
                router, token, liquidity, amount_token_min, amount_sei_min, to, deadline,
            } => {
                IDragonRouter::new(*router, provider)
                    .remove_liquidity_sei(*token, *liquidity, *amount_token_min, *amount_sei_min, *to, *deadline)
                    .tx
            }
            TxRequest::CheckIn { contract } => IFrogStreak::new(*contract, provider).check_in().tx,
        }
    }
}

#[async_trait]
impl ChainClient for BlockchainClient {
    async fn current_chain_id(&self) -> Result<u64> {
        let id = self.provider.get_chainid().await?;
        Ok(id.as_u64())
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        tracing::debug!("Fetching SEI balance for {:?}", owner);
        Ok(self.provider.get_balance(owner, None).await?)
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        let contract = IERC20::new(token, self.provider.clone());
        contract.balance_of(owner).call().await
            .map_err(|e| DappError::ContractError(format!("Failed to get balance: {}", e)))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let contract = IERC20::new(token, self.provider.clone());
        contract.allowance(owner, spender).call().await
            .map_err(|e| DappError::ContractError(format!("Failed to get allowance: {}", e)))
    }

    async fn amounts_out(&self, router: Address, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        let router = IDragonRouter::new(router, self.provider.clone());
        router.get_amounts_out(amount_in, path.to_vec()).call().await
            .map_err(|e| DappError::ContractError(format!("Failed to get amounts out: {}", e)))
    }

    async fn pair_reserves(&self, router: Address, token_a: Address, token_b: Address) -> Result<Option<PairReserves>> {
        let router = IDragonRouter::new(router, self.provider.clone());
        let factory = router.factory().call().await
            .map_err(|e| DappError::ContractError(format!("Failed to get factory: {}", e)))?;

        let factory = IDragonFactory::new(factory, self.provider.clone());
        let pair = factory.get_pair(token_a, token_b).call().await
            .map_err(|e| DappError::ContractError(format!("Failed to get pair: {}", e)))?;

        // Check if pair exists
        if pair == Address::zero() {
            return Ok(None);
        }

        let pair_contract = IDragonPair::new(pair, self.provider.clone());
        let (reserve0, reserve1, _timestamp) = pair_contract.get_reserves().call().await
            .map_err(|e| DappError::ContractError(format!("Failed to get reserves: {}", e)))?;
        let token0 = pair_contract.token_0().call().await
            .map_err(|e| DappError::ContractError(format!("Failed to get token0: {}", e)))?;
        let total_supply = pair_contract.total_supply().call().await
            .map_err(|e| DappError::ContractError(format!("Failed to get LP supply: {}", e)))?;

        Ok(Some(PairReserves {
            pair,
            token0,
            reserve0: U256::from(reserve0),
            reserve1: U256::from(reserve1),
            total_supply,
        }))
    }

    async fn simulate(&self, from: Address, request: &TxRequest) -> Result<()> {
        let mut tx = self.build_tx(request);
        tx.set_from(from);

        tracing::debug!(
            "Simulating {:?} call to {:?} (value {})",
            request.kind(), request.target(), request.value()
        );
        self.provider.call(&tx, None).await
            .map_err(|e| DappError::SimulationError(e.to_string()))?;
        Ok(())
    }

    async fn submit(&self, from: Address, request: &TxRequest) -> Result<TxHash> {
        let signer = self.signer()?;
        if signer.address() != from {
            return Err(DappError::ConfigError(format!(
                "Signer {:?} cannot send for {:?}", signer.address(), from
            )));
        }

        let mut tx = self.build_tx(request);
        tx.set_from(from);

        let pending = signer.send_transaction(tx, None).await
            .map_err(|e| DappError::SubmissionError(e.to_string()))?;
        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: TxHash, timeout: Duration) -> Result<TxOutcome> {
        let provider = &self.provider;
        poll_receipt(hash, timeout, self.receipt_poll_interval, || async move {
            Ok(provider.get_transaction_receipt(hash).await?)
        })
        .await
    }
}

/// Poll `fetch` until a receipt shows up or `timeout` passes. Read errors
/// (node behind head, flaky RPC) are logged and polling carries on.
pub(crate) async fn poll_receipt<F, Fut>(
    hash: TxHash,
    timeout: Duration,
    interval: Duration,
    mut fetch: F,
) -> Result<TxOutcome>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<Option<TransactionReceipt>>>,
{
    let started = tokio::time::Instant::now();
    loop {
        match fetch().await {
            Ok(Some(receipt)) => {
                let block_number = receipt.block_number.map(|b| b.as_u64());
                return Ok(match receipt.status {
                    Some(status) if status.is_zero() => TxOutcome::Reverted,
                    _ => TxOutcome::Confirmed { block_number },
                });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Receipt read for {:?} failed, retrying: {}", hash, e),
        }

        if started.elapsed() >= timeout {
            tracing::warn!("No receipt for {:?} after {:?}", hash, timeout);
            return Ok(TxOutcome::Dropped);
        }
        tokio::time::sleep(interval).await;
    }
}
