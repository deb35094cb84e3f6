#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use frog_swap::contracts::TxRequest;
use frog_swap::core::{ChainClient, Gate, PairReserves, RefreshBus, WalletSnapshot};
use frog_swap::models::{Token, TokenRegistry, TxOutcome};
use frog_swap::{DappError, Executor, Result, Settings};

pub const CHAIN_ID: u64 = 1329;

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub fn owner() -> Address {
    addr(0xa11ce)
}

pub fn router() -> Address {
    addr(0x707e)
}

pub fn wsei() -> Address {
    addr(0x5e1)
}

pub fn usdc() -> Address {
    addr(0x05dc)
}

pub fn frog() -> Address {
    addr(0xf409)
}

pub fn streak() -> Address {
    addr(0x57ea)
}

pub fn ether(n: u64) -> U256 {
    U256::exp10(18) * U256::from(n)
}

/// One hop through the mock router at its default rate
pub fn after_hop(amount: U256) -> U256 {
    amount * U256::from(95u64) / U256::from(100u64)
}

pub fn registry() -> TokenRegistry {
    TokenRegistry::new(
        vec![
            Token::native("SEI", 18),
            Token::erc20("WSEI", 18, wsei()),
            Token::erc20("USDC", 6, usdc()),
            Token::erc20("FROG", 18, frog()),
        ],
        wsei(),
    )
}

pub fn set_pair(state: &mut MockState, reserves: PairReserves) {
    if let Some(entry) = state.pairs.iter_mut().find(|(_, _, r)| r.pair == reserves.pair) {
        entry.2 = reserves;
    }
}

pub fn ready_gate() -> Gate {
    Gate::derive(true, &WalletSnapshot::connected(owner(), CHAIN_ID), CHAIN_ID)
}

pub fn settings() -> Settings {
    Settings::default()
        .with_router(router())
        .with_streak_contract(Some(streak()))
}

/// In-memory chain: balances, allowances and a constant-rate router
#[derive(Debug)]
pub struct MockState {
    pub native: HashMap<Address, U256>,
    pub tokens: HashMap<(Address, Address), U256>,
    pub allowances: HashMap<(Address, Address, Address), U256>,
    /// Output = input * rate.0 / rate.1 for every hop
    pub rate: (u64, u64),
    /// (token_a, token_b, reserves)
    pub pairs: Vec<(Address, Address, PairReserves)>,
    pub simulated: Vec<TxRequest>,
    pub submitted: Vec<TxRequest>,
    /// Outcome for every non-approve transaction
    pub outcome: TxOutcome,
    pub approve_outcome: TxOutcome,
    /// Allowance reads that still return the old value after an approve
    pub allowance_lag: usize,
    /// Approvals never show up in allowance reads
    pub hide_approvals: bool,
    pub reject_submit: bool,
    /// Provider error text returned by every simulation
    pub fail_simulation: Option<String>,
    /// Runs once, when the next approve is submitted
    pub on_approve: Option<fn(&mut MockState)>,
    /// Chain the provider reports
    pub chain_id: u64,
    pending_approvals: Vec<((Address, Address, Address), U256, usize)>,
    next_hash: u64,
}

pub struct MockChain {
    pub state: Mutex<MockState>,
    pub submit_delay: Duration,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                native: HashMap::new(),
                tokens: HashMap::new(),
                allowances: HashMap::new(),
                rate: (95, 100),
                pairs: Vec::new(),
                simulated: Vec::new(),
                submitted: Vec::new(),
                outcome: TxOutcome::Confirmed { block_number: Some(1) },
                approve_outcome: TxOutcome::Confirmed { block_number: Some(1) },
                allowance_lag: 0,
                hide_approvals: false,
                reject_submit: false,
                fail_simulation: None,
                on_approve: None,
                chain_id: CHAIN_ID,
                pending_approvals: Vec::new(),
                next_hash: 1,
            }),
            submit_delay: Duration::ZERO,
        }
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn set_native(&self, owner: Address, amount: U256) {
        self.state.lock().unwrap().native.insert(owner, amount);
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state.lock().unwrap().tokens.insert((token, owner), amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state.lock().unwrap().allowances.insert((token, owner, spender), amount);
    }

    pub fn add_pair(&self, token_a: Address, token_b: Address, reserves: PairReserves) {
        self.state.lock().unwrap().pairs.push((token_a, token_b, reserves));
    }

    pub fn configure(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn submitted(&self) -> Vec<TxRequest> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn simulated(&self) -> Vec<TxRequest> {
        self.state.lock().unwrap().simulated.clone()
    }

    pub fn approvals(&self) -> Vec<U256> {
        self.submitted()
            .into_iter()
            .filter_map(|r| match r {
                TxRequest::Approve { amount, .. } => Some(amount),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn current_chain_id(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        Ok(self.state.lock().unwrap().native.get(&owner).copied().unwrap_or_default())
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        Ok(self.state.lock().unwrap().tokens.get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let mut state = self.state.lock().unwrap();
        let key = (token, owner, spender);

        let mut landed = None;
        for entry in state.pending_approvals.iter_mut().filter(|(k, _, _)| *k == key) {
            if entry.2 == 0 {
                landed = Some(entry.1);
            } else {
                entry.2 -= 1;
            }
        }
        if let Some(amount) = landed {
            state.pending_approvals.retain(|(k, _, _)| *k != key);
            state.allowances.insert(key, amount);
        }

        Ok(state.allowances.get(&key).copied().unwrap_or_default())
    }

    async fn amounts_out(&self, _router: Address, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        let (num, den) = self.state.lock().unwrap().rate;
        let mut amounts = vec![amount_in];
        let mut current = amount_in;
        for _ in 1..path.len() {
            current = current * U256::from(num) / U256::from(den);
            amounts.push(current);
        }
        Ok(amounts)
    }

    async fn pair_reserves(&self, _router: Address, token_a: Address, token_b: Address) -> Result<Option<PairReserves>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pairs
            .iter()
            .find(|(a, b, _)| (*a == token_a && *b == token_b) || (*a == token_b && *b == token_a))
            .map(|(_, _, reserves)| *reserves))
    }

    async fn simulate(&self, _from: Address, request: &TxRequest) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.simulated.push(request.clone());
        match &state.fail_simulation {
            Some(reason) => Err(DappError::SimulationError(reason.clone())),
            None => Ok(()),
        }
    }

    async fn submit(&self, from: Address, request: &TxRequest) -> Result<TxHash> {
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.reject_submit {
            return Err(DappError::SubmissionError("user rejected transaction".to_string()));
        }

        if let TxRequest::Approve { token, spender, amount } = request {
            if matches!(state.approve_outcome, TxOutcome::Confirmed { .. }) {
                let lag = if state.hide_approvals { usize::MAX } else { state.allowance_lag };
                state.pending_approvals.push(((*token, from, *spender), *amount, lag));
            }
            if let Some(hook) = state.on_approve.take() {
                hook(&mut *state);
            }
        }

        state.submitted.push(request.clone());
        let hash = TxHash::from_low_u64_be(state.next_hash);
        state.next_hash += 1;
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash, _timeout: Duration) -> Result<TxOutcome> {
        let state = self.state.lock().unwrap();
        let index = hash.to_low_u64_be().saturating_sub(1) as usize;
        match state.submitted.get(index) {
            Some(TxRequest::Approve { .. }) => Ok(state.approve_outcome),
            Some(_) => Ok(state.outcome),
            None => Ok(TxOutcome::Dropped),
        }
    }
}

pub fn executor(chain: Arc<MockChain>, bus: RefreshBus) -> Executor {
    Executor::new("swap", chain, Arc::new(registry()), settings(), bus)
}
