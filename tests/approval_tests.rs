mod common;

use std::sync::Arc;
use ethers::types::U256;
use frog_swap::models::{Token, TxOutcome};
use frog_swap::swap::{ApprovalAmount, ApprovalOrchestrator, ApprovalPolicy};
use frog_swap::DappError;
use common::*;

fn orchestrator(chain: &Arc<MockChain>, amount: ApprovalAmount) -> ApprovalOrchestrator {
    let policy = ApprovalPolicy {
        amount,
        ..ApprovalPolicy::default()
    };
    ApprovalOrchestrator::new(chain.clone(), policy)
}

fn usdc_token() -> Token {
    Token::erc20("USDC", 6, usdc())
}

#[tokio::test]
async fn test_sufficient_allowance_sends_nothing() {
    let chain = Arc::new(MockChain::new());
    chain.set_allowance(usdc(), owner(), router(), U256::from(500u64));

    let sent = orchestrator(&chain, ApprovalAmount::Exact)
        .ensure_approval(owner(), &usdc_token(), router(), U256::from(500u64), U256::from(500u64))
        .await
        .unwrap();

    assert!(sent.is_empty());
    assert!(chain.submitted().is_empty());
}

#[tokio::test]
async fn test_native_needs_no_approval() {
    let chain = Arc::new(MockChain::new());

    let sent = orchestrator(&chain, ApprovalAmount::Exact)
        .ensure_approval(owner(), &Token::native("SEI", 18), router(), U256::from(10u64), U256::zero())
        .await
        .unwrap();

    assert!(sent.is_empty());
    assert!(chain.submitted().is_empty());
}

#[tokio::test]
async fn test_reset_then_approve_exact() {
    let chain = Arc::new(MockChain::new());
    chain.set_allowance(usdc(), owner(), router(), U256::from(100u64));

    let sent = orchestrator(&chain, ApprovalAmount::Exact)
        .ensure_approval(owner(), &usdc_token(), router(), U256::from(500u64), U256::from(100u64))
        .await
        .unwrap();

    assert_eq!(sent.len(), 2);
    assert_eq!(chain.approvals(), vec![U256::zero(), U256::from(500u64)]);
    assert!(chain.simulated().is_empty());
    assert_eq!(
        chain.state.lock().unwrap().allowances[&(usdc(), owner(), router())],
        U256::from(500u64)
    );
}

#[tokio::test]
async fn test_no_reset_for_tokens_that_allow_overwrite() {
    let chain = Arc::new(MockChain::new());
    chain.set_allowance(frog(), owner(), router(), U256::from(100u64));
    let token = Token::erc20("FROG", 18, frog()).without_allowance_reset();

    let sent = orchestrator(&chain, ApprovalAmount::Exact)
        .ensure_approval(owner(), &token, router(), U256::from(500u64), U256::from(100u64))
        .await
        .unwrap();

    assert_eq!(sent.len(), 1);
    assert_eq!(chain.approvals(), vec![U256::from(500u64)]);
}

#[tokio::test]
async fn test_unlimited_approval() {
    let chain = Arc::new(MockChain::new());

    orchestrator(&chain, ApprovalAmount::Unlimited)
        .ensure_approval(owner(), &usdc_token(), router(), U256::from(500u64), U256::zero())
        .await
        .unwrap();

    assert_eq!(chain.approvals(), vec![U256::MAX]);
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_lagging_node() {
    let chain = Arc::new(MockChain::new());
    chain.configure(|s| s.allowance_lag = 3);

    let sent = orchestrator(&chain, ApprovalAmount::Exact)
        .ensure_approval(owner(), &usdc_token(), router(), U256::from(500u64), U256::zero())
        .await
        .unwrap();

    assert_eq!(sent.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_allowance_never_observed() {
    let chain = Arc::new(MockChain::new());
    chain.configure(|s| s.hide_approvals = true);

    let err = orchestrator(&chain, ApprovalAmount::Exact)
        .ensure_approval(owner(), &usdc_token(), router(), U256::from(500u64), U256::zero())
        .await
        .unwrap_err();

    match err {
        DappError::AllowanceNotObserved { token, spender, waited_secs } => {
            assert_eq!(token, usdc());
            assert_eq!(spender, router());
            assert_eq!(waited_secs, 25);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_reverted_approval() {
    let chain = Arc::new(MockChain::new());
    chain.configure(|s| s.approve_outcome = TxOutcome::Reverted);

    let err = orchestrator(&chain, ApprovalAmount::Exact)
        .ensure_approval(owner(), &usdc_token(), router(), U256::from(500u64), U256::zero())
        .await
        .unwrap_err();

    assert!(matches!(err, DappError::ApprovalReverted(_)));
}

#[tokio::test]
async fn test_rejected_approval() {
    let chain = Arc::new(MockChain::new());
    chain.configure(|s| s.reject_submit = true);

    let err = orchestrator(&chain, ApprovalAmount::Exact)
        .ensure_approval(owner(), &usdc_token(), router(), U256::from(500u64), U256::zero())
        .await
        .unwrap_err();

    assert!(matches!(err, DappError::UserRejected));
    assert!(chain.submitted().is_empty());
}
