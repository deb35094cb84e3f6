use ethers::types::{Address, TxHash, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DappError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    RpcError(#[from] ethers::providers::ProviderError),

    #[error("Contract call failed: {0}")]
    ContractError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wrong network: expected chain {expected}, wallet is on {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Select a different token")]
    SameToken,

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid slippage: {0} bps")]
    InvalidSlippage(u32),

    #[error("Insufficient {symbol} balance: need {required}, have {available}")]
    InsufficientBalance {
        symbol: String,
        required: U256,
        available: U256,
    },

    #[error("No quote available")]
    NoQuote,

    #[error("Quote is out of date")]
    StaleQuote,

    #[error("Another transaction is already in progress")]
    Busy,

    #[error("No liquidity pool for this pair")]
    NoPool,

    #[error("Transaction rejected in wallet")]
    UserRejected,

    #[error("Simulation failed: {0}")]
    SimulationError(String),

    #[error("Submission failed: {0}")]
    SubmissionError(String),

    #[error("Approval transaction {0:?} reverted")]
    ApprovalReverted(TxHash),

    #[error("Allowance for {spender:?} on {token:?} not updated after {waited_secs}s")]
    AllowanceNotObserved {
        token: Address,
        spender: Address,
        waited_secs: u64,
    },

    #[error("Transaction {0:?} reverted")]
    Reverted(TxHash),

    #[error("Transaction {0:?} not confirmed in time")]
    Dropped(TxHash),

    #[error("Illegal transaction state change: {0}")]
    InvalidTransition(String),

    #[error("Upstream request failed: {0}")]
    UpstreamError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DappError>;

/// Why a write failed, as far as the provider's error text tells us
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    UserRejected,
    SlippageExceeded,
    TransferFailed,
    DeadlineExpired,
    InsufficientFunds,
    Unknown(String),
}

impl FailureKind {
    pub fn user_message(&self) -> String {
        match self {
            FailureKind::UserRejected => "Transaction was rejected in the wallet".to_string(),
            FailureKind::SlippageExceeded => {
                "Price moved beyond your slippage tolerance. Try again or raise slippage".to_string()
            }
            FailureKind::TransferFailed => {
                "Token transfer failed. Check your balance and approval".to_string()
            }
            FailureKind::DeadlineExpired => "Transaction deadline expired. Please retry".to_string(),
            FailureKind::InsufficientFunds => "Not enough SEI to pay for gas".to_string(),
            FailureKind::Unknown(msg) => format!("Transaction failed: {}", msg),
        }
    }
}

/// Classify a provider/router error string
pub fn classify_failure(error: &str) -> FailureKind {
    let error_lower = error.to_lowercase();

    if error_lower.contains("user rejected")
        || error_lower.contains("user denied")
        || error_lower.contains("action_rejected")
        || error_lower.contains("rejected the request")
    {
        FailureKind::UserRejected
    } else if error_lower.contains("insufficient_output_amount")
        || error_lower.contains("insufficient_a_amount")
        || error_lower.contains("insufficient_b_amount")
        || error_lower.contains("slippage")
        || error_lower.contains("excessive_input_amount")
    {
        FailureKind::SlippageExceeded
    } else if error_lower.contains("expired") {
        FailureKind::DeadlineExpired
    } else if error_lower.contains("insufficient funds") {
        FailureKind::InsufficientFunds
    } else if error_lower.contains("transfer_from_failed")
        || error_lower.contains("transfer_failed")
        || error_lower.contains("transfer amount exceeds")
        || error_lower.contains("allowance")
    {
        FailureKind::TransferFailed
    } else {
        FailureKind::Unknown(error.to_string())
    }
}

impl DappError {
    /// Whether this error is the user declining, which is not reported as a failure
    pub fn is_rejection(&self) -> bool {
        match self {
            DappError::UserRejected => true,
            DappError::SimulationError(msg) | DappError::SubmissionError(msg) => {
                classify_failure(msg) == FailureKind::UserRejected
            }
            _ => false,
        }
    }

    /// Text suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            DappError::SimulationError(msg) | DappError::SubmissionError(msg) => {
                classify_failure(msg).user_message()
            }
            DappError::UserRejected => FailureKind::UserRejected.user_message(),
            DappError::ApprovalReverted(_) => "Approval transaction reverted".to_string(),
            DappError::AllowanceNotObserved { .. } => {
                "Approval confirmed but the new allowance is not visible yet. Please retry shortly"
                    .to_string()
            }
            DappError::Reverted(_) => "Transaction reverted on chain".to_string(),
            DappError::Dropped(_) => "Transaction was not confirmed in time".to_string(),
            other => other.to_string(),
        }
    }
}
