pub mod config;
pub mod contracts;      // Router, pair, ERC-20 and streak interfaces
pub mod prices;         // Price pass-through endpoints

pub mod core;
pub mod models;
pub mod swap;
pub mod blockchain;
pub mod utils;

pub use config::Settings;
pub use core::{ChainClient, Gate, RefreshBus};
pub use models::{Notification, Token, TokenRegistry};
pub use swap::{Executor, QuoteEngine};
pub use utils::{DappError, Result};
