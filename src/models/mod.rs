pub mod notification;
pub mod route;
pub mod token;
pub mod transaction;

pub use notification::{Notification, NotificationLevel};
pub use route::{resolve_route, Route, SwapShape};
pub use token::{Token, TokenRegistry, NATIVE_SYMBOL};
pub use transaction::{PendingTx, PendingTxTracker, TxKind, TxOutcome, TxStage};
