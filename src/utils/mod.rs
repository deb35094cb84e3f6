pub mod amounts;
pub mod errors;
pub mod retry;

pub use amounts::{format_amount, parse_amount};
pub use errors::{classify_failure, DappError, FailureKind, Result};
pub use retry::retry_with_backoff;
