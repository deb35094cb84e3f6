pub mod gate;
pub mod refresh;
pub mod traits;

pub use gate::{Gate, WalletSnapshot};
pub use refresh::{RefreshBus, RefreshSignal, Subscription};
pub use traits::{ChainClient, PairReserves};
