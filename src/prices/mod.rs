//! Read-only price pass-through with short in-process caching
pub mod cache;
pub mod server;
pub mod upstream;

pub use cache::TtlCache;
pub use server::{create_router, start_server, PriceState};
pub use upstream::{HttpPriceFeed, PriceFeed, SeiPrice, TokenStats};
