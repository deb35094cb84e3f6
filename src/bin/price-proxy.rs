use std::net::SocketAddr;
use std::sync::Arc;
use clap::Parser;
use ethers::types::Address;
use frog_swap::prices::{start_server, HttpPriceFeed, PriceState};

/// Cached FROG and SEI prices over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// FROG token contract to look up on DexScreener
    #[arg(long, env = "FROG_TOKEN_ADDRESS")]
    frog: Address,

    /// Listen address
    #[arg(long, env = "FROG_PRICE_PROXY_ADDR", default_value = "127.0.0.1:8787")]
    listen: SocketAddr,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Setup logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("frog_swap=debug,price_proxy=debug,tower_http=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("frog_swap=info,price_proxy=info")
            .init();
    }

    let feed = Arc::new(HttpPriceFeed::new()?);
    let state = PriceState::new(feed, args.frog);

    start_server(state, args.listen).await?;
    Ok(())
}
