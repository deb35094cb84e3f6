use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use clap::{Parser, Subcommand};
use ethers::types::Address;
use tokio::sync::mpsc;
use frog_swap::blockchain::{fetch_balances, BlockchainClient};
use frog_swap::contracts::addresses;
use frog_swap::core::{ChainClient, Gate, RefreshBus, WalletSnapshot};
use frog_swap::models::{resolve_route, Notification, TokenRegistry};
use frog_swap::swap::{
    AddLiquidityOrder, ApprovalAmount, ExecutionReceipt, Executor, LiquidityAmount, QuoteEngine,
    RemoveLiquidityOrder, SwapOrder,
};
use frog_swap::utils::{format_amount, parse_amount};
use frog_swap::{DappError, Result, Settings};

/// FROG on Sei EVM - swaps, liquidity and daily check-ins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sei EVM RPC URL
    #[arg(long, env = "FROG_RPC_URL", default_value = addresses::SEI_RPC_URL)]
    rpc: String,

    /// Chain the wallet must be on
    #[arg(long, env = "FROG_CHAIN_ID", default_value_t = addresses::SEI_CHAIN_ID)]
    chain_id: u64,

    /// DragonSwap router
    #[arg(long, env = "FROG_ROUTER", default_value = addresses::DRAGON_ROUTER)]
    router: Address,

    /// FROG token contract
    #[arg(long, env = "FROG_TOKEN_ADDRESS")]
    frog: Option<Address>,

    /// Streak (check-in) contract
    #[arg(long, env = "FROG_STREAK_ADDRESS")]
    streak: Option<Address>,

    /// Signing key; without one only reads work
    #[arg(long, env = "FROG_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Slippage tolerance in basis points
    #[arg(long, default_value_t = frog_swap::config::DEFAULT_SLIPPAGE_BPS)]
    slippage_bps: u32,

    /// Approve U256::MAX instead of the exact amount
    #[arg(long)]
    unlimited_approval: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wallet balances for every listed token
    Balances {
        /// Account to inspect (defaults to the loaded wallet)
        #[arg(long)]
        account: Option<Address>,
    },
    /// Expected output for a swap
    Quote {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Swap one token for another
    Swap {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        /// Send the output elsewhere
        #[arg(long)]
        recipient: Option<Address>,
    },
    /// Deposit a token pair into its pool
    AddLiquidity {
        #[arg(long)]
        token_a: String,
        #[arg(long)]
        token_b: String,
        #[arg(long)]
        amount_a: String,
        /// Filled from the pool ratio when omitted
        #[arg(long)]
        amount_b: Option<String>,
    },
    /// Withdraw a share of an LP position
    RemoveLiquidity {
        #[arg(long)]
        token_a: String,
        #[arg(long)]
        token_b: String,
        /// Percentage of the LP balance (1-100)
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=100))]
        percent: u8,
    },
    /// Daily check-in on the streak contract
    CheckIn,
    /// Current check-in streak
    Streak {
        #[arg(long)]
        account: Option<Address>,
    },
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Setup logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("frog_swap=debug,frog=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("frog_swap=info,frog=info")
            .init();
    }

    println!("\n🐸 FROG on Sei");
    println!("================================\n");

    print!("Connecting to {}... ", args.rpc);
    io::stdout().flush()?;
    let mut client = BlockchainClient::new(&args.rpc).await?;
    if let Some(key) = &args.private_key {
        client = client.with_wallet(key)?;
    }
    println!("✅ Connected to {} (chain {})", client.chain_name(), client.chain_id());

    let client = Arc::new(client);
    let chain: Arc<dyn ChainClient> = client.clone();

    let wallet = WalletSnapshot::observe(chain.as_ref(), client.wallet_address()).await?;
    let gate = Gate::derive(true, &wallet, args.chain_id);
    if let Some(address) = gate.address {
        println!("👛 Wallet: {:?}", address);
    }
    if gate.wrong_network {
        println!("⚠️  Wrong network: expected chain {}, connected to {}", args.chain_id, gate.chain_id);
    }
    println!();
    let registry = Arc::new(TokenRegistry::sei_mainnet(args.frog));
    let approval_amount = if args.unlimited_approval {
        ApprovalAmount::Unlimited
    } else {
        ApprovalAmount::Exact
    };
    let settings = Settings {
        chain_id: args.chain_id,
        ..Settings::default()
    }
    .with_router(args.router)
    .with_streak_contract(args.streak)
    .with_slippage_bps(args.slippage_bps)
    .with_approval_amount(approval_amount);

    // Toasts
    let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
    let printer = tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            println!("{}", notification);
        }
    });

    // The balances view refreshes whenever another feature confirms a transaction
    let bus = RefreshBus::new();
    let balances_stale = Arc::new(AtomicBool::new(false));
    let flag = balances_stale.clone();
    let _balances = bus.subscribe("balances", move |signal| {
        tracing::debug!("Refresh requested by {}", signal.source);
        flag.store(true, Ordering::SeqCst);
    });

    let source = match &args.command {
        Command::AddLiquidity { .. } | Command::RemoveLiquidity { .. } => "liquidity",
        Command::CheckIn => "streak",
        _ => "swap",
    };
    let executor = Executor::new(source, chain.clone(), registry.clone(), settings.clone(), bus.clone())
        .with_notifications(tx);

    let outcome = run(&args, &client, chain.clone(), &gate, &registry, &settings, &executor).await;

    drop(executor);
    let _ = printer.await;

    match outcome {
        Ok(()) => {
            if balances_stale.load(Ordering::SeqCst) {
                if let Some(owner) = gate.address {
                    println!("\n🔄 Updated balances:");
                    print_balances(chain.as_ref(), &registry, owner).await?;
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("\n❌ {}", e.user_message());
            std::process::exit(1);
        }
    }
}

async fn run(
    args: &Args,
    client: &BlockchainClient,
    chain: Arc<dyn ChainClient>,
    gate: &Gate,
    registry: &TokenRegistry,
    settings: &Settings,
    executor: &Executor,
) -> Result<()> {
    // Every command reads chain state; nothing runs against the wrong network
    gate.require_readable()?;

    match &args.command {
        Command::Balances { account } => {
            let owner = account.or(gate.address).ok_or(DappError::WalletNotConnected)?;
            println!("📊 Balances for {:?}", owner);
            print_balances(client, registry, owner).await
        }

        Command::Quote { from, to, amount } => {
            let from = registry.get(from)?;
            let to = registry.get(to)?;
            let (_, route) = resolve_route(registry, from, to)?;
            let amount_in = parse_amount(amount, from.decimals)?;

            let engine = QuoteEngine::new(chain.clone(), settings.router)
                .with_retries(settings.read_retries, settings.read_backoff);
            let view = engine
                .get_quote(amount_in, route.path(), args.slippage_bps, to.decimals)
                .await;

            match (view.error_message, view.out_formatted, view.min_out) {
                (Some(message), _, _) => println!("⚠️  {}", message),
                (None, Some(out), Some(min)) => {
                    println!("💱 {} {} → {} {}", amount, from.symbol, out, to.symbol);
                    println!("   Minimum received ({} bps): {} {}",
                        args.slippage_bps, format_amount(min, to.decimals), to.symbol);
                }
                _ => println!("⚠️  {}", DappError::NoQuote),
            }
            Ok(())
        }

        Command::Swap { from, to, amount, recipient } => {
            let from = registry.get(from)?.clone();
            let to = registry.get(to)?.clone();
            let (_, route) = resolve_route(registry, &from, &to)?;
            let amount_in = parse_amount(amount, from.decimals)?;

            let engine = QuoteEngine::new(chain.clone(), settings.router)
                .with_retries(settings.read_retries, settings.read_backoff);
            let quote = engine
                .fetch(amount_in, route.path(), args.slippage_bps, to.decimals, amount)
                .await?;

            if let Some(quote) = &quote {
                println!("💱 {} {} → ~{} {}", amount, from.symbol, quote.out_formatted(), to.symbol);
                println!("   Minimum received: {} {}", format_amount(quote.min_out, to.decimals), to.symbol);
            }
            if quote.is_some() && !confirm(args.yes, "Submit swap?")? {
                println!("Cancelled");
                return Ok(());
            }

            let order = SwapOrder {
                from,
                to,
                input_text: amount.clone(),
                quote,
                quote_stale: false,
                slippage_bps: args.slippage_bps,
                recipient: *recipient,
            };
            let receipt = executor.swap(gate, &order).await?;
            print_receipt(&receipt);
            Ok(())
        }

        Command::AddLiquidity { token_a, token_b, amount_a, amount_b } => {
            let order = AddLiquidityOrder {
                token_a: registry.get(token_a)?.clone(),
                token_b: registry.get(token_b)?.clone(),
                amount_a_text: amount_a.clone(),
                amount_b_text: amount_b.clone(),
                slippage_bps: args.slippage_bps,
            };

            let estimate = executor.preview_add(gate, &order).await?;
            println!("💧 Deposit {} {} + {} {}",
                format_amount(estimate.amount_a, order.token_a.decimals), order.token_a.symbol,
                format_amount(estimate.amount_b, order.token_b.decimals), order.token_b.symbol);
            if !estimate.pool_exists {
                println!("   No pool yet: this deposit sets the initial price");
            }
            if !confirm(args.yes, "Add liquidity?")? {
                println!("Cancelled");
                return Ok(());
            }

            let receipt = executor.add_liquidity(gate, &order).await?;
            print_receipt(&receipt);
            Ok(())
        }

        Command::RemoveLiquidity { token_a, token_b, percent } => {
            let order = RemoveLiquidityOrder {
                token_a: registry.get(token_a)?.clone(),
                token_b: registry.get(token_b)?.clone(),
                amount: LiquidityAmount::Percent(*percent),
                slippage_bps: args.slippage_bps,
            };

            let estimate = executor.preview_removal(gate, &order).await?;
            println!("💧 Burn {} of {} LP for about {} {} + {} {}",
                format_amount(estimate.liquidity, 18), format_amount(estimate.lp_balance, 18),
                format_amount(estimate.amount_a, order.token_a.decimals), order.token_a.symbol,
                format_amount(estimate.amount_b, order.token_b.decimals), order.token_b.symbol);
            if !confirm(args.yes, "Remove liquidity?")? {
                println!("Cancelled");
                return Ok(());
            }

            let receipt = executor.remove_liquidity(gate, &order).await?;
            print_receipt(&receipt);
            Ok(())
        }

        Command::CheckIn => {
            let receipt = executor.check_in(gate).await?;
            print_receipt(&receipt);
            Ok(())
        }

        Command::Streak { account } => {
            let contract = settings
                .streak_contract
                .ok_or_else(|| DappError::ConfigError("FROG_STREAK_ADDRESS is not set".to_string()))?;
            let owner = account.or(gate.address).ok_or(DappError::WalletNotConnected)?;
            let (streak, last) = client.streak_of(contract, owner).await?;

            println!("🔥 Streak: {} day(s)", streak);
            match chrono::DateTime::<chrono::Utc>::from_timestamp(last.low_u64() as i64, 0) {
                Some(at) if !last.is_zero() => println!("   Last check-in: {}", at.format("%Y-%m-%d %H:%M UTC")),
                _ => println!("   No check-in yet"),
            }
            Ok(())
        }
    }
}

async fn print_balances(chain: &dyn ChainClient, registry: &TokenRegistry, owner: Address) -> Result<()> {
    for balance in fetch_balances(chain, registry, owner).await? {
        println!("   • {:<5} {}", balance.symbol, balance.formatted);
    }
    Ok(())
}

fn print_receipt(receipt: &ExecutionReceipt) {
    if !receipt.approvals.is_empty() {
        println!("   Approvals: {}", receipt.approvals.len());
    }
    println!("✅ {} confirmed: {:?}", receipt.kind.label(), receipt.hash);
}

fn confirm(skip: bool, prompt: &str) -> Result<bool> {
    if skip {
        return Ok(true);
    }
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
