//! Virtuals command line

use std::sync::Arc;

use clap::{Parser, Subcommand};
use common::decimal::{price, token};
use common::error::{ErrorExt, Result};
use common::model::{Address, Ticker};
use dotenv::dotenv;
use price_oracle::{FixedPriceFeed, PriceFeed};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;
use trading_engine::{TradingEngine, VirtualsConfig, VirtualsService, BASE_TICKER};

/// Virtuals CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Commands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a buy and a sell against fixed feeds and print the event log
    Demo {
        /// Genesis supply in VRT, overrides VRT_INITIAL_SUPPLY
        #[arg(short, long)]
        initial_supply: Option<String>,

        /// Owner address, overrides VRT_OWNER
        #[arg(short, long)]
        owner: Option<Address>,

        /// Fee reserve address, overrides VRT_CONTRACT_ADDRESS
        #[arg(short, long)]
        contract_address: Option<Address>,

        /// Log every committed ledger event
        #[arg(short, long)]
        event_logging: bool,
    },
    /// Price a buy at the given feed prices
    Quote {
        /// Asset ticker
        #[arg(short, long, default_value = "BTC")]
        ticker: String,

        /// Asset quantity, e.g. 0.5
        #[arg(short, long)]
        quantity: String,

        /// Asset price, e.g. 600
        #[arg(short, long)]
        asset_price: String,

        /// VRT price, e.g. 50
        #[arg(short, long)]
        base_price: String,
    },
}

fn fixed_feed(value: &str) -> Result<Arc<dyn PriceFeed>> {
    Ok(Arc::new(FixedPriceFeed::new(price::parse(value)?)))
}

/// Print the outcome of a step that may be rejected
fn report<T>(step: &str, result: Result<T>) {
    match result {
        Ok(_) => info!("{}: ok", step),
        Err(e) => info!("{}: rejected ({})", step, e),
    }
}

async fn run_demo(config: VirtualsConfig) -> Result<()> {
    let owner = config.owner;
    let trader = Address::random();
    let service = VirtualsService::with_config(&config)?;

    service.add_or_update_price_feed(&owner, "BTC", fixed_feed("600")?).await?;
    service.add_or_update_price_feed(&owner, BASE_TICKER, fixed_feed("50")?).await?;

    let half = token::parse("0.5")?;
    report("Buy 0.5 BTC with no VRT", service.buy(&trader, "BTC", half).await);

    service.transfer(&owner, &trader, token::parse("6")?).await?;
    report("Buy 0.5 BTC with 6 VRT", service.buy(&trader, "BTC", half).await);

    service.transfer(&owner, &trader, token::parse("0.018")?).await?;
    report("Buy 0.5 BTC with 6.018 VRT", service.buy(&trader, "BTC", half).await);

    service.add_or_update_price_feed(&owner, "BTC", fixed_feed("400")?).await?;
    report("Sell 0.6 BTC", service.sell(&trader, "BTC", token::parse("0.6")?).await);
    report("Sell 0.5 BTC with no VRT", service.sell(&trader, "BTC", half).await);

    service.transfer(&owner, &trader, token::parse("0.012")?).await?;
    report("Sell 0.5 BTC with 0.012 VRT", service.sell(&trader, "BTC", half).await);

    let summary = service.account(&trader).await;
    info!(
        "Trader {} ends with {} VRT, fee reserve holds {} VRT",
        trader,
        token::format(summary.balance),
        token::format(service.fee_reserve().await)
    );

    let events = service.events_since(0).await;
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

fn run_quote(ticker: &str, quantity: &str, asset_price: &str, base_price: &str) -> Result<()> {
    let owner = Address::random();
    let mut engine = TradingEngine::new(owner, Address::random(), 0)?;
    let ticker = Ticker::new(ticker)?;

    engine.add_or_update_price_feed(&owner, ticker.clone(), fixed_feed(asset_price)?)?;
    engine.add_or_update_price_feed(&owner, Ticker::new(BASE_TICKER)?, fixed_feed(base_price)?)?;

    let quote = engine.quote_buy(&ticker, token::parse(quantity)?)?;
    debug!("Quote: {:?}", quote);

    println!(
        "{} {} costs {} VRT plus {} VRT fee",
        quantity,
        ticker,
        token::format(quote.token_amount),
        token::format(quote.fee)
    );
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    let cli = Cli::parse();

    // DEBUG=1 in .env overrides the command line level
    let env_debug = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env_debug == "1" {
        Level::DEBUG
    } else {
        cli.log_level.parse::<Level>().unwrap_or(Level::INFO)
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    match cli.command {
        Commands::Demo { initial_supply, owner, contract_address, event_logging } => {
            let initial_supply = initial_supply
                .map(|supply| token::parse(&supply).with_context(|| "--initial-supply"))
                .transpose()?;
            let config = VirtualsConfig::from_env()?
                .with_overrides(initial_supply, owner, contract_address, event_logging);
            run_demo(config).await?;
        }
        Commands::Quote { ticker, quantity, asset_price, base_price } => {
            run_quote(&ticker, &quantity, &asset_price, &base_price)?;
        }
    }

    Ok(())
}
