//! Manual smoke test against the exchange testnet.
//!
//! Fetches data through `exchange_client`, shapes it with `candle_frame`,
//! and prints the result. Credentials come from `BINANCE_API_KEY` /
//! `BINANCE_API_SECRET`, optionally via a local `.env` file.

use anyhow::{Context, Result};
use candle_frame::{IndicatorSpec, add_indicators, klines_to_table};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use exchange_client::{
    BinanceClient, ClientConfig, KlineInterval, KlinesRequest, MarketDataSource,
};

#[derive(Parser)]
#[command(version, about = "Testnet market data smoke test")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch candlestick history and print it as a table
    Klines {
        /// Trading pair (e.g. BTCUSDT)
        #[arg(long)]
        symbol: String,

        /// Candle interval (1m, 5m, 1h, 1d, ...)
        #[arg(long, default_value = "1h")]
        interval: KlineInterval,

        /// Number of candles, 1..=1000
        #[arg(long, default_value_t = 100)]
        limit: u32,

        /// Start of the range, RFC3339 (e.g. "2025-01-01T00:00:00Z")
        #[arg(long)]
        start: Option<String>,

        /// End of the range, RFC3339
        #[arg(long)]
        end: Option<String>,

        /// Indicator column to append, as <kind>:<window> (repeatable)
        #[arg(long = "indicator")]
        indicators: Vec<IndicatorSpec>,
    },

    /// Print the latest traded price for a symbol
    Price {
        #[arg(long)]
        symbol: String,
    },

    /// Print account balances
    Balances {
        /// Comma-separated asset filter (e.g. "USDT,BTC"); empty means all
        #[arg(long)]
        assets: Option<String>,
    },
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("'{value}' is not an RFC3339 datetime"))?;
    Ok(parsed.with_timezone(&Utc))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let client = BinanceClient::new(config)?;

    match cli.command {
        Commands::Klines {
            symbol,
            interval,
            limit,
            start,
            end,
            indicators,
        } => {
            let start = start.as_deref().map(parse_rfc3339).transpose()?;
            let end = end.as_deref().map(parse_rfc3339).transpose()?;
            let request = KlinesRequest::new(&symbol, interval)
                .with_limit(limit)
                .with_range(start, end);

            let raw = client.fetch_klines(&request)?;
            log::info!("fetched {} klines for {}", raw.len(), request.symbol);

            let mut table = klines_to_table(&raw)?;
            if !indicators.is_empty() {
                table = add_indicators(&table, &indicators)?;
            }
            println!("{table}");
        }

        Commands::Price { symbol } => {
            let price = client.fetch_price(&symbol)?;
            println!("{} {price}", symbol.to_ascii_uppercase());
        }

        Commands::Balances { assets } => {
            let filter: Vec<String> = assets
                .map(|s| {
                    s.split(',')
                        .map(|a| a.trim().to_ascii_uppercase())
                        .filter(|a| !a.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            let balances = client.fetch_balances(&filter)?;
            if balances.is_empty() {
                println!("no balances reported");
            }
            for (asset, balance) in &balances {
                println!("{asset}: {} (free), {} (locked)", balance.free, balance.locked);
            }
        }
    }

    Ok(())
}
