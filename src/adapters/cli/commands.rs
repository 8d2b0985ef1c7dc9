//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the Sasphy curve evaluator.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::Config;
use crate::domain::curve::{
    current_price, market_cap, price_impact, sample_curve, supply_progress, CurveKind,
    CurveParameters, CurvePoint, Price, Supply,
};
use crate::domain::market::{ImpactGuard, MarketSnapshot, TradePreview, TradeSide};

/// Sasphy Curve - Fixed-point bonding curve pricing for Sasphy / Fiesta tokens
#[derive(Parser, Debug)]
#[command(
    name = "sasphy-curve",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Fixed-point bonding curve pricing for Sasphy / Fiesta tokens",
    long_about = "Evaluates the token bonding curve used by the Fiesta storefront: spot price, \
                  market cap, trade price impact, supply progress and chart samples, all in \
                  exact fixed-point arithmetic."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (defaults to config/sasphy.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Spot price at a given supply
    Price(SupplyCmd),

    /// Market cap for a price and total supply
    MarketCap(MarketCapCmd),

    /// Price impact of a buy or sell
    Impact(TradeCmd),

    /// Percentage of max supply issued
    Progress(SupplyCmd),

    /// Evenly spaced (supply, price) samples for charting
    Sample(SampleCmd),

    /// Price, market cap and progress at a given supply
    Stats(SupplyCmd),

    /// Preview a trade and check it against the price impact limit
    Preview(TradeCmd),
}

/// Curve overrides on top of the `[curve]` config section
#[derive(Args, Debug, Clone, Default)]
pub struct CurveArgs {
    /// Price at zero supply
    #[arg(long, value_name = "PRICE")]
    pub initial_price: Option<Price>,

    /// Price at max supply
    #[arg(long, value_name = "PRICE")]
    pub final_price: Option<Price>,

    /// Supply at which the curve completes
    #[arg(long, value_name = "SUPPLY")]
    pub max_supply: Option<Supply>,

    /// Curve shape: linear, exponential, logarithmic, sigmoid
    #[arg(long = "curve", value_name = "KIND")]
    pub curve_kind: Option<CurveKind>,
}

impl CurveArgs {
    /// Merge overrides into the configured curve
    pub fn resolve(&self, config: &Config) -> Result<CurveParameters> {
        let base = CurveParameters::from(&config.curve);
        CurveParameters::new(
            self.initial_price.unwrap_or(base.initial_price),
            self.final_price.unwrap_or(base.final_price),
            self.max_supply.unwrap_or(base.max_supply),
            self.curve_kind.unwrap_or(base.curve_kind),
        )
        .context("Invalid curve parameters")
    }
}

/// Command taking a single supply value
#[derive(Parser, Debug)]
pub struct SupplyCmd {
    /// Circulating supply in base units
    #[arg(value_name = "SUPPLY")]
    pub supply: Supply,

    #[command(flatten)]
    pub curve: CurveArgs,
}

/// Market cap inputs
#[derive(Parser, Debug)]
pub struct MarketCapCmd {
    /// Fixed-point price
    #[arg(value_name = "PRICE")]
    pub price: Price,

    /// Total supply in base units
    #[arg(value_name = "TOTAL_SUPPLY")]
    pub total_supply: Supply,
}

/// Trade inputs
#[derive(Parser, Debug)]
pub struct TradeCmd {
    /// Current supply in base units
    #[arg(value_name = "SUPPLY")]
    pub supply: Supply,

    /// Trade amount in base units
    #[arg(value_name = "AMOUNT")]
    pub amount: Supply,

    /// Treat the trade as a sell (default is buy)
    #[arg(long)]
    pub sell: bool,

    #[command(flatten)]
    pub curve: CurveArgs,
}

impl TradeCmd {
    fn side(&self) -> TradeSide {
        if self.sell {
            TradeSide::Sell
        } else {
            TradeSide::Buy
        }
    }
}

/// Chart sampling inputs
#[derive(Parser, Debug)]
pub struct SampleCmd {
    /// Number of points (defaults to trading.sample_points)
    #[arg(short, long, value_name = "N")]
    pub points: Option<usize>,

    #[command(flatten)]
    pub curve: CurveArgs,
}

/// Execute the CLI command against a loaded configuration
pub fn execute(app: CliApp, config: &Config) -> Result<()> {
    let format = app.format;

    match app.command {
        Command::Price(cmd) => price_command(cmd, format, config),
        Command::MarketCap(cmd) => market_cap_command(cmd, format),
        Command::Impact(cmd) => impact_command(cmd, format, config),
        Command::Progress(cmd) => progress_command(cmd, format, config),
        Command::Sample(cmd) => sample_command(cmd, format, config),
        Command::Stats(cmd) => stats_command(cmd, format, config),
        Command::Preview(cmd) => preview_command(cmd, format, config),
    }
}

/// Initialize logging system
///
/// CLI flags win over `RUST_LOG`, which wins over the configured level.
pub fn init_logging(verbose: bool, debug: bool, config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_ascii_lowercase()))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

#[derive(Serialize)]
struct PriceReport {
    curve: CurveParameters,
    supply: Supply,
    price: Price,
}

#[derive(Serialize)]
struct MarketCapReport {
    price: Price,
    total_supply: Supply,
    market_cap: Price,
}

#[derive(Serialize)]
struct ImpactReport {
    side: TradeSide,
    supply: Supply,
    amount: Supply,
    price_impact_pct: Decimal,
}

#[derive(Serialize)]
struct ProgressReport {
    supply: Supply,
    max_supply: Supply,
    progress_pct: Decimal,
}

#[derive(Serialize)]
struct SampleReport {
    curve: CurveParameters,
    points: Vec<CurvePoint>,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Handle price command
fn price_command(cmd: SupplyCmd, format: OutputFormat, config: &Config) -> Result<()> {
    let params = cmd.curve.resolve(config)?;
    let price = current_price(&params, cmd.supply).context("Failed to evaluate price")?;

    match format {
        OutputFormat::Json => print_json(&PriceReport {
            curve: params,
            supply: cmd.supply,
            price,
        }),
        OutputFormat::Text => {
            println!("Price at supply {} ({}): {}", cmd.supply, params.curve_kind, price);
            Ok(())
        }
    }
}

/// Handle market-cap command
fn market_cap_command(cmd: MarketCapCmd, format: OutputFormat) -> Result<()> {
    let cap = market_cap(cmd.price, cmd.total_supply).context("Failed to compute market cap")?;

    match format {
        OutputFormat::Json => print_json(&MarketCapReport {
            price: cmd.price,
            total_supply: cmd.total_supply,
            market_cap: cap,
        }),
        OutputFormat::Text => {
            println!("Market cap: {}", cap);
            Ok(())
        }
    }
}

/// Handle impact command
fn impact_command(cmd: TradeCmd, format: OutputFormat, config: &Config) -> Result<()> {
    let params = cmd.curve.resolve(config)?;
    let side = cmd.side();
    let impact = price_impact(&params, cmd.supply, cmd.amount, side.is_buy())
        .context("Failed to compute price impact")?;

    match format {
        OutputFormat::Json => print_json(&ImpactReport {
            side,
            supply: cmd.supply,
            amount: cmd.amount,
            price_impact_pct: impact,
        }),
        OutputFormat::Text => {
            println!("Price impact ({} {}): {:.4}%", side, cmd.amount, impact);
            Ok(())
        }
    }
}

/// Handle progress command
fn progress_command(cmd: SupplyCmd, format: OutputFormat, config: &Config) -> Result<()> {
    let max_supply = cmd.curve.max_supply.unwrap_or(config.curve.max_supply);
    let progress = supply_progress(cmd.supply, max_supply);

    match format {
        OutputFormat::Json => print_json(&ProgressReport {
            supply: cmd.supply,
            max_supply,
            progress_pct: progress,
        }),
        OutputFormat::Text => {
            println!("Supply progress: {} / {} ({:.2}%)", cmd.supply, max_supply, progress);
            Ok(())
        }
    }
}

/// Handle sample command
fn sample_command(cmd: SampleCmd, format: OutputFormat, config: &Config) -> Result<()> {
    let params = cmd.curve.resolve(config)?;
    let points = cmd.points.unwrap_or(config.trading.sample_points);
    tracing::info!("Sampling {} curve with {} points", params.curve_kind, points);

    let samples = sample_curve(&params, points).context("Failed to sample curve")?;

    match format {
        OutputFormat::Json => print_json(&SampleReport {
            curve: params,
            points: samples,
        }),
        OutputFormat::Text => {
            println!("{:>20}  {:>24}", "supply", "price");
            for point in &samples {
                println!("{:>20}  {:>24}", point.supply, point.price);
            }
            Ok(())
        }
    }
}

/// Handle stats command
fn stats_command(cmd: SupplyCmd, format: OutputFormat, config: &Config) -> Result<()> {
    let params = cmd.curve.resolve(config)?;
    let snapshot = MarketSnapshot::capture(&params, cmd.supply)
        .context("Failed to capture market snapshot")?;

    match format {
        OutputFormat::Json => print_json(&snapshot),
        OutputFormat::Text => {
            println!("┌─────────────────────────────────────┐");
            println!("│  Fiesta Token - Market Stats        │");
            println!("├─────────────────────────────────────┤");
            println!("  Curve:      {}", snapshot.curve_kind);
            println!("  Supply:     {} / {}", snapshot.supply, snapshot.max_supply);
            println!("  Progress:   {:.2}%", snapshot.progress_pct);
            println!("  Price:      {}", snapshot.price);
            println!("  Market cap: {}", snapshot.market_cap);
            if snapshot.is_complete() {
                println!("  Curve complete - price fixed at final price");
            }
            println!("└─────────────────────────────────────┘");
            Ok(())
        }
    }
}

/// Handle preview command
fn preview_command(cmd: TradeCmd, format: OutputFormat, config: &Config) -> Result<()> {
    let params = cmd.curve.resolve(config)?;
    let preview = TradePreview::compute(&params, cmd.supply, cmd.amount, cmd.side())
        .context("Failed to preview trade")?;
    let guard = ImpactGuard::from(&config.trading);

    match format {
        OutputFormat::Json => print_json(&preview)?,
        OutputFormat::Text => {
            println!("Trade preview: {} {}", preview.side, preview.amount);
            println!("  Supply: {} -> {}", preview.supply_before, preview.supply_after);
            println!("  Price:  {} -> {}", preview.price_before, preview.price_after);
            println!(
                "  Impact: {:.4}% (max {}%)",
                preview.price_impact_pct, guard.max_price_impact_pct
            );
        }
    }

    guard.check(&preview)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        CliApp::command().debug_assert();
    }

    #[test]
    fn test_parse_price_with_overrides() {
        let app = CliApp::try_parse_from([
            "sasphy-curve",
            "price",
            "500",
            "--curve",
            "exponential",
            "--max-supply",
            "1000",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(app.format, OutputFormat::Json);
        match app.command {
            Command::Price(cmd) => {
                assert_eq!(cmd.supply, 500);
                assert_eq!(cmd.curve.curve_kind, Some(CurveKind::Exponential));
                assert_eq!(cmd.curve.max_supply, Some(1000));
                assert_eq!(cmd.curve.initial_price, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_sell_trade() {
        let app = CliApp::try_parse_from(["sasphy-curve", "preview", "100", "40", "--sell"]).unwrap();
        match app.command {
            Command::Preview(cmd) => {
                assert_eq!(cmd.side(), TradeSide::Sell);
                assert_eq!(cmd.amount, 40);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_curve_flag_is_linear() {
        let app = CliApp::try_parse_from(["sasphy-curve", "sample", "--curve", "wobbly"]).unwrap();
        match app.command {
            Command::Sample(cmd) => assert_eq!(cmd.curve.curve_kind, Some(CurveKind::Linear)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_resolve_merges_config() {
        let config = Config::default();
        let args = CurveArgs {
            final_price: Some(9_000),
            curve_kind: Some(CurveKind::Sigmoid),
            ..Default::default()
        };
        let params = args.resolve(&config).unwrap();
        assert_eq!(params.initial_price, 1_000);
        assert_eq!(params.final_price, 9_000);
        assert_eq!(params.max_supply, 1_000);
        assert_eq!(params.curve_kind, CurveKind::Sigmoid);
    }

    #[test]
    fn test_resolve_rejects_zero_max_supply() {
        let args = CurveArgs {
            max_supply: Some(0),
            ..Default::default()
        };
        assert!(args.resolve(&Config::default()).is_err());
    }

    #[test]
    fn test_preview_over_limit_fails() {
        let config = Config::default();
        let app = CliApp::try_parse_from(["sasphy-curve", "preview", "0", "500"]).unwrap();
        let err = execute(app, &config).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));

        let app = CliApp::try_parse_from(["sasphy-curve", "preview", "0", "10"]).unwrap();
        assert!(execute(app, &config).is_ok());
    }

    #[test]
    fn test_commands_run_with_default_config() {
        let config = Config::default();
        for args in [
            vec!["sasphy-curve", "price", "250"],
            vec!["sasphy-curve", "market-cap", "3000", "500"],
            vec!["sasphy-curve", "impact", "500", "100", "--sell"],
            vec!["sasphy-curve", "progress", "250"],
            vec!["sasphy-curve", "sample", "--points", "5", "-f", "json"],
            vec!["sasphy-curve", "stats", "1000"],
        ] {
            let app = CliApp::try_parse_from(&args).unwrap();
            assert!(execute(app, &config).is_ok(), "{:?}", args);
        }
    }
}
