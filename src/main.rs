//! Sasphy Curve - Bonding curve pricing CLI
//!
//! Spot price, market cap, price impact, supply progress and chart samples
//! for Fiesta tokens.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use sasphy_curve::adapters::cli::{self, CliApp};
use sasphy_curve::config::{load_config, Config};

const DEFAULT_CONFIG_PATH: &str = "config/sasphy.toml";

fn main() -> Result<()> {
    // Load .env file if it exists (SASPHY_* overrides can live there)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    // Built once here and passed by reference from now on
    let config = resolve_config(app.config.as_deref())?;
    cli::init_logging(app.verbose, app.debug, &config)?;

    tracing::debug!(
        curve = %config.curve.curve_kind,
        max_supply = config.curve.max_supply,
        "Configuration loaded"
    );

    cli::execute(app, &config)
}

/// Explicit path must load; otherwise use the default file if present, else built-in defaults
fn resolve_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()));
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return load_config(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_PATH));
    }

    let mut config = Config::default();
    config
        .apply_env_overrides()
        .context("Invalid environment override")?;
    config.validate().context("Invalid default configuration")?;
    Ok(config)
}
