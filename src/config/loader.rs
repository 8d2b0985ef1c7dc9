//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching sasphy.toml structure.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::domain::curve::{CurveKind, CurveParameters, Price, Supply};
use crate::domain::market::{ImpactGuard, DEFAULT_MAX_PRICE_IMPACT_PCT};

/// Main configuration structure matching sasphy.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub curve: CurveSection,
    #[serde(default)]
    pub trading: TradingSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Bonding curve section
#[derive(Debug, Clone, Deserialize)]
pub struct CurveSection {
    /// Price at zero supply (fixed-point, caller's price unit)
    #[serde(deserialize_with = "deserialize_price")]
    pub initial_price: Price,
    /// Price once max_supply is reached
    #[serde(deserialize_with = "deserialize_price")]
    pub final_price: Price,
    /// Supply at which the curve completes
    pub max_supply: Supply,
    /// "linear", "exponential", "logarithmic" or "sigmoid"; anything else is linear
    #[serde(default)]
    pub curve_kind: CurveKind,
}

impl Default for CurveSection {
    fn default() -> Self {
        Self {
            initial_price: 1_000,
            final_price: 5_000,
            max_supply: 1_000,
            curve_kind: CurveKind::Linear,
        }
    }
}

/// Trade preview and charting section
#[derive(Debug, Clone, Deserialize)]
pub struct TradingSection {
    /// Maximum price impact (percent) a previewed trade may have
    #[serde(default = "default_max_price_impact_pct")]
    pub max_price_impact_pct: Decimal,
    /// Number of points the `sample` command produces by default
    #[serde(default = "default_sample_points")]
    pub sample_points: usize,
}

impl Default for TradingSection {
    fn default() -> Self {
        Self {
            max_price_impact_pct: default_max_price_impact_pct(),
            sample_points: default_sample_points(),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_max_price_impact_pct() -> Decimal {
    DEFAULT_MAX_PRICE_IMPACT_PCT
}
fn default_sample_points() -> usize {
    50
}
fn default_log_level() -> String {
    "warn".to_string()
}

/// TOML integers stop at i64, so prices above that are written as strings
/// (`final_price = "100000000000000000000000000000"`)
fn deserialize_price<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    struct PriceVisitor;

    impl<'de> Visitor<'de> for PriceVisitor {
        type Value = Price;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer price or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
            Ok(Price::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
            u64::try_from(v)
                .map(Price::from)
                .map_err(|_| E::custom(format!("price must not be negative, got {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid price '{}'", v)))
        }
    }

    deserializer.deserialize_any(PriceVisitor)
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file, apply environment overrides, validate
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).into_owned();
    tracing::debug!("Loading config from {}", expanded);

    let content = std::fs::read_to_string(&expanded)?;
    let mut config: Config = toml::from_str(&content)?;
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Override file values with SASPHY_* environment variables
    ///
    /// - `SASPHY_LOG_LEVEL`
    /// - `SASPHY_MAX_PRICE_IMPACT_PCT`
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(level) = std::env::var("SASPHY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(raw) = std::env::var("SASPHY_MAX_PRICE_IMPACT_PCT") {
            self.trading.max_price_impact_pct = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "SASPHY_MAX_PRICE_IMPACT_PCT is not a number: {}",
                    raw
                ))
            })?;
        }
        Ok(())
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.curve.max_supply == 0 {
            return Err(ConfigError::ValidationError(
                "curve.max_supply must be > 0".to_string(),
            ));
        }

        let max_impact = self.trading.max_price_impact_pct;
        if max_impact <= Decimal::ZERO || max_impact > dec!(1000) {
            return Err(ConfigError::ValidationError(format!(
                "max_price_impact_pct must be in (0, 1000], got {}",
                max_impact
            )));
        }

        if self.trading.sample_points == 0 {
            return Err(ConfigError::ValidationError(
                "sample_points must be > 0".to_string(),
            ));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.logging.level
            )));
        }

        if self.curve.final_price < self.curve.initial_price {
            tracing::info!(
                "Curve is decreasing: final_price {} < initial_price {}",
                self.curve.final_price,
                self.curve.initial_price
            );
        }

        Ok(())
    }
}

impl From<&CurveSection> for CurveParameters {
    fn from(section: &CurveSection) -> Self {
        CurveParameters {
            initial_price: section.initial_price,
            final_price: section.final_price,
            max_supply: section.max_supply,
            curve_kind: section.curve_kind,
        }
    }
}

impl From<&TradingSection> for ImpactGuard {
    fn from(section: &TradingSection) -> Self {
        ImpactGuard::new(section.max_price_impact_pct)
    }
}
