//! Configuration Module
//!
//! Loads and validates configuration from TOML files. The resulting `Config`
//! is built once at startup and passed by reference to whatever needs it.

pub mod loader;

pub use loader::{
    Config, ConfigError, CurveSection, LoggingSection, TradingSection, load_config,
};
