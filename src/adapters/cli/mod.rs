//! CLI Adapter
//!
//! Command-line interface for the Sasphy curve evaluator.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    execute, init_logging, CliApp, Command, CurveArgs, MarketCapCmd, OutputFormat, SampleCmd,
    SupplyCmd, TradeCmd,
};
