//! Adapters Layer - Outer surfaces over the domain
//!
//! - `cli`: clap command-line front-end for the chart, stats and trade-preview views

pub mod cli;
