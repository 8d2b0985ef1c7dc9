//! Sasphy Curve - Bonding curve pricing library
//!
//! Fixed-point bonding curve evaluator behind the Sasphy / Fiesta token
//! storefront: spot price, market cap, price impact, supply progress and
//! chart samples, all bit-reproducible integer arithmetic.
//!
//! # Modules
//!
//! - `domain`: Curve evaluator, market snapshots and trade previews
//! - `config`: Configuration loading and validation
//! - `adapters`: Command-line interface

pub mod domain;
pub mod config;
pub mod adapters;

pub use domain::{
    current_price, market_cap, price_impact, sample_curve, supply_progress, CurveError,
    CurveKind, CurveParameters, CurvePoint, Price, Supply, SCALE,
};
