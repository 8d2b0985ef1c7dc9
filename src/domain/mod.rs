//! Domain Layer - Bonding curve pricing
//!
//! Pure, stateless value types and functions with no I/O.
//!
//! - `curve`: the fixed-point bonding curve evaluator
//! - `market`: stats snapshots and trade previews built on the evaluator

pub mod curve;
pub mod market;

pub use curve::{
    current_price, market_cap, price_impact, sample_curve, supply_after_trade, supply_progress,
    CurveError, CurveKind, CurveParameters, CurvePoint, Price, Supply, SCALE,
};
pub use market::{ImpactGuard, MarketError, MarketSnapshot, TradePreview, TradeSide};
