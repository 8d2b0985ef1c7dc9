//! Market Snapshot and Trade Preview
//!
//! Bundles evaluator calls the way the storefront consumes them: a live
//! stats snapshot for a token, and a pre-submit trade preview gated by a
//! maximum price impact.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::curve::{
    current_price, market_cap, price_impact, supply_after_trade, supply_progress, CurveError,
    CurveKind, CurveParameters, Price, Supply,
};

/// Default maximum price impact percentage for trade previews
pub const DEFAULT_MAX_PRICE_IMPACT_PCT: Decimal = dec!(10);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error("Price impact {impact:.2}% exceeds maximum {max:.2}%")]
    PriceImpactTooHigh { impact: Decimal, max: Decimal },
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn is_buy(&self) -> bool {
        matches!(self, TradeSide::Buy)
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Live stats for a token at a given supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub curve_kind: CurveKind,
    pub supply: Supply,
    pub max_supply: Supply,
    /// Spot price at `supply`
    pub price: Price,
    /// Spot price times circulating supply
    pub market_cap: Price,
    /// Percentage of max supply issued
    pub progress_pct: Decimal,
}

impl MarketSnapshot {
    pub fn capture(params: &CurveParameters, supply: Supply) -> Result<Self, MarketError> {
        let price = current_price(params, supply)?;
        Ok(Self {
            curve_kind: params.curve_kind,
            supply,
            max_supply: params.max_supply,
            price,
            market_cap: market_cap(price, supply)?,
            progress_pct: supply_progress(supply, params.max_supply),
        })
    }

    /// Has the whole curve been sold
    pub fn is_complete(&self) -> bool {
        self.supply >= self.max_supply
    }
}

/// Effect of a trade on the curve, computed before submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePreview {
    pub side: TradeSide,
    pub amount: Supply,
    pub supply_before: Supply,
    pub supply_after: Supply,
    pub price_before: Price,
    pub price_after: Price,
    pub price_impact_pct: Decimal,
}

impl TradePreview {
    pub fn compute(
        params: &CurveParameters,
        supply: Supply,
        amount: Supply,
        side: TradeSide,
    ) -> Result<Self, MarketError> {
        let supply_after = supply_after_trade(supply, amount, side.is_buy());
        let preview = Self {
            side,
            amount,
            supply_before: supply,
            supply_after,
            price_before: current_price(params, supply)?,
            price_after: current_price(params, supply_after)?,
            price_impact_pct: price_impact(params, supply, amount, side.is_buy())?,
        };
        tracing::debug!(
            side = %side,
            amount,
            supply_before = supply,
            supply_after,
            impact = %preview.price_impact_pct,
            "Trade preview computed"
        );
        Ok(preview)
    }

    /// Units actually moved; a sell larger than the supply only moves the supply
    pub fn filled_amount(&self) -> Supply {
        self.supply_before.abs_diff(self.supply_after)
    }
}

/// Rejects previews whose price impact is above a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactGuard {
    pub max_price_impact_pct: Decimal,
}

impl Default for ImpactGuard {
    fn default() -> Self {
        Self {
            max_price_impact_pct: DEFAULT_MAX_PRICE_IMPACT_PCT,
        }
    }
}

impl ImpactGuard {
    pub fn new(max_price_impact_pct: Decimal) -> Self {
        Self { max_price_impact_pct }
    }

    pub fn check(&self, preview: &TradePreview) -> Result<(), MarketError> {
        if preview.price_impact_pct > self.max_price_impact_pct {
            tracing::warn!(
                impact = %preview.price_impact_pct,
                max = %self.max_price_impact_pct,
                "Trade rejected: price impact too high"
            );
            return Err(MarketError::PriceImpactTooHigh {
                impact: preview.price_impact_pct,
                max: self.max_price_impact_pct,
            });
        }
        Ok(())
    }
}
