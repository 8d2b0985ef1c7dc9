//! Bonding Curve Evaluator
//!
//! Maps circulating supply to price over a fixed-point scale (basis points).
//! Every curve shape is a polynomial in the normalized progress `t`, so the
//! whole evaluator runs on checked integer arithmetic and returns the same
//! value on every platform, matching the on-chain program bit for bit.
//!
//! Prices and values are `u128` fixed-point integers in the caller's price
//! unit. Percentages are exact `Decimal`s.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point scale for the normalized progress value (basis points)
pub const SCALE: u128 = 10_000;

/// Token supply in base units
pub type Supply = u64;

/// Fixed-point price or value in the caller's price unit
pub type Price = u128;

/// Bonding curve evaluation errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CurveError {
    #[error("max_supply must be > 0")]
    ZeroMaxSupply,

    #[error("Price impact undefined: price before trade is zero")]
    ZeroPriceDivision,

    #[error("Arithmetic overflow in curve evaluation")]
    Overflow,
}

/// Curve shape between `initial_price` and `final_price`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CurveKind {
    #[default]
    Linear,
    /// Quadratic ease-in
    Exponential,
    /// Quadratic Bezier ease-out
    Logarithmic,
    /// Smoothstep S-curve
    Sigmoid,
}

impl CurveKind {
    pub const ALL: [CurveKind; 4] = [
        CurveKind::Linear,
        CurveKind::Exponential,
        CurveKind::Logarithmic,
        CurveKind::Sigmoid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurveKind::Linear => "linear",
            CurveKind::Exponential => "exponential",
            CurveKind::Logarithmic => "logarithmic",
            CurveKind::Sigmoid => "sigmoid",
        }
    }

    /// Lenient parse: unknown names fall back to `Linear`
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => CurveKind::Linear,
            "exponential" => CurveKind::Exponential,
            "logarithmic" => CurveKind::Logarithmic,
            "sigmoid" => CurveKind::Sigmoid,
            other => {
                tracing::warn!("Unknown curve kind '{}', falling back to linear", other);
                CurveKind::Linear
            }
        }
    }

    /// Interpolation fraction for progress `t` (both in SCALE units).
    ///
    /// `t` must be in `0..=SCALE`; the result is then also in `0..=SCALE`.
    fn fraction(&self, t: u128) -> Result<u128, CurveError> {
        let t2 = t.checked_mul(t).ok_or(CurveError::Overflow)?;
        let f = match self {
            CurveKind::Linear => t,
            CurveKind::Exponential => t2 / SCALE,
            CurveKind::Logarithmic => {
                // 2t - t^2 in normalized units
                let two_t = t
                    .checked_mul(2 * SCALE)
                    .ok_or(CurveError::Overflow)?;
                two_t.checked_sub(t2).ok_or(CurveError::Overflow)? / SCALE
            }
            CurveKind::Sigmoid => {
                // 3t^2 - 2t^3 in normalized units
                let three_t2 = t2
                    .checked_mul(3 * SCALE)
                    .ok_or(CurveError::Overflow)?;
                let two_t3 = t2
                    .checked_mul(2 * t)
                    .ok_or(CurveError::Overflow)?;
                three_t2.checked_sub(two_t3).ok_or(CurveError::Overflow)? / (SCALE * SCALE)
            }
        };
        Ok(f)
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CurveKind::parse_lenient(s))
    }
}

impl From<String> for CurveKind {
    fn from(s: String) -> Self {
        CurveKind::parse_lenient(&s)
    }
}

/// Bonding curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveParameters {
    /// Price at supply 0
    pub initial_price: Price,
    /// Price at (and beyond) max_supply
    pub final_price: Price,
    /// Supply at which the curve reaches final_price
    pub max_supply: Supply,
    /// Shape of the curve
    #[serde(default)]
    pub curve_kind: CurveKind,
}

impl CurveParameters {
    pub fn new(
        initial_price: Price,
        final_price: Price,
        max_supply: Supply,
        curve_kind: CurveKind,
    ) -> Result<Self, CurveError> {
        let params = Self {
            initial_price,
            final_price,
            max_supply,
            curve_kind,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        if self.max_supply == 0 {
            return Err(CurveError::ZeroMaxSupply);
        }
        Ok(())
    }

    /// Signed distance from initial to final price
    pub fn price_delta(&self) -> Result<i128, CurveError> {
        let initial = i128::try_from(self.initial_price).map_err(|_| CurveError::Overflow)?;
        let last = i128::try_from(self.final_price).map_err(|_| CurveError::Overflow)?;
        last.checked_sub(initial).ok_or(CurveError::Overflow)
    }

    /// Is the curve non-decreasing from initial to final price
    pub fn is_ascending(&self) -> bool {
        self.final_price >= self.initial_price
    }
}

/// One (supply, price) sample for charting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub supply: Supply,
    pub price: Price,
}

/// Normalized progress `t = supply * SCALE / max_supply` for `supply < max_supply`
fn progress(supply: Supply, max_supply: Supply) -> u128 {
    // u64 * 10_000 always fits in u128
    (supply as u128) * SCALE / (max_supply as u128)
}

/// Spot price at `supply`.
///
/// Clamps to `final_price` once `supply >= max_supply`.
pub fn current_price(params: &CurveParameters, supply: Supply) -> Result<Price, CurveError> {
    params.validate()?;

    if supply >= params.max_supply {
        return Ok(params.final_price);
    }

    let t = progress(supply, params.max_supply);
    let f = params.curve_kind.fraction(t)?;
    let delta = params.price_delta()?;

    // f <= SCALE, so the product is bounded by |delta| * SCALE
    let step = (f as i128)
        .checked_mul(delta)
        .ok_or(CurveError::Overflow)?
        / (SCALE as i128);

    let initial = i128::try_from(params.initial_price).map_err(|_| CurveError::Overflow)?;
    let price = initial.checked_add(step).ok_or(CurveError::Overflow)?;

    tracing::trace!(
        supply,
        t = t as u64,
        f = f as u64,
        price = %price,
        kind = %params.curve_kind,
        "Evaluated curve price"
    );

    Price::try_from(price).map_err(|_| CurveError::Overflow)
}

/// Market cap: `price * total_supply / SCALE`
pub fn market_cap(price: Price, total_supply: Supply) -> Result<Price, CurveError> {
    price
        .checked_mul(total_supply as u128)
        .map(|v| v / SCALE)
        .ok_or(CurveError::Overflow)
}

/// Absolute price impact of a trade, in percent.
///
/// Sells floor the resulting supply at zero. A trade that leaves the price
/// unchanged has zero impact even when the starting price is zero.
pub fn price_impact(
    params: &CurveParameters,
    current_supply: Supply,
    trade_amount: Supply,
    is_buy: bool,
) -> Result<Decimal, CurveError> {
    let new_supply = supply_after_trade(current_supply, trade_amount, is_buy);

    let price_before = current_price(params, current_supply)?;
    let price_after = current_price(params, new_supply)?;

    if price_after == price_before {
        return Ok(Decimal::ZERO);
    }
    if price_before == 0 {
        return Err(CurveError::ZeroPriceDivision);
    }

    let diff = price_after.abs_diff(price_before);
    let impact = percent_of(diff, price_before)?;

    tracing::debug!(
        current_supply,
        new_supply,
        price_before = %price_before,
        price_after = %price_after,
        %impact,
        is_buy,
        "Computed price impact"
    );

    Ok(impact)
}

/// Supply after applying a trade. Sells never go below zero.
pub fn supply_after_trade(current_supply: Supply, trade_amount: Supply, is_buy: bool) -> Supply {
    if is_buy {
        current_supply.saturating_add(trade_amount)
    } else {
        current_supply.saturating_sub(trade_amount)
    }
}

/// Percentage of max supply issued. Zero when `max_supply == 0`; not capped at 100.
pub fn supply_progress(supply: Supply, max_supply: Supply) -> Decimal {
    if max_supply == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(supply) * Decimal::ONE_HUNDRED / Decimal::from(max_supply)
}

/// `num_points` evenly spaced samples from supply 0 to `max_supply` inclusive
pub fn sample_curve(
    params: &CurveParameters,
    num_points: usize,
) -> Result<Vec<CurvePoint>, CurveError> {
    params.validate()?;

    match num_points {
        0 => return Ok(Vec::new()),
        1 => {
            return Ok(vec![CurvePoint {
                supply: 0,
                price: current_price(params, 0)?,
            }])
        }
        _ => {}
    }

    let last = (num_points - 1) as u128;
    let max_supply = params.max_supply as u128;

    (0..num_points)
        .map(|i| {
            // i <= last, so the quotient never exceeds max_supply
            let supply = (max_supply * i as u128 / last) as Supply;
            Ok(CurvePoint {
                supply,
                price: current_price(params, supply)?,
            })
        })
        .collect()
}

/// Largest integer a `Decimal` mantissa holds (2^96 - 1)
const DECIMAL_MAX_MANTISSA: u128 = (1 << 96) - 1;

/// `part * 100 / whole` as a Decimal, for `whole > 0`.
///
/// The whole-number ratio is taken in `u128` first. Only the remainder goes
/// through Decimal, with both sides shortened by the same power of ten until
/// `rem * 100` fits the mantissa.
fn percent_of(part: u128, whole: u128) -> Result<Decimal, CurveError> {
    let quotient = part / whole;
    let mut rem = part % whole;
    let mut whole = whole;

    let integral = to_decimal(quotient.checked_mul(100).ok_or(CurveError::Overflow)?)?;
    if rem == 0 {
        return Ok(integral);
    }

    while whole > DECIMAL_MAX_MANTISSA / 100 {
        rem /= 10;
        whole /= 10;
    }

    let fraction = to_decimal(rem * 100)?
        .checked_div(to_decimal(whole)?)
        .ok_or(CurveError::Overflow)?;
    integral.checked_add(fraction).ok_or(CurveError::Overflow)
}

fn to_decimal(value: u128) -> Result<Decimal, CurveError> {
    let signed = i128::try_from(value).map_err(|_| CurveError::Overflow)?;
    Decimal::try_from_i128_with_scale(signed, 0).map_err(|_| CurveError::Overflow)
}
