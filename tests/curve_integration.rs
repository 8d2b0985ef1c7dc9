//! Bonding Curve Integration Tests
//!
//! Verify the evaluator, market snapshot, trade preview and config loader work
//! together the way the storefront consumes them:
//! 1. Config file -> CurveParameters -> spot price / chart samples
//! 2. Trade preview -> ImpactGuard gating
//! 3. Exact fixed-point regression values for every curve kind
//!
//! All tests are deterministic and use exact integer equality.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

use sasphy_curve::config::load_config;
use sasphy_curve::domain::market::{ImpactGuard, MarketError, MarketSnapshot, TradePreview, TradeSide};
use sasphy_curve::{
    current_price, market_cap, price_impact, sample_curve, supply_progress, CurveError,
    CurveKind, CurveParameters,
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Reference curve used by the storefront: 1000 -> 5000 over 1000 units
fn reference_curve(kind: CurveKind) -> CurveParameters {
    CurveParameters::new(1000, 5000, 1000, kind).unwrap()
}

/// A token-sized curve: 9 decimals, 1B supply
fn token_curve(kind: CurveKind) -> CurveParameters {
    CurveParameters::new(
        28_000,
        4_100_000_000,
        1_000_000_000_000_000_000,
        kind,
    )
    .unwrap()
}

fn write_config(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

// ============================================================================
// Regression values
// ============================================================================

#[test]
fn test_reference_values_per_kind() {
    // (kind, supply 250, supply 500, supply 750)
    let expected = [
        (CurveKind::Linear, 2000, 3000, 4000),
        (CurveKind::Exponential, 1250, 2000, 3250),
        (CurveKind::Logarithmic, 2750, 4000, 4750),
        (CurveKind::Sigmoid, 1624, 3000, 4374),
    ];

    for (kind, q1, mid, q3) in expected {
        let params = reference_curve(kind);
        assert_eq!(current_price(&params, 250).unwrap(), q1, "{kind} @250");
        assert_eq!(current_price(&params, 500).unwrap(), mid, "{kind} @500");
        assert_eq!(current_price(&params, 750).unwrap(), q3, "{kind} @750");
    }
}

#[test]
fn test_token_sized_curve_boundaries() {
    for kind in CurveKind::ALL {
        let params = token_curve(kind);
        assert_eq!(current_price(&params, 0).unwrap(), 28_000);
        assert_eq!(current_price(&params, params.max_supply).unwrap(), 4_100_000_000);
        let mid = current_price(&params, params.max_supply / 2).unwrap();
        assert!(mid > 28_000 && mid < 4_100_000_000, "{kind}: {mid}");
    }
}

#[test]
fn test_progress_resolution_is_basis_points() {
    // Supplies inside the same basis point price identically
    let params = token_curve(CurveKind::Linear);
    let bp = params.max_supply / 10_000;
    assert_eq!(
        current_price(&params, bp).unwrap(),
        current_price(&params, 2 * bp - 1).unwrap()
    );
    assert!(current_price(&params, 2 * bp).unwrap() > current_price(&params, bp).unwrap());
}

// ============================================================================
// Chart samples
// ============================================================================

#[test]
fn test_sample_curve_matches_spot_prices() {
    for kind in CurveKind::ALL {
        let params = reference_curve(kind);
        let points = sample_curve(&params, 10).unwrap();

        assert_eq!(points.len(), 10);
        assert_eq!(points.first().unwrap().supply, 0);
        assert_eq!(points.last().unwrap().supply, params.max_supply);
        for point in &points {
            assert_eq!(point.price, current_price(&params, point.supply).unwrap());
        }
        assert!(points.windows(2).all(|w| w[0].price <= w[1].price), "{kind}");
    }
}

// ============================================================================
// Stats and trade previews
// ============================================================================

#[test]
fn test_snapshot_consistent_with_evaluator() {
    let params = reference_curve(CurveKind::Exponential);
    let snapshot = MarketSnapshot::capture(&params, 750).unwrap();

    assert_eq!(snapshot.price, 3250);
    assert_eq!(snapshot.market_cap, market_cap(3250, 750).unwrap());
    assert_eq!(snapshot.progress_pct, supply_progress(750, 1000));
    assert_eq!(snapshot.progress_pct, dec!(75));
}

#[test]
fn test_buy_then_sell_round_trip_impact() {
    let params = reference_curve(CurveKind::Linear);

    let buy = TradePreview::compute(&params, 250, 250, TradeSide::Buy).unwrap();
    assert_eq!((buy.price_before, buy.price_after), (2000, 3000));
    assert_eq!(buy.price_impact_pct, dec!(50));

    let sell = TradePreview::compute(&params, buy.supply_after, 250, TradeSide::Sell).unwrap();
    assert_eq!(sell.supply_after, 250);
    assert_eq!(sell.price_after, buy.price_before);
    assert_eq!(sell.price_impact_pct.round_dp(4), dec!(33.3333));
}

#[test]
fn test_zero_trade_has_no_impact() {
    for kind in CurveKind::ALL {
        let params = reference_curve(kind);
        for supply in [0, 1, 499, 1000, 5000] {
            assert_eq!(price_impact(&params, supply, 0, true).unwrap(), Decimal::ZERO);
            assert_eq!(price_impact(&params, supply, 0, false).unwrap(), Decimal::ZERO);
        }
    }
}

#[test]
fn test_guard_blocks_large_trades() {
    let params = reference_curve(CurveKind::Sigmoid);
    let guard = ImpactGuard::new(dec!(5));

    // flat start of the S-curve: the price does not move yet
    let tiny = TradePreview::compute(&params, 0, 10, TradeSide::Buy).unwrap();
    assert!(guard.check(&tiny).is_ok());

    // steep middle: 1864 -> 4136
    let big = TradePreview::compute(&params, 300, 400, TradeSide::Buy).unwrap();
    assert!(matches!(
        guard.check(&big),
        Err(MarketError::PriceImpactTooHigh { .. })
    ));
}

// ============================================================================
// Config -> evaluator
// ============================================================================

#[test]
fn test_config_drives_evaluator() {
    let file = write_config(
        r#"
[curve]
initial_price = 1000
final_price = 5000
max_supply = 1000
curve_kind = "logarithmic"

[trading]
max_price_impact_pct = "25.5"
sample_points = 11
"#,
    );
    let config = load_config(file.path()).unwrap();
    let params = CurveParameters::from(&config.curve);

    assert_eq!(current_price(&params, 500).unwrap(), 4000);

    let points = sample_curve(&params, config.trading.sample_points).unwrap();
    assert_eq!(points.len(), 11);
    assert_eq!(points[5].supply, 500);

    let guard = ImpactGuard::from(&config.trading);
    assert_eq!(guard.max_price_impact_pct, dec!(25.5));
}

#[test]
fn test_zero_max_supply_policy() {
    let raw = CurveParameters {
        initial_price: 10,
        final_price: 20,
        max_supply: 0,
        curve_kind: CurveKind::Linear,
    };

    assert_eq!(current_price(&raw, 0), Err(CurveError::ZeroMaxSupply));
    assert_eq!(sample_curve(&raw, 3), Err(CurveError::ZeroMaxSupply));
    assert!(matches!(
        MarketSnapshot::capture(&raw, 0),
        Err(MarketError::Curve(CurveError::ZeroMaxSupply))
    ));
    // progress defines the degenerate case instead of failing
    assert_eq!(supply_progress(7, 0), Decimal::ZERO);
}
