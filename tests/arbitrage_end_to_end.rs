// tests/arbitrage_end_to_end.rs
// =============================
// Cross-venue sizing from raw U256 reserve snapshots through to formatted output.

use cpamm_arb::config::EngineConfig;
use cpamm_arb::engine::arbitrage::{ArbDirection, CrossVenueArbitrage, VenuePool};
use cpamm_arb::math::units::{format_amount, parse_amount};
use cpamm_arb::FeeRate;
use ethers::types::U256;
use num_bigint::BigInt;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn u256(dec: &str) -> U256 {
    U256::from_dec_str(dec).expect("valid decimal")
}

/// WETH(18)/USDC(6) venues: A at 2000 USDC/ETH, B holding `usdc_b` raw USDC against 1000 WETH.
fn market(usdc_b: &str) -> CrossVenueArbitrage {
    let a = VenuePool::from_u256(u256("1000000000000000000000"), u256("2000000000000"), FeeRate::UNISWAP_V2);
    let b = VenuePool::from_u256(u256("1000000000000000000000"), u256(usdc_b), FeeRate::UNISWAP_V2);
    CrossVenueArbitrage::new(a, b)
}

#[test]
fn finds_and_formats_profitable_trade() {
    init_logger();
    let config = EngineConfig::from_lookup(|_| None).unwrap();
    let m = market("2100000000000").with_max_reserve_fraction_bps(config.max_reserve_fraction_bps);

    let res = m.optimize(&config.search_config()).expect("5% spread is profitable");
    assert_eq!(res.direction, ArbDirection::BuyOnASellOnB);

    let whole: u64 = format_amount(&res.optimal_input, 6, 0).parse().unwrap();
    assert!((21_600..=21_850).contains(&whole), "got {whole}");
    assert!(res.profit > BigInt::from(parse_amount("469.5", 6).unwrap()));

    // legs reported at the optimum are consistent with the profit
    let net = BigInt::from(res.quote_returned.clone()) - BigInt::from(res.optimal_input.clone());
    assert_eq!(net, res.profit);
    assert!(format_amount(&res.base_acquired, 18, 4).starts_with("10."));
}

#[test]
fn mirrored_market_picks_other_direction() {
    init_logger();
    // B now cheaper than A
    let m = market("1900000000000");
    let res = m.optimize(&Default::default()).unwrap();
    assert_eq!(res.direction, ArbDirection::BuyOnBSellOnA);
}

#[test]
fn equal_prices_have_no_trade() {
    init_logger();
    let m = market("2000000000000");
    assert!(m.optimize(&Default::default()).is_none());
}

#[test]
fn fee_tier_from_config_shrinks_profit() {
    init_logger();
    let low = market("2100000000000").optimize(&Default::default()).unwrap();

    let config = EngineConfig::from_lookup(|key| match key {
        "AMM_FEE_NUMERATOR" => Some("990".to_string()),
        _ => None,
    })
    .unwrap();
    let fee = config.fee_rate().unwrap();
    let mut m = market("2100000000000");
    m.venue_a.fee = fee;
    m.venue_b.fee = fee;
    let high = m.optimize(&config.search_config()).unwrap();

    assert!(high.profit < low.profit);
    assert!(high.optimal_input < low.optimal_input);
}

#[cfg(feature = "serde")]
#[test]
fn result_serializes() {
    let res = market("2100000000000").optimize(&Default::default()).unwrap();
    let json = serde_json::to_string(&res).unwrap();
    assert!(json.contains("BuyOnASellOnB"));
    let back: cpamm_arb::engine::arbitrage::ArbitrageResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, res);
}
