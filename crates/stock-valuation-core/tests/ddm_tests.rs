use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stock_valuation_core::valuation::ddm::{calculate_ddm, DdmInput};
use stock_valuation_core::ValuationError;

// ===========================================================================
// Dividend discount model tests
// ===========================================================================

fn utility_input() -> DdmInput {
    // Mature utility: $3.20 dividend, 8% cost of equity, 2.5% perpetual growth
    DdmInput {
        current_dividend: dec!(3.20),
        required_return: dec!(0.08),
        high_growth_rate: dec!(0.025),
        high_growth_years: 0,
        terminal_growth_rate: dec!(0.025),
        stock_price: Some(dec!(55)),
    }
}

#[test]
fn test_gordon_utility_known_answer() {
    let out = calculate_ddm(&utility_input()).unwrap();
    // 3.20 * 1.025 / 0.055 = 59.6364
    let v = out.result.intrinsic_value;
    assert!((v - dec!(59.6364)).abs() < dec!(0.0001), "got {v}");
    // MOS = 1 - 55 / 59.6364 = 7.77%
    let mos = out.result.margin_of_safety.unwrap();
    assert!((mos - dec!(0.0777)).abs() < dec!(0.0001), "got {mos}");
}

#[test]
fn test_equal_stage_growth_matches_gordon() {
    // When high-growth equals terminal growth, the two-stage value collapses
    // to the single-stage Gordon value.
    let gordon = calculate_ddm(&utility_input()).unwrap();
    let mut input = utility_input();
    input.high_growth_years = 7;
    let two_stage = calculate_ddm(&input).unwrap();
    let diff = (gordon.result.intrinsic_value - two_stage.result.intrinsic_value).abs();
    assert!(diff < dec!(0.000001), "diff {diff}");
}

#[test]
fn test_higher_growth_raises_value() {
    let mut slow = utility_input();
    slow.high_growth_years = 5;
    let mut fast = slow.clone();
    fast.high_growth_rate = dec!(0.10);
    let slow_v = calculate_ddm(&slow).unwrap().result.intrinsic_value;
    let fast_v = calculate_ddm(&fast).unwrap().result.intrinsic_value;
    assert!(fast_v > slow_v);
}

#[test]
fn test_zero_required_return_rejected() {
    let mut input = utility_input();
    input.required_return = Decimal::ZERO;
    input.terminal_growth_rate = dec!(-0.01);
    assert!(matches!(
        calculate_ddm(&input),
        Err(ValuationError::InvalidInput { .. })
    ));
}

#[test]
fn test_excessive_stage_length_rejected() {
    let mut input = utility_input();
    input.high_growth_years = 500;
    assert!(calculate_ddm(&input).is_err());
}
