use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ValuationError;
use crate::types::{Money, Rate};
use crate::ValuationResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.00000000000000000001);
const MAX_ROOT_ITERATIONS: u32 = 100;

/// Compute the nth root of `x` (x^(1/n)) for positive `x`.
///
/// Seeds with `powd` and refines with Newton's method so repeated calls do not
/// inherit the exp/ln approximation error. Returns `None` for non-positive `x`,
/// `n == 0`, or when an intermediate power leaves the Decimal range.
pub fn nth_root(x: Decimal, n: u32) -> Option<Decimal> {
    if x <= Decimal::ZERO || n == 0 {
        return None;
    }
    if n == 1 || x == Decimal::ONE {
        return Some(x);
    }

    let n_dec = Decimal::from(n);
    let n_minus_1 = n_dec - Decimal::ONE;

    // Fallback guess is 1 + (x - 1) / n, which never sits below the root.
    let mut guess = x
        .checked_powd(Decimal::ONE / n_dec)
        .filter(|g| *g > Decimal::ZERO)
        .unwrap_or_else(|| Decimal::ONE + (x - Decimal::ONE) / n_dec);

    for _ in 0..MAX_ROOT_ITERATIONS {
        let power = checked_pow(guess, n - 1)?;
        if power.is_zero() {
            return None;
        }
        // g_new = ((n-1)*g + x / g^(n-1)) / n
        let next = n_minus_1
            .checked_mul(guess)?
            .checked_add(x.checked_div(power)?)?
            / n_dec;
        let delta = (next - guess).abs();
        guess = next;
        if delta < CONVERGENCE_THRESHOLD {
            break;
        }
    }

    Some(guess)
}

/// Iterative integer power. `None` on overflow.
pub fn checked_pow(base: Decimal, exp: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    for _ in 0..exp {
        result = result.checked_mul(base)?;
    }
    Some(result)
}

/// Grow `value` by `rate` for `periods` years: value * (1 + rate)^periods.
pub fn compound(value: Money, rate: Rate, periods: u32) -> ValuationResult<Money> {
    let factor = growth_factor(rate, periods)
        .ok_or_else(|| ValuationError::overflow(format!("growth factor (1 + {rate})^{periods}")))?;
    value
        .checked_mul(factor)
        .ok_or_else(|| {
            ValuationError::overflow(format!("compounding {value} over {periods} periods"))
        })
}

/// Present value of a single amount received `periods` years out.
pub fn discount(amount: Money, rate: Rate, periods: u32) -> ValuationResult<Money> {
    if rate <= dec!(-1) {
        return Err(ValuationError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    let context = || ValuationError::overflow(format!("discount factor (1 + {rate})^{periods}"));
    let factor = growth_factor(rate, periods).ok_or_else(context)?;
    amount.checked_div(factor).ok_or_else(context)
}

fn growth_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    checked_pow(Decimal::ONE.checked_add(rate)?, periods)
}

/// Compound annual growth rate from `begin` to `end` over `years`.
///
/// `None` when either endpoint is non-positive or `years` is zero: the rate is
/// not defined there and callers render it as not computable.
pub fn cagr(begin: Money, end: Money, years: u32) -> Option<Rate> {
    if begin <= Decimal::ZERO || end <= Decimal::ZERO || years == 0 {
        return None;
    }
    let ratio = end.checked_div(begin)?;
    nth_root(ratio, years).map(|root| root - Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_nth_root_exact_powers() {
        let r = nth_root(dec!(32), 5).unwrap();
        assert!((r - dec!(2)).abs() < dec!(0.0000000001), "got {r}");

        let r = nth_root(dec!(0.00032), 5).unwrap();
        assert!((r - dec!(0.2)).abs() < dec!(0.0000000001), "got {r}");
    }

    #[test]
    fn test_nth_root_rejects_non_positive() {
        assert!(nth_root(Decimal::ZERO, 5).is_none());
        assert!(nth_root(dec!(-8), 3).is_none());
        assert!(nth_root(dec!(8), 0).is_none());
    }

    #[test]
    fn test_compound_matches_repeated_multiplication() {
        let v = compound(dec!(100), dec!(0.10), 3).unwrap();
        assert_eq!(v, dec!(133.1));
    }

    #[test]
    fn test_compound_negative_rate() {
        let v = compound(dec!(100), dec!(-0.5), 2).unwrap();
        assert_eq!(v, dec!(25));
    }

    #[test]
    fn test_discount_basic() {
        let pv = discount(dec!(121), dec!(0.10), 2).unwrap();
        assert_eq!(pv, dec!(100));
    }

    #[test]
    fn test_discount_rejects_total_loss_rate() {
        assert!(discount(dec!(100), dec!(-1), 2).is_err());
    }

    #[test]
    fn test_extreme_rates_are_errors_not_panics() {
        assert!(matches!(
            compound(dec!(1), Decimal::MAX, 1),
            Err(ValuationError::ArithmeticOverflow { .. })
        ));
        assert!(matches!(
            discount(dec!(1), Decimal::MAX, 1),
            Err(ValuationError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_cagr_doubling_over_five_years() {
        // 2^(1/5) - 1 = 0.148698...
        let g = cagr(dec!(100), dec!(200), 5).unwrap();
        assert!((g - dec!(0.1486983550)).abs() < dec!(0.0000001), "got {g}");
    }

    #[test]
    fn test_cagr_undefined_cases() {
        assert!(cagr(Decimal::ZERO, dec!(100), 5).is_none());
        assert!(cagr(dec!(100), dec!(-5), 5).is_none());
        assert!(cagr(dec!(100), Decimal::ZERO, 5).is_none());
        assert!(cagr(dec!(100), dec!(120), 0).is_none());
    }
}
