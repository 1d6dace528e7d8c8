// Trade-size optimizer
// ============================================================================
// Finds the input amount that maximizes a caller-supplied profit function over
// [min_step, max_input] in raw base units.
//
// Search: ternary (thirds). Each probe costs two swap quotes or more, so we want
// O(log(max_input / min_step)) probes, not a scan. The profit curve for two-leg
// constant-product arbitrage is single-peaked (spread gain vs. price impact),
// which is what ternary search needs.
//
// The integer curve is stepwise, so the final interval is not guaranteed to
// contain the argmax. Every probe is tracked and the final endpoints are
// evaluated explicitly.
//
// This file is sync and pure; profit_fn may do whatever it likes.

use num_bigint::{BigInt, BigUint};
use num_traits::Signed;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dust threshold: the smallest input the optimizer proposes.
pub const DEFAULT_MIN_STEP: u64 = 1_000;
/// Probe-pair budget.
pub const DEFAULT_MAX_ITERATIONS: u32 = 64;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    pub min_step: BigUint,
    pub max_iterations: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_step: BigUint::from(DEFAULT_MIN_STEP),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SearchConfig {
    /// Upper bound on profit_fn calls for one search.
    pub fn max_evaluations(&self) -> u64 {
        2 * u64::from(self.max_iterations) + 2
    }
}

/// Result of one search. `{0, 0}` means no profitable trade was found.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OptimalTrade {
    pub optimal_input: BigUint,
    pub profit: BigInt,
}

impl OptimalTrade {
    pub fn none() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_profitable(&self) -> bool {
        self.profit.is_positive()
    }
}

// ------------------------------ Public entry ---------------------------------

/// Search `[1000, max_input]` with the 64-iteration baseline budget.
pub fn find_optimal_trade_size<F>(max_input: &BigUint, profit_fn: F) -> OptimalTrade
where
    F: FnMut(&BigUint) -> BigInt,
{
    find_optimal_trade_size_with(&SearchConfig::default(), max_input, profit_fn)
}

pub fn find_optimal_trade_size_with<F>(
    config: &SearchConfig,
    max_input: &BigUint,
    mut profit_fn: F,
) -> OptimalTrade
where
    F: FnMut(&BigUint) -> BigInt,
{
    let min_step = &config.min_step;
    if max_input < min_step {
        log::debug!("search domain empty: max_input={} < min_step={}", max_input, min_step);
        return OptimalTrade::none();
    }

    let stop_width: BigUint = min_step * 3u32;
    let mut lo = min_step.clone();
    let mut hi = max_input.clone();
    let mut best = Best::default();
    let mut iterations = 0u32;

    while iterations < config.max_iterations {
        let width = &hi - &lo;
        if width < stop_width {
            break;
        }
        iterations += 1;

        let third = width / 3u32;
        let m1 = &lo + &third;
        let m2 = &hi - &third;

        let p1 = profit_fn(&m1);
        let p2 = profit_fn(&m2);
        log::trace!("iter {}: f({})={} f({})={}", iterations, m1, p1, m2, p2);

        best.offer(&m1, &p1);
        best.offer(&m2, &p2);

        // Unimodal: the peak cannot be left of m1 if f rises across [m1, m2].
        if p1 < p2 {
            lo = m1;
        } else {
            hi = m2;
        }
    }

    let p_lo = profit_fn(&lo);
    best.offer(&lo, &p_lo);
    if hi != lo {
        let p_hi = profit_fn(&hi);
        best.offer(&hi, &p_hi);
    }

    log::debug!(
        "ternary search finished after {} iterations, interval [{}, {}]",
        iterations, lo, hi
    );

    match best.into_inner() {
        Some(trade) if trade.is_profitable() => trade,
        _ => OptimalTrade::none(),
    }
}

// ------------------------------- Best-seen -----------------------------------

#[derive(Default)]
struct Best(Option<OptimalTrade>);

impl Best {
    fn offer(&mut self, input: &BigUint, profit: &BigInt) {
        let improves = match &self.0 {
            Some(cur) => *profit > cur.profit,
            None => true,
        };
        if improves {
            self.0 = Some(OptimalTrade { optimal_input: input.clone(), profit: profit.clone() });
        }
    }

    fn into_inner(self) -> Option<OptimalTrade> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn concave(peak: i128, height: i128) -> impl Fn(&BigUint) -> BigInt {
        move |x: &BigUint| {
            let d = BigInt::from(x.clone()) - BigInt::from(peak);
            BigInt::from(height) - &d * &d
        }
    }

    #[test]
    fn finds_interior_peak() {
        let res = find_optimal_trade_size(&BigUint::from(10_000_000u64), concave(3_333_333, 10i128.pow(14)));
        let x = res.optimal_input.clone();
        let dist = (BigInt::from(x) - BigInt::from(3_333_333)).abs();
        assert!(dist <= BigInt::from(9_000), "too far from peak: {}", res.optimal_input);
        assert_eq!(res.profit, concave(3_333_333, 10i128.pow(14))(&res.optimal_input));
    }

    #[test]
    fn peak_at_upper_bound() {
        // strictly increasing profit: best is max_input itself
        let res = find_optimal_trade_size(&BigUint::from(1_000_000u64), |x: &BigUint| BigInt::from(x.clone()));
        assert_eq!(res.optimal_input, BigUint::from(1_000_000u64));
        assert_eq!(res.profit, BigInt::from(1_000_000u64));
    }

    #[test]
    fn peak_at_lower_bound() {
        let res = find_optimal_trade_size(&BigUint::from(1_000_000u64), |x: &BigUint| {
            BigInt::from(2_000_000) - BigInt::from(x.clone())
        });
        assert_eq!(res.optimal_input, BigUint::from(DEFAULT_MIN_STEP));
        assert_eq!(res.profit, BigInt::from(1_999_000));
    }

    #[test]
    fn never_profitable_returns_zero() {
        let res = find_optimal_trade_size(&BigUint::from(10u64.pow(12)), |_: &BigUint| BigInt::from(-5));
        assert_eq!(res, OptimalTrade::none());
        assert!(!res.is_profitable());

        let flat = find_optimal_trade_size(&BigUint::from(10u64.pow(12)), |_: &BigUint| BigInt::zero());
        assert_eq!(flat, OptimalTrade::none());
    }

    #[test]
    fn empty_domain_skips_evaluation() {
        let mut calls = 0;
        let res = find_optimal_trade_size(&BigUint::from(999u32), |_: &BigUint| {
            calls += 1;
            BigInt::from(1)
        });
        assert_eq!(res, OptimalTrade::none());
        assert_eq!(calls, 0);
    }

    #[test]
    fn tiny_domain_checks_endpoints() {
        // width below 3*min_step: no iterations, only endpoints
        let mut seen = Vec::new();
        let res = find_optimal_trade_size(&BigUint::from(2_500u32), |x: &BigUint| {
            seen.push(x.clone());
            BigInt::from(x.clone())
        });
        assert_eq!(seen, vec![BigUint::from(1_000u32), BigUint::from(2_500u32)]);
        assert_eq!(res.optimal_input, BigUint::from(2_500u32));
    }

    #[test]
    fn evaluation_budget_is_bounded() {
        let config = SearchConfig::default();
        let mut calls = 0u64;
        // huge domain so the width never drops below the stop threshold
        let max = BigUint::from(1u32) << 200usize;
        let _ = find_optimal_trade_size_with(&config, &max, |x: &BigUint| {
            calls += 1;
            BigInt::from(x.clone())
        });
        assert_eq!(calls, config.max_evaluations());
    }

    #[test]
    fn flat_plateau_shrinks_from_the_right() {
        // equal probes discard [m2, hi], so lo never moves and max_input is never tried
        let mut seen = Vec::new();
        let res = find_optimal_trade_size(&BigUint::from(1_000_000u32), |x: &BigUint| {
            seen.push(x.clone());
            BigInt::from(5)
        });

        assert_eq!(&seen[..2], &[BigUint::from(334_000u32), BigUint::from(667_000u32)]);
        assert!(seen.iter().all(|x| *x <= BigUint::from(667_000u32)));
        // closing endpoint checks: lo never moved off min_step
        assert_eq!(seen[seen.len() - 2], BigUint::from(1_000u32));
        // first probe wins, later equal profits do not replace it
        assert_eq!(res.optimal_input, BigUint::from(334_000u32));
        assert_eq!(res.profit, BigInt::from(5));
    }

    #[test]
    fn custom_min_step() {
        let config = SearchConfig { min_step: BigUint::from(10u32), max_iterations: 200 };
        let res = find_optimal_trade_size_with(&config, &BigUint::from(100_000u32), concave(777, 1_000_000));
        let dist = (BigInt::from(res.optimal_input.clone()) - BigInt::from(777)).abs();
        assert!(dist <= BigInt::from(30));
    }
}
