// Cross-venue two-leg arbitrage sizing
// ============================================================================
// Two constant-product pools quote the same base/quote pair. Start with quote
// tokens, buy base on the cheap venue, sell that base on the rich venue:
//
//   P(x) = sell_out(buy_out(x)) - x - fixed_cost          (quote base units)
//
// Direction A: buy on venue A, sell on venue B
// Direction B: buy on venue B, sell on venue A
//
// fixed_cost is whatever the caller wants netted out (gas, bridge), already
// converted to quote units. Snapshots are passed in fresh; nothing here fetches.

use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ethers::types::U256;

use crate::engine::optimizer::{find_optimal_trade_size_with, SearchConfig};
use crate::error::Result;
use crate::math::constant_product::{spot_price, FeeRate, ReservePair};
use crate::math::units::{fraction_bps, from_u256, to_decimal};

/// Default cap on trade size: 5% of the buy venue's quote reserve.
pub const DEFAULT_MAX_RESERVE_FRACTION_BPS: u32 = 500;

/// One venue's pool for the pair.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VenuePool {
    pub base_reserve: BigUint,
    pub quote_reserve: BigUint,
    pub fee: FeeRate,
}

impl VenuePool {
    pub fn new(base_reserve: impl Into<BigUint>, quote_reserve: impl Into<BigUint>, fee: FeeRate) -> Self {
        Self { base_reserve: base_reserve.into(), quote_reserve: quote_reserve.into(), fee }
    }

    pub fn from_u256(base_reserve: U256, quote_reserve: U256, fee: FeeRate) -> Self {
        Self { base_reserve: from_u256(base_reserve), quote_reserve: from_u256(quote_reserve), fee }
    }

    /// quote in -> base out
    pub fn buy_side(&self) -> ReservePair {
        ReservePair { reserve_in: self.quote_reserve.clone(), reserve_out: self.base_reserve.clone() }
    }

    /// base in -> quote out
    pub fn sell_side(&self) -> ReservePair {
        ReservePair { reserve_in: self.base_reserve.clone(), reserve_out: self.quote_reserve.clone() }
    }

    /// Quote per base, human units.
    pub fn spot_price(&self, base_decimals: u8, quote_decimals: u8) -> Result<f64> {
        spot_price(&self.base_reserve, base_decimals, &self.quote_reserve, quote_decimals)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArbDirection {
    BuyOnASellOnB,
    BuyOnBSellOnA,
}

/// A concrete buy-leg/sell-leg pair whose profit curve the optimizer searches.
#[derive(Clone, Debug)]
pub struct TwoLegRoute {
    pub buy: ReservePair,
    pub buy_fee: FeeRate,
    pub sell: ReservePair,
    pub sell_fee: FeeRate,
    pub fixed_cost: BigUint,
}

impl TwoLegRoute {
    /// (base acquired on the buy leg, quote returned by the sell leg)
    pub fn legs(&self, quote_in: &BigUint) -> (BigUint, BigUint) {
        let base = self.buy.amount_out(quote_in, &self.buy_fee);
        let quote_out = self.sell.amount_out(&base, &self.sell_fee);
        (base, quote_out)
    }

    pub fn profit(&self, quote_in: &BigUint) -> BigInt {
        let (_, quote_out) = self.legs(quote_in);
        BigInt::from(quote_out) - BigInt::from(quote_in.clone()) - BigInt::from(self.fixed_cost.clone())
    }

    pub fn is_tradable(&self) -> bool {
        !self.buy.is_zero_liquidity() && !self.sell.is_zero_liquidity()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArbitrageResult {
    pub direction: ArbDirection,
    pub optimal_input: BigUint,
    pub base_acquired: BigUint,
    pub quote_returned: BigUint,
    pub profit: BigInt,
}

impl ArbitrageResult {
    pub fn profit_decimal(&self, quote_decimals: u8) -> Option<Decimal> {
        to_decimal(&self.profit.to_biguint()?, quote_decimals)
    }

    /// Lossy profit in human quote units, for reporting.
    pub fn profit_f64(&self, quote_decimals: u8) -> f64 {
        self.profit.to_f64().unwrap_or(0.0) / 10f64.powi(quote_decimals as i32)
    }
}

#[derive(Clone, Debug)]
pub struct CrossVenueArbitrage {
    pub venue_a: VenuePool,
    pub venue_b: VenuePool,
    pub fixed_cost: BigUint,
    pub max_reserve_fraction_bps: u32,
}

impl CrossVenueArbitrage {
    pub fn new(venue_a: VenuePool, venue_b: VenuePool) -> Self {
        Self {
            venue_a,
            venue_b,
            fixed_cost: BigUint::default(),
            max_reserve_fraction_bps: DEFAULT_MAX_RESERVE_FRACTION_BPS,
        }
    }

    pub fn with_fixed_cost(mut self, fixed_cost: impl Into<BigUint>) -> Self {
        self.fixed_cost = fixed_cost.into();
        self
    }

    pub fn with_max_reserve_fraction_bps(mut self, bps: u32) -> Self {
        self.max_reserve_fraction_bps = bps;
        self
    }

    fn venues(&self, direction: ArbDirection) -> (&VenuePool, &VenuePool) {
        match direction {
            ArbDirection::BuyOnASellOnB => (&self.venue_a, &self.venue_b),
            ArbDirection::BuyOnBSellOnA => (&self.venue_b, &self.venue_a),
        }
    }

    pub fn route(&self, direction: ArbDirection) -> TwoLegRoute {
        let (buy, sell) = self.venues(direction);
        TwoLegRoute {
            buy: buy.buy_side(),
            buy_fee: buy.fee,
            sell: sell.sell_side(),
            sell_fee: sell.fee,
            fixed_cost: self.fixed_cost.clone(),
        }
    }

    /// Largest quote input the optimizer may propose in `direction`.
    pub fn search_bound(&self, direction: ArbDirection) -> BigUint {
        let (buy, _) = self.venues(direction);
        fraction_bps(&buy.quote_reserve, self.max_reserve_fraction_bps)
    }

    pub fn optimize_direction(&self, direction: ArbDirection, config: &SearchConfig) -> Option<ArbitrageResult> {
        let route = self.route(direction);
        if !route.is_tradable() {
            log::debug!("{:?}: venue without liquidity, skipping", direction);
            return None;
        }

        let bound = self.search_bound(direction);
        let trade = find_optimal_trade_size_with(config, &bound, |x| route.profit(x));
        if !trade.is_profitable() {
            log::debug!("{:?}: no profitable size up to {}", direction, bound);
            return None;
        }

        let (base_acquired, quote_returned) = route.legs(&trade.optimal_input);
        Some(ArbitrageResult {
            direction,
            optimal_input: trade.optimal_input,
            base_acquired,
            quote_returned,
            profit: trade.profit,
        })
    }

    /// Optimize both directions and return the better one, if any is profitable.
    pub fn optimize(&self, config: &SearchConfig) -> Option<ArbitrageResult> {
        let a = self.optimize_direction(ArbDirection::BuyOnASellOnB, config);
        let b = self.optimize_direction(ArbDirection::BuyOnBSellOnA, config);

        let best = match (a, b) {
            (Some(a_result), Some(b_result)) => {
                if a_result.profit >= b_result.profit { a_result } else { b_result }
            }
            (Some(a_result), None) => a_result,
            (None, Some(b_result)) => b_result,
            (None, None) => return None,
        };

        log::debug!(
            "best direction {:?}: input={} profit={}",
            best.direction, best.optimal_input, best.profit
        );
        Some(best)
    }
}
