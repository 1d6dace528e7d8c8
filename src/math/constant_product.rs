// Constant-Product (x*y=k) Pool Math
// ----------------------------------
// Exact integer swap math for fee-bearing constant-product pools (Uniswap V2 style).
//
// Notes:
// - All amounts are raw base units in BigUint. Products like amount_in * reserve_out
//   routinely exceed 128 bits for 18-decimal tokens, so no fixed-width intermediates.
// - The fee is applied to the input leg: in' = in * num / den (997/1000 baseline).
// - Degenerate pools quote 0 instead of erroring. Range scans (the optimizer)
//   rely on that.
// - Floats appear only in the display helpers (spot/execution price, impact).

use ethers::types::U256;
use num_bigint::BigUint;
use num_traits::Zero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{AmmError, Result};
use crate::math::units::{from_u256, to_f64_lossy};

// ------------------------------- Fee rate ------------------------------------

/// Input-side fee as an exact fraction: the pool keeps `1 - numerator/denominator`.
///
/// Always satisfies `0 < numerator <= denominator`. Deserialized values go through
/// [`FeeRate::new`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawFeeRate", into = "RawFeeRate"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeeRate {
    numerator: u32,
    denominator: u32,
}

/// Wire shape of a [`FeeRate`], unchecked.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawFeeRate {
    numerator: u32,
    denominator: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawFeeRate> for FeeRate {
    type Error = AmmError;

    fn try_from(raw: RawFeeRate) -> Result<Self> {
        FeeRate::new(raw.numerator, raw.denominator)
    }
}

#[cfg(feature = "serde")]
impl From<FeeRate> for RawFeeRate {
    fn from(fee: FeeRate) -> Self {
        Self { numerator: fee.numerator, denominator: fee.denominator }
    }
}

impl FeeRate {
    /// 0.3% fee, 997/1000.
    pub const UNISWAP_V2: FeeRate = FeeRate { numerator: 997, denominator: 1000 };

    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if denominator == 0 {
            return Err(AmmError::InvalidArgument("fee denominator must be non-zero".into()));
        }
        if numerator == 0 || numerator > denominator {
            return Err(AmmError::InvalidArgument(format!(
                "fee numerator must be in 1..={denominator}, got {numerator}"
            )));
        }
        Ok(Self { numerator, denominator })
    }

    /// Fee given in basis points, e.g. 30 => 9970/10000.
    pub fn from_bps(fee_bps: u32) -> Result<Self> {
        if fee_bps >= 10_000 {
            return Err(AmmError::InvalidArgument(format!(
                "fee must be below 10000 bps, got {fee_bps}"
            )));
        }
        Self::new(10_000 - fee_bps, 10_000)
    }

    #[inline]
    pub const fn numerator(&self) -> u32 {
        self.numerator
    }

    #[inline]
    pub const fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Fee kept by the pool, in basis points (rounded down).
    pub fn fee_bps(&self) -> u32 {
        let kept = u64::from(self.denominator.saturating_sub(self.numerator)) * 10_000;
        (kept / u64::from(self.denominator)) as u32
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::UNISWAP_V2
    }
}

// ------------------------------- Core math -----------------------------------

/// Output for an exact input at the 0.3% baseline fee.
#[inline]
pub fn compute_amount_out(amount_in: &BigUint, reserve_in: &BigUint, reserve_out: &BigUint) -> BigUint {
    compute_amount_out_with_fee(amount_in, reserve_in, reserve_out, &FeeRate::UNISWAP_V2)
}

/// out = floor( in*num * R_out / (R_in*den + in*num) )
pub fn compute_amount_out_with_fee(
    amount_in: &BigUint,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
    fee: &FeeRate,
) -> BigUint {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return BigUint::zero();
    }
    let amount_in_with_fee = amount_in * fee.numerator;
    let numerator = &amount_in_with_fee * reserve_out;
    let denominator = reserve_in * fee.denominator + amount_in_with_fee;
    numerator / denominator
}

/// Input required for an exact output at the 0.3% baseline fee.
#[inline]
pub fn compute_amount_in(amount_out: &BigUint, reserve_in: &BigUint, reserve_out: &BigUint) -> BigUint {
    compute_amount_in_with_fee(amount_out, reserve_in, reserve_out, &FeeRate::UNISWAP_V2)
}

/// in = floor( R_in * out * den / ((R_out - out) * num) ) + 1
///
/// Rounds in the pool's favor. Returns 0 when the pool cannot supply `amount_out`.
pub fn compute_amount_in_with_fee(
    amount_out: &BigUint,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
    fee: &FeeRate,
) -> BigUint {
    if amount_out.is_zero() || reserve_in.is_zero() || reserve_out <= amount_out {
        return BigUint::zero();
    }
    let numerator = reserve_in * amount_out * fee.denominator;
    let denominator = (reserve_out - amount_out) * fee.numerator;
    numerator / denominator + 1u32
}

// --------------------------- Price & conversions -----------------------------

/// Spot price of token A in units of token B, normalized by decimals. Display only.
///
/// price = (R_b / 10^d_b) / (R_a / 10^d_a)
pub fn spot_price(reserve_a: &BigUint, decimals_a: u8, reserve_b: &BigUint, decimals_b: u8) -> Result<f64> {
    if reserve_a.is_zero() {
        return Ok(0.0);
    }
    let a = to_f64_lossy(reserve_a, decimals_a);
    let b = to_f64_lossy(reserve_b, decimals_b);
    let price = b / a;
    if !a.is_finite() || !b.is_finite() || !price.is_finite() {
        return Err(AmmError::NonFinitePrice {
            reserve_a: reserve_a.to_string(),
            reserve_b: reserve_b.to_string(),
        });
    }
    Ok(price)
}

// ------------------------------ Pool snapshot --------------------------------

/// Directional reserve snapshot: what goes in, what comes out.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservePair {
    pub reserve_in: BigUint,
    pub reserve_out: BigUint,
}

impl ReservePair {
    pub fn new(reserve_in: impl Into<BigUint>, reserve_out: impl Into<BigUint>) -> Self {
        Self { reserve_in: reserve_in.into(), reserve_out: reserve_out.into() }
    }

    /// Build from on-chain `getReserves` words.
    pub fn from_u256(reserve_in: U256, reserve_out: U256) -> Self {
        Self { reserve_in: from_u256(reserve_in), reserve_out: from_u256(reserve_out) }
    }

    #[inline]
    pub fn is_zero_liquidity(&self) -> bool {
        self.reserve_in.is_zero() || self.reserve_out.is_zero()
    }

    /// Same pool, opposite swap direction.
    pub fn reversed(&self) -> Self {
        Self { reserve_in: self.reserve_out.clone(), reserve_out: self.reserve_in.clone() }
    }

    pub fn amount_out(&self, amount_in: &BigUint, fee: &FeeRate) -> BigUint {
        compute_amount_out_with_fee(amount_in, &self.reserve_in, &self.reserve_out, fee)
    }

    pub fn amount_in(&self, amount_out: &BigUint, fee: &FeeRate) -> BigUint {
        compute_amount_in_with_fee(amount_out, &self.reserve_in, &self.reserve_out, fee)
    }

    /// Snapshot after swapping `amount_in`: the whole input (fee included) stays in the pool.
    pub fn after_swap(&self, amount_in: &BigUint, fee: &FeeRate) -> Self {
        let out = self.amount_out(amount_in, fee);
        Self {
            reserve_in: &self.reserve_in + amount_in,
            reserve_out: &self.reserve_out - out,
        }
    }

    /// Effective out-per-in price of a trade, in human units.
    pub fn execution_price(&self, amount_in: &BigUint, dec_in: u8, dec_out: u8, fee: &FeeRate) -> f64 {
        let in_h = to_f64_lossy(amount_in, dec_in);
        if in_h <= 0.0 {
            return 0.0;
        }
        to_f64_lossy(&self.amount_out(amount_in, fee), dec_out) / in_h
    }

    /// Execution price relative to spot, in percent. Negative means worse than spot.
    ///
    /// An empty pool reports 0%. Reserves too large for `f64` are an error.
    pub fn price_impact_percent(&self, amount_in: &BigUint, dec_in: u8, dec_out: u8, fee: &FeeRate) -> Result<f64> {
        let spot = spot_price(&self.reserve_in, dec_in, &self.reserve_out, dec_out)?;
        if spot > 0.0 {
            let eff = self.execution_price(amount_in, dec_in, dec_out, fee);
            Ok((eff / spot - 1.0) * 100.0)
        } else {
            Ok(0.0)
        }
    }
}

// ---------------------------------- Tests ------------------------------------
