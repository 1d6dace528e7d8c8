// Raw <-> human unit conversions.
//
// Raw amounts are integers in the token's smallest unit; `decimals` says where the
// decimal point goes. Formatting and parsing are exact. The f64/Decimal views are
// for reporting only.

use ethers::types::U256;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{AmmError, Result};

#[inline]
pub fn pow10(decimals: u8) -> BigUint {
    num_traits::pow(BigUint::from(10u8), decimals as usize)
}

/// Format raw units as a decimal string with at most `precision` fractional digits.
///
/// Truncates (never rounds) and trims trailing zeros; an all-zero fraction is dropped,
/// so `1_000_000` at 6 decimals formats as `"1"`.
pub fn format_amount(amount: &BigUint, decimals: u8, precision: u8) -> String {
    let (whole, frac) = amount.div_rem(&pow10(decimals));
    if decimals == 0 || precision == 0 {
        return whole.to_string();
    }

    let mut digits = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    digits.truncate(precision as usize);
    let digits = digits.trim_end_matches('0');

    if digits.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{digits}")
    }
}

/// Parse a human decimal string (e.g. `"1.25"`) into raw units.
pub fn parse_amount(human: &str, decimals: u8) -> Result<BigUint> {
    let s = human.trim();
    if s.is_empty() {
        return Err(AmmError::InvalidAmount("empty amount".into()));
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(AmmError::InvalidAmount(format!("no digits in {human:?}")));
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(AmmError::InvalidAmount(format!("not an unsigned decimal: {human:?}")));
    }
    if frac.len() > decimals as usize {
        return Err(AmmError::InvalidAmount(format!(
            "{human:?} has more than {decimals} fractional digits"
        )));
    }

    let mut raw = String::with_capacity(whole.len() + decimals as usize);
    raw.push_str(whole);
    raw.push_str(frac);
    raw.extend(std::iter::repeat('0').take(decimals as usize - frac.len()));

    raw.parse::<BigUint>()
        .map_err(|e| AmmError::InvalidAmount(format!("{human:?}: {e}")))
}

/// Convert raw units -> human f64 (lossy, for reporting).
#[inline]
pub fn to_f64_lossy(amount: &BigUint, decimals: u8) -> f64 {
    let v = amount.to_f64().unwrap_or(f64::INFINITY);
    v / 10f64.powi(decimals as i32)
}

/// Exact `Decimal` view when the raw value fits a 96-bit mantissa and decimals <= 28.
pub fn to_decimal(amount: &BigUint, decimals: u8) -> Option<Decimal> {
    let mantissa = amount.to_i128()?;
    Decimal::try_from_i128_with_scale(mantissa, decimals as u32).ok()
}

pub fn from_u256(value: U256) -> BigUint {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    BigUint::from_bytes_be(&buf)
}

pub fn to_u256(amount: &BigUint) -> Result<U256> {
    if amount.bits() > 256 {
        return Err(AmmError::Overflow(format!("{amount} does not fit in 256 bits")));
    }
    Ok(U256::from_big_endian(&amount.to_bytes_be()))
}

/// `amount * bps / 10_000`, floored.
#[inline]
pub fn fraction_bps(amount: &BigUint, bps: u32) -> BigUint {
    if bps >= 10_000 {
        return amount.clone();
    }
    amount * bps / 10_000u32
}
