use std::env;
use std::str::FromStr;

use num_bigint::BigUint;

use crate::engine::arbitrage::DEFAULT_MAX_RESERVE_FRACTION_BPS;
use crate::engine::optimizer::{SearchConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_STEP};
use crate::error::{AmmError, Result};
use crate::math::constant_product::FeeRate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    // Pool fee (input leg)
    pub fee_numerator: u32,
    pub fee_denominator: u32,

    // Optimizer
    pub min_step: BigUint,
    pub max_iterations: u32,

    // Arbitrage sizing
    pub max_reserve_fraction_bps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_numerator: FeeRate::UNISWAP_V2.numerator(),
            fee_denominator: FeeRate::UNISWAP_V2.denominator(),
            min_step: BigUint::from(DEFAULT_MIN_STEP),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_reserve_fraction_bps: DEFAULT_MAX_RESERVE_FRACTION_BPS,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        // Local overrides first, then the generic .env
        dotenv::from_filename("cpamm.env").ok();
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key -> value source. Missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = EngineConfig {
            fee_numerator: parse_or(&lookup, "AMM_FEE_NUMERATOR", defaults.fee_numerator)?,
            fee_denominator: parse_or(&lookup, "AMM_FEE_DENOMINATOR", defaults.fee_denominator)?,
            min_step: parse_or(&lookup, "AMM_MIN_STEP", defaults.min_step)?,
            max_iterations: parse_or(&lookup, "AMM_MAX_ITERATIONS", defaults.max_iterations)?,
            max_reserve_fraction_bps: parse_or(
                &lookup,
                "AMM_MAX_RESERVE_FRACTION_BPS",
                defaults.max_reserve_fraction_bps,
            )?,
        };

        // fee pair must form a valid FeeRate
        config.fee_rate().map_err(|e| AmmError::Config {
            key: if config.fee_denominator == 0 { "AMM_FEE_DENOMINATOR" } else { "AMM_FEE_NUMERATOR" }.into(),
            reason: e.to_string(),
        })?;
        if config.max_reserve_fraction_bps > 10_000 {
            return Err(AmmError::Config {
                key: "AMM_MAX_RESERVE_FRACTION_BPS".into(),
                reason: format!("{} exceeds 10000", config.max_reserve_fraction_bps),
            });
        }

        log::debug!("loaded engine config: {:?}", config);
        Ok(config)
    }

    pub fn fee_rate(&self) -> Result<FeeRate> {
        FeeRate::new(self.fee_numerator, self.fee_denominator)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig { min_step: self.min_step.clone(), max_iterations: self.max_iterations }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| AmmError::Config {
            key: key.to_string(),
            reason: format!("{raw:?}: {e}"),
        }),
    }
}
