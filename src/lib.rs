// lib.rs - constant-product pricing and trade-size search

pub mod config;
pub mod error;
pub mod math;
pub mod engine;

pub use error::{AmmError, Result};
pub use math::constant_product::{
    compute_amount_in, compute_amount_in_with_fee, compute_amount_out, compute_amount_out_with_fee,
    spot_price, FeeRate, ReservePair,
};
pub use math::units::format_amount;
pub use engine::optimizer::{find_optimal_trade_size, find_optimal_trade_size_with, OptimalTrade, SearchConfig};
