pub mod arbitrage;
pub mod optimizer;
