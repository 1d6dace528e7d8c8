use thiserror::Error;

/// Errors surfaced by the pricing engine.
///
/// Degenerate pools (empty reserves, infeasible outputs) are not errors; they
/// quote as zero. These variants cover programmer mistakes and boundary parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("spot price is not finite (reserve_a={reserve_a}, reserve_b={reserve_b})")]
    NonFinitePrice { reserve_a: String, reserve_b: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("overflow: {0}")]
    Overflow(String),

    #[error("invalid config value for {key}: {reason}")]
    Config { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AmmError>;
