//! Configuration error types.
//!
//! Every error here is fatal and raised before any directive is emitted.

use thiserror::Error;

/// Result type alias for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Errors that make a cycle run impossible to schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("odd slot centrifuge not supported: {0} slots")]
    OddCapacity(usize),

    #[error("centrifuge must have at least one pair of slots")]
    ZeroCapacity,

    #[error("no items to centrifuge")]
    NoItems,

    #[error("no tubes to batch")]
    NoTubes,

    #[error("at least one cycle is required")]
    NoCycles,

    #[error("wrong cycle amount: declared {expected}, found {actual}")]
    CycleCountMismatch { expected: usize, actual: usize },

    #[error("{field} must be positive and finite, got {value}")]
    NonPositiveVolume { field: &'static str, value: f64 },

    #[error("start volume {start_volume}mL does not fill a single {tube_volume}mL tube")]
    InsufficientStartVolume { start_volume: f64, tube_volume: f64 },

    #[error("{per_item} tubes per item exceeds the limit of {limit}")]
    TooManyTubes { per_item: f64, limit: usize },

    #[error("cycle {cycle}: {reason}")]
    InvalidCentrifugeSetting { cycle: usize, reason: String },

    #[error("cannot combine {count} batch(es): batches are combined in adjacent pairs")]
    UnpairedBatch { count: usize },
}
