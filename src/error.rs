//! Configuration error taxonomy.
//!
//! Only construction-time failures surface as `Err`. Everything that can go
//! wrong inside a tick (zero-norm direction, zero-std fit, GP optimization
//! failure) degrades to a safe local default instead — see the policy
//! modules under `crate::policy`.

use thiserror::Error;

/// Errors that can prevent an [`crate::Orchestrator`] from being constructed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("population_size must be > 0")]
    EmptyPopulation,

    #[error("width and height must be > 0, got {width}x{height}")]
    NonPositiveDimensions { width: i64, height: i64 },

    #[error("max_speed must be > 0, got {0}")]
    NonPositiveMaxSpeed(f64),

    #[error("vision must be > 0, got {0}")]
    NonPositiveVision(f64),

    #[error("separation must be > 0, got {0}")]
    NonPositiveSeparation(f64),

    #[error("efficiency must be within [0, 1], got {0}")]
    EfficiencyOutOfRange(f64),

    #[error("battery must be within [0, 100], got {0}")]
    BatteryOutOfRange(f64),

    #[error("consume coefficient must be >= 0, got {0}")]
    NegativeConsume(f64),

    #[error("initial load must be >= 0, got {0}")]
    NegativeLoad(f64),

    #[error("max_power must be > 0, got {0}")]
    NonPositiveMaxPower(f64),
}
