//! wec-swarm-core — simulation core for a swarm of energy-harvesting WEC
//! agents drifting over a spatially heterogeneous power field.
//!
//! The hot loop (`Orchestrator::tick`) and its supporting modules are pure
//! Rust; the `#[pymodule]` below is the only Python-facing surface, for
//! collaborators building an external visualization layer on top of
//! read-only snapshots.

pub mod agent;
pub mod config;
pub mod error;
pub mod field;
pub mod metrics;
pub mod orchestrator;
pub mod policy;
pub mod space;
pub mod stats;

use pyo3::prelude::*;

pub use agent::{Agent, AgentKind, AgentState, Rect};
pub use config::SwarmConfig;
pub use error::ConfigError;
pub use field::Field;
pub use metrics::{AgentSnapshot, FieldSnapshot, Metrics, TickMetrics};
pub use orchestrator::Orchestrator;
pub use space::Space;

/// Initialize tracing for the library. Safe to call more than once — later
/// calls are no-ops.
#[pyfunction]
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Python module initialization.
#[pymodule]
fn wec_swarm_core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(setup_logging, m)?)?;

    m.add_class::<SwarmConfig>()?;
    m.add_class::<Orchestrator>()?;

    m.add_class::<FieldSnapshot>()?;
    m.add_class::<AgentSnapshot>()?;
    m.add_class::<Metrics>()?;
    m.add_class::<TickMetrics>()?;

    Ok(())
}
