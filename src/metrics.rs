//! Read-only observation types returned by [`crate::orchestrator::Orchestrator`]
//! (spec.md §6, "Observation API"). Nothing here lets a caller mutate
//! simulation state — every field is `get`-only on the Python side.

use pyo3::prelude::*;
use serde::Serialize;

/// One tick's swarm-wide aggregates.
#[derive(Clone, Debug, Serialize)]
#[pyclass(get_all)]
pub struct TickMetrics {
    pub tick: u64,
    pub avg_battery: f64,
    pub connections: u64,
    pub total_load: f64,
    pub cumulative_load: f64,
}

/// The full per-tick history, as returned by `Orchestrator::metrics()`.
#[derive(Clone, Debug, Serialize)]
#[pyclass]
pub struct Metrics {
    pub history: Vec<TickMetrics>,
}

#[pymethods]
impl Metrics {
    pub fn latest(&self) -> Option<TickMetrics> {
        self.history.last().cloned()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.history).unwrap_or_default()
    }

    pub fn history(&self) -> Vec<TickMetrics> {
        self.history.clone()
    }
}

/// One agent's externally-visible state (spec.md §6).
#[derive(Clone, Copy, Debug, Serialize)]
#[pyclass(get_all)]
pub struct AgentSnapshot {
    pub position: (f64, f64),
    pub direction: (f64, f64),
    pub battery: f64,
    pub speed: f64,
    pub neighbors_count: usize,
    pub wec_power: f64,
}

/// The power field, flattened for transfer (spec.md §6).
#[derive(Clone, Debug, Serialize)]
#[pyclass(get_all)]
pub struct FieldSnapshot {
    pub width: usize,
    pub height: usize,
    pub values: Vec<Vec<f64>>,
}
