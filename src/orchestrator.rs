//! Drives the simulation one tick at a time (spec.md §4.8).
//!
//! Grounded on the teacher's `swarm::mod::TensorSwarm`/`ProductionTensorSwarm`
//! shape: an owning struct holding its own RNG, field, and per-tick metrics
//! buffer, exposed to Python as an opaque, mutating handle with read-only
//! snapshot accessors.

use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::agent::{Agent, AgentKind, AgentState, NeighborView, Rect};
use crate::config::SwarmConfig;
use crate::error::ConfigError;
use crate::field::Field;
use crate::metrics::{AgentSnapshot, FieldSnapshot, Metrics, TickMetrics};
use crate::space::Space;

/// Owns the whole simulation: the agent collection, Field, Space, RNG, and
/// accumulated metrics. `Dynamic`/`Static`/`Gp` runs are just a choice of
/// `AgentKind` at construction.
#[pyclass]
pub struct Orchestrator {
    agents: Vec<Agent>,
    field: Field,
    space: Space,
    rng: StdRng,
    cumulative_load: f64,
    tick: u64,
    history: Vec<TickMetrics>,
    zone: Option<Rect>,
}

impl Orchestrator {
    /// Validate `config`, then build the initial field and agent layout.
    /// A single RNG seed drives both, so `Dynamic` and `Static` swarms built
    /// from the same config start at identical positions (spec.md §8
    /// round-trip property).
    pub fn new(kind: AgentKind, config: &SwarmConfig) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "invalid swarm configuration");
            return Err(e);
        }

        let field = Field::initialize(config.width, config.height, config.max_power, config.seed);
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));

        let mut space = Space::new(
            config.width as f64,
            config.height as f64,
            config.vision,
            config.population_size,
        );

        let mut agents = Vec::with_capacity(config.population_size);
        for i in 0..config.population_size {
            let pos = (
                rng.gen_range(0.0..config.width as f64),
                rng.gen_range(0.0..config.height as f64),
            );
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let dir = (angle.cos(), angle.sin());

            space.set_position(i, pos);
            let state = AgentState::new(
                pos,
                dir,
                config.max_speed,
                config.vision,
                config.separation,
                config.battery,
                config.efficiency,
                config.consume,
                config.load,
            );
            agents.push(Agent::new(kind, state));
        }

        info!(
            population_size = config.population_size,
            width = config.width,
            height = config.height,
            seed = config.seed,
            ?kind,
            "orchestrator constructed"
        );

        Ok(Orchestrator {
            agents,
            field,
            space,
            rng,
            cumulative_load: 0.0,
            tick: 0,
            history: Vec::new(),
            zone: None,
        })
    }

    /// Restrict `count_agent_in_zone` bookkeeping to this rectangle. Unset
    /// (the default) means no zone is tracked.
    pub fn set_zone(&mut self, zone: Rect) {
        self.zone = Some(zone);
    }

    /// Advance one tick: permute activation order, step every agent in
    /// turn (each seeing already-moved peers), accumulate load, collect
    /// metrics, then perturb the field.
    pub fn tick(&mut self) {
        self.tick += 1;

        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.shuffle(&mut self.rng);

        for &i in &order {
            let self_pos = self.agents[i].state.position;
            let vision = self.agents[i].state.vision;
            let raw = self.space.neighbors_within(self_pos, vision);

            let neighbors: Vec<NeighborView> = raw
                .into_iter()
                .filter(|&(idx, _)| idx != i)
                .map(|(idx, distance)| {
                    let other = &self.agents[idx].state;
                    NeighborView {
                        index: idx,
                        position: other.position,
                        distance,
                        power: self.field.sample(other.position.0, other.position.1),
                        energy_harvested: other.energy_harvested,
                    }
                })
                .collect();

            self.agents[i].step(&neighbors, &self.field, &self.space, self.zone);
            self.space.set_position(i, self.agents[i].state.position);
        }

        let total_load: f64 = self.agents.iter().map(|a| a.state.load).sum();
        self.cumulative_load += total_load;

        let avg_battery = mean(self.agents.iter().map(|a| a.state.battery));
        let connections: u64 = self
            .agents
            .par_iter()
            .map(|a| {
                self.space
                    .neighbors_within(a.state.position, a.state.vision)
                    .len()
                    .saturating_sub(1) as u64
            })
            .sum();

        let metrics = TickMetrics {
            tick: self.tick,
            avg_battery,
            connections,
            total_load: 100.0 * mean(self.agents.iter().map(|a| a.state.load)),
            cumulative_load: self.cumulative_load,
        };
        debug!(
            tick = self.tick,
            avg_battery = metrics.avg_battery,
            connections = metrics.connections,
            "tick complete"
        );
        self.history.push(metrics);

        self.field.perturb();
    }

    pub fn field_snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            width: self.field.width(),
            height: self.field.height(),
            values: self.field.snapshot(),
        }
    }

    pub fn agents_snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents
            .iter()
            .map(|a| {
                let neighbors_count = self
                    .space
                    .neighbors_within(a.state.position, a.state.vision)
                    .len()
                    .saturating_sub(1);
                AgentSnapshot {
                    position: a.state.position,
                    direction: a.state.direction,
                    battery: a.state.battery,
                    speed: a.state.speed,
                    neighbors_count,
                    wec_power: a.state.wec_power,
                }
            })
            .collect()
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            history: self.history.clone(),
        }
    }

    pub fn tick_number(&self) -> u64 {
        self.tick
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}

/// Sequential, fixed-association-order mean. Spec.md §8's determinism
/// property requires bit-identical metric series across same-seed runs;
/// a rayon fold/reduce would vary float-addition order with work-stealing
/// and break that, so this stays a plain sequential sum.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// `#[pymethods]` wrapper: pyo3 can't expose `Result<Self, ConfigError>`
/// constructors directly, so `py_new` translates validation failures into
/// a `PyValueError` and delegates everything else to [`Orchestrator::new`].
#[pymethods]
impl Orchestrator {
    #[new]
    #[pyo3(signature = (config, kind = "dynamic".to_string()))]
    pub fn py_new(config: SwarmConfig, kind: String) -> PyResult<Self> {
        let kind = match kind.as_str() {
            "dynamic" => AgentKind::Dynamic,
            "static" => AgentKind::Static,
            "gp" => AgentKind::Gp,
            other => {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "unknown agent kind: {other}"
                )))
            }
        };
        Orchestrator::new(kind, &config)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    #[pyo3(name = "tick")]
    pub fn py_tick(&mut self) {
        self.tick();
    }

    #[pyo3(name = "field_snapshot")]
    pub fn py_field_snapshot(&self) -> FieldSnapshot {
        self.field_snapshot()
    }

    #[pyo3(name = "agents_snapshot")]
    pub fn py_agents_snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents_snapshot()
    }

    #[pyo3(name = "metrics")]
    pub fn py_metrics(&self) -> Metrics {
        self.metrics()
    }

    #[getter]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind_overrides: impl FnOnce(&mut SwarmConfig)) -> SwarmConfig {
        let mut cfg = SwarmConfig::default();
        cfg.population_size = 20;
        cfg.width = 50;
        cfg.height = 50;
        kind_overrides(&mut cfg);
        cfg
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = config(|c| c.population_size = 0);
        assert!(Orchestrator::new(AgentKind::Dynamic, &cfg).is_err());
    }

    #[test]
    fn same_seed_same_initial_layout_across_kinds() {
        let cfg = config(|_| {});
        let dynamic = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
        let static_swarm = Orchestrator::new(AgentKind::Static, &cfg).unwrap();
        let d = dynamic.agents_snapshot();
        let s = static_swarm.agents_snapshot();
        assert_eq!(d.len(), s.len());
        for (a, b) in d.iter().zip(s.iter()) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn static_swarm_never_moves() {
        let cfg = config(|_| {});
        let mut orch = Orchestrator::new(AgentKind::Static, &cfg).unwrap();
        let before = orch.agents_snapshot();
        for _ in 0..100 {
            orch.tick();
        }
        let after = orch.agents_snapshot();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn determinism_across_two_runs_with_same_seed() {
        let cfg = config(|c| c.seed = 77);
        let mut a = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
        let mut b = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
        for _ in 0..5 {
            a.tick();
            b.tick();
        }
        let ma = a.metrics();
        let mb = b.metrics();
        assert_eq!(ma.history.len(), mb.history.len());
        for (x, y) in ma.history.iter().zip(mb.history.iter()) {
            // Sequential, fixed-order reduction: exact match, not just close.
            assert_eq!(x.avg_battery, y.avg_battery);
            assert_eq!(x.connections, y.connections);
        }
    }

    #[test]
    fn battery_stays_within_bounds_over_many_ticks() {
        let cfg = config(|_| {});
        let mut orch = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
        for _ in 0..30 {
            orch.tick();
        }
        for a in orch.agents_snapshot() {
            assert!(a.battery >= 0.0 && a.battery <= 100.0);
            assert!(a.position.0 >= 0.0 && a.position.0 <= cfg.width as f64);
            assert!(a.position.1 >= 0.0 && a.position.1 <= cfg.height as f64);
        }
    }
}
