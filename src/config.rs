//! Simulation configuration.
//!
//! Mirrors `openrustswarm-core`'s `swarm::SwarmConfig` shape: a plain,
//! `serde`-roundtrippable, `pyo3`-exposed struct with a `#[pymethods] #[new]`
//! constructor carrying the same defaults as the table it documents.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// All tunables for a swarm run. Every field has the default from the
/// external interface table; unset fields mean "use the default".
#[derive(Clone, Debug, Serialize, Deserialize)]
#[pyclass]
pub struct SwarmConfig {
    #[pyo3(get, set)]
    pub population_size: usize,
    #[pyo3(get, set)]
    pub width: usize,
    #[pyo3(get, set)]
    pub height: usize,
    #[pyo3(get, set)]
    pub max_speed: f64,
    #[pyo3(get, set)]
    pub vision: f64,
    #[pyo3(get, set)]
    pub separation: f64,
    #[pyo3(get, set)]
    pub efficiency: f64,
    #[pyo3(get, set)]
    pub consume: f64,
    #[pyo3(get, set)]
    pub battery: f64,
    #[pyo3(get, set)]
    pub load: f64,
    #[pyo3(get, set)]
    pub max_power: f64,
    #[pyo3(get, set)]
    pub seed: u64,
}

#[pymethods]
impl SwarmConfig {
    #[new]
    #[pyo3(signature = (
        population_size = 100,
        width = 100,
        height = 100,
        max_speed = 1.0,
        vision = 10.0,
        separation = 5.0,
        efficiency = 0.3,
        consume = 1.0,
        battery = 50.0,
        load = 0.0,
        max_power = 1.0,
        seed = 10,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        population_size: usize,
        width: usize,
        height: usize,
        max_speed: f64,
        vision: f64,
        separation: f64,
        efficiency: f64,
        consume: f64,
        battery: f64,
        load: f64,
        max_power: f64,
        seed: u64,
    ) -> Self {
        SwarmConfig {
            population_size,
            width,
            height,
            max_speed,
            vision,
            separation,
            efficiency,
            consume,
            battery,
            load,
            max_power,
            seed,
        }
    }

    /// Validate and surface the first configuration error found, if any.
    pub fn check(&self) -> PyResult<()> {
        self.validate()
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    #[staticmethod]
    pub fn from_json(json: &str) -> PyResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }
}

impl Default for SwarmConfig {
    fn default() -> Self {
        SwarmConfig {
            population_size: 100,
            width: 100,
            height: 100,
            max_speed: 1.0,
            vision: 10.0,
            separation: 5.0,
            efficiency: 0.3,
            consume: 1.0,
            battery: 50.0,
            load: 0.0,
            max_power: 1.0,
            seed: 10,
        }
    }
}

impl SwarmConfig {
    /// Reject configurations that would make the orchestrator un-buildable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::NonPositiveDimensions {
                width: self.width as i64,
                height: self.height as i64,
            });
        }
        if self.max_speed <= 0.0 {
            return Err(ConfigError::NonPositiveMaxSpeed(self.max_speed));
        }
        if self.vision <= 0.0 {
            return Err(ConfigError::NonPositiveVision(self.vision));
        }
        if self.separation <= 0.0 {
            return Err(ConfigError::NonPositiveSeparation(self.separation));
        }
        if !(0.0..=1.0).contains(&self.efficiency) {
            return Err(ConfigError::EfficiencyOutOfRange(self.efficiency));
        }
        if !(0.0..=100.0).contains(&self.battery) {
            return Err(ConfigError::BatteryOutOfRange(self.battery));
        }
        if self.consume < 0.0 {
            return Err(ConfigError::NegativeConsume(self.consume));
        }
        if self.load < 0.0 {
            return Err(ConfigError::NegativeLoad(self.load));
        }
        if self.max_power <= 0.0 {
            return Err(ConfigError::NonPositiveMaxPower(self.max_power));
        }
        Ok(())
    }
}
