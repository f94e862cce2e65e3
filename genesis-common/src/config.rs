use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::sim_params::{DomainBounds, SimParams};
use crate::vecmath::Vec2;
use std::path::{Path, PathBuf};

// Domain rectangle the particles are confined to
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UniverseConfig {
    #[serde(default = "default_lower_bound")]
    pub x_min: f64,
    #[serde(default = "default_upper_bound")]
    pub x_max: f64,
    #[serde(default = "default_lower_bound")]
    pub y_min: f64,
    #[serde(default = "default_upper_bound")]
    pub y_max: f64,
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default = "default_step_count")]
    pub step_count: u32,
}

// Force and collision parameters
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PhysicsConfig {
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    #[serde(default = "default_elasticity")]
    pub elasticity: f64, // 0.0 is perfectly inelastic, 1.0 is perfectly elastic
    #[serde(default)]
    pub repulsion_strength: f64, // 0.0 disables repulsion
}

/// Where the initial particle state comes from.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialSource {
    /// Seeded random positions, velocities and masses.
    Random,
    /// One of the built-in scenarios, selected by `preset`.
    Preset,
    /// A JSON scenario file at `scenario_path`.
    File,
}

// Initial conditions for the simulation, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitialConditions {
    #[serde(default = "default_source")]
    pub source: InitialSource,
    #[serde(default = "default_num_particles")]
    pub num_particles: u32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub scenario_path: Option<PathBuf>,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct OutputConfig {
    pub format: Option<String>, // Output format: "json", "csv", "summary"
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub universe: UniverseConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub initial_conditions: InitialConditions,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        UniverseConfig {
            x_min: default_lower_bound(),
            x_max: default_upper_bound(),
            y_min: default_lower_bound(),
            y_max: default_upper_bound(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            time_step: default_time_step(),
            step_count: default_step_count(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            elasticity: default_elasticity(),
            repulsion_strength: 0.0,
        }
    }
}

impl Default for InitialConditions {
    fn default() -> Self {
        InitialConditions {
            source: default_source(),
            num_particles: default_num_particles(),
            seed: 0,
            preset: None,
            scenario_path: None,
        }
    }
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;

        Ok(config)
    }

    /// Parses a configuration from TOML text.
    ///
    /// Only structural checks happen here; physical ranges (elasticity, time step, ...)
    /// are validated by the engine before a run starts.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;

        let initial = &config.initial_conditions;
        match initial.source {
            InitialSource::Random if initial.num_particles == 0 => {
                anyhow::bail!("num_particles must be greater than 0 for a random source.");
            }
            InitialSource::Preset if initial.preset.is_none() => {
                anyhow::bail!("initial_conditions.preset is required when source = \"preset\".");
            }
            InitialSource::File if initial.scenario_path.is_none() => {
                anyhow::bail!("initial_conditions.scenario_path is required when source = \"file\".");
            }
            _ => {}
        }

        Ok(config)
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        SimParams {
            gravity: self.physics.gravity,
            elasticity: self.physics.elasticity,
            repulsion_strength: self.physics.repulsion_strength,
            dt: self.timing.time_step,
            step_count: self.timing.step_count,
            bounds: DomainBounds::new(
                Vec2::new(self.universe.x_min, self.universe.y_min),
                Vec2::new(self.universe.x_max, self.universe.y_max),
            ),
        }
    }
}

// Defaults mirror the interactive dashboard's initial slider values
fn default_lower_bound() -> f64 {
    0.0
}

fn default_upper_bound() -> f64 {
    10.0
}

fn default_time_step() -> f64 {
    0.05
}

fn default_step_count() -> u32 {
    100
}

fn default_gravity() -> f64 {
    9.8
}

fn default_elasticity() -> f64 {
    0.9
}

fn default_source() -> InitialSource {
    InitialSource::Random
}

fn default_num_particles() -> u32 {
    10
}
