//! Sources of initial particle state.
//!
//! Nothing here is called by the engine itself: these helpers resolve a configuration into a
//! validated [`ParticleState`] that is then handed to [`crate::run_simulation`]. Random
//! sampling always goes through a caller-supplied generator so a seed fully determines the
//! scenario.

use crate::state::{Particle, ParticleState};
use anyhow::{Context, Result};
use genesis_common::{DomainBounds, InitialSource, SimulationConfig, Vec2};
use log::{debug, info, warn};
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Standard deviation of each randomly sampled velocity component.
const RANDOM_VELOCITY_STD: f64 = 2.0;
/// Randomly sampled masses fall in `[MIN, MAX)`.
const RANDOM_MASS_MIN: f64 = 0.5;
const RANDOM_MASS_MAX: f64 = 2.5;

/// Samples `count` particles: positions uniform over `bounds`, velocity components from
/// `Normal(0, 2)`, masses uniform in `[0.5, 2.5)`.
///
/// All positions are drawn first, then all velocities, then all masses.
pub fn random_particles<R: Rng>(count: usize, bounds: &DomainBounds, rng: &mut R) -> Result<Vec<Particle>> {
    let x_dist = Uniform::new(bounds.min.x, bounds.max.x).context("invalid x range for random placement")?;
    let y_dist = Uniform::new(bounds.min.y, bounds.max.y).context("invalid y range for random placement")?;
    let velocity_dist = Normal::new(0.0, RANDOM_VELOCITY_STD)?;
    let mass_dist = Uniform::new(RANDOM_MASS_MIN, RANDOM_MASS_MAX)?;

    let positions: Vec<Vec2> = (0..count)
        .map(|_| Vec2::new(x_dist.sample(rng), y_dist.sample(rng)))
        .collect();
    let velocities: Vec<Vec2> = (0..count)
        .map(|_| Vec2::new(velocity_dist.sample(rng), velocity_dist.sample(rng)))
        .collect();
    let masses: Vec<f64> = (0..count).map(|_| mass_dist.sample(rng)).collect();

    Ok(positions
        .into_iter()
        .zip(velocities)
        .zip(masses)
        .map(|((position, velocity), mass)| Particle { position, velocity, mass })
        .collect())
}

/// Built-in scenarios, laid out for the default `[0, 10] x [0, 10]` domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Two unit masses moving diagonally toward each other from opposite corners.
    TwoBody,
    /// A single particle released at rest from (5, 8).
    Drop,
    /// A 3 x 3 grid of resting unit masses.
    Lattice,
    /// Two unit masses approaching each other along y = 5.
    HeadOn,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::TwoBody, Preset::Drop, Preset::Lattice, Preset::HeadOn];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::TwoBody => "two_body",
            Preset::Drop => "drop",
            Preset::Lattice => "lattice",
            Preset::HeadOn => "head_on",
        }
    }

    pub fn particles(&self) -> Vec<Particle> {
        let at = |x: f64, y: f64, vx: f64, vy: f64| Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            mass: 1.0,
        };
        match self {
            Preset::TwoBody => vec![at(1.0, 1.0, 1.0, 1.0), at(9.0, 9.0, -1.0, -1.0)],
            Preset::Drop => vec![at(5.0, 8.0, 0.0, 0.0)],
            Preset::Lattice => [3.0, 5.0, 7.0]
                .iter()
                .flat_map(|&y| [3.0, 5.0, 7.0].into_iter().map(move |x| at(x, y, 0.0, 0.0)))
                .collect(),
            Preset::HeadOn => vec![at(2.0, 5.0, 3.0, 0.0), at(8.0, 5.0, -3.0, 0.0)],
        }
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                anyhow::anyhow!("Unknown preset '{}'. Known presets: {}", s, known.join(", "))
            })
    }
}

/// JSON scenario document: three equal-length arrays, one entry per particle.
///
/// ```json
/// { "positions": [[1, 1], [9, 9]], "velocities": [[1, 1], [-1, -1]], "masses": [1, 1] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub positions: Vec<[f64; 2]>,
    pub velocities: Vec<[f64; 2]>,
    pub masses: Vec<f64>,
}

impl ScenarioFile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scenario JSON")
    }

    /// Loads a scenario document from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let json = std::fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read scenario file '{}'", path_ref.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid scenario file '{}'", path_ref.display()))
    }

    /// Validates the arrays and converts them into the engine's state buffer.
    pub fn into_state(self) -> crate::error::Result<ParticleState> {
        ParticleState::new(
            self.positions.into_iter().map(Vec2::from).collect(),
            self.velocities.into_iter().map(Vec2::from).collect(),
            self.masses,
        )
    }
}

/// Resolves the configured initial-condition source into a validated state buffer.
pub fn initial_state(config: &SimulationConfig) -> Result<ParticleState> {
    let initial = &config.initial_conditions;
    let bounds = config.get_sim_params().bounds;

    let state = match initial.source {
        InitialSource::Random => {
            info!(
                "Sampling {} random particles (seed {}).",
                initial.num_particles, initial.seed
            );
            let mut rng = StdRng::seed_from_u64(initial.seed);
            let particles = random_particles(initial.num_particles as usize, &bounds, &mut rng)?;
            ParticleState::from_particles(&particles)?
        }
        InitialSource::Preset => {
            let name = initial
                .preset
                .as_deref()
                .context("initial_conditions.preset is not set")?;
            let preset: Preset = name.parse()?;
            info!("Using preset scenario '{}'.", preset.name());
            ParticleState::from_particles(&preset.particles())?
        }
        InitialSource::File => {
            let path = initial
                .scenario_path
                .as_ref()
                .context("initial_conditions.scenario_path is not set")?;
            info!("Loading scenario from {}", path.display());
            ScenarioFile::load(path)?
                .into_state()
                .with_context(|| format!("Scenario '{}' is not a valid particle set", path.display()))?
        }
    };

    let outside = state.positions().iter().filter(|&&p| !bounds.contains(p)).count();
    if outside > 0 {
        warn!(
            "{} particle(s) start outside the domain and will be snapped to a wall on the first step.",
            outside
        );
    }
    debug!("Initial state holds {} particles.", state.len());
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn same_seed_same_particles() -> Result<()> {
        let bounds = DomainBounds::default();
        let a = random_particles(16, &bounds, &mut StdRng::seed_from_u64(42))?;
        let b = random_particles(16, &bounds, &mut StdRng::seed_from_u64(42))?;
        let c = random_particles(16, &bounds, &mut StdRng::seed_from_u64(43))?;
        assert_eq!(a, b);
        assert_ne!(a, c);
        Ok(())
    }

    #[test]
    fn random_particles_respect_ranges() -> Result<()> {
        let bounds = DomainBounds::new(Vec2::new(-5.0, 2.0), Vec2::new(5.0, 4.0));
        let particles = random_particles(200, &bounds, &mut StdRng::seed_from_u64(7))?;
        assert_eq!(particles.len(), 200);
        for p in &particles {
            assert!(bounds.contains(p.position));
            assert!(p.velocity.is_finite());
            assert!((RANDOM_MASS_MIN..RANDOM_MASS_MAX).contains(&p.mass));
        }
        Ok(())
    }

    #[test]
    fn degenerate_bounds_fail_random_placement() {
        let bounds = DomainBounds::new(Vec2::new(3.0, 0.0), Vec2::new(3.0, 10.0));
        assert!(random_particles(4, &bounds, &mut StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn preset_names_round_trip() -> Result<()> {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>()?, preset);
        }
        assert_eq!("  Two_Body ".parse::<Preset>()?, Preset::TwoBody);
        let err = "galaxy".parse::<Preset>().unwrap_err();
        assert!(err.to_string().contains("lattice"));
        Ok(())
    }

    #[test]
    fn presets_are_valid_and_inside_the_default_domain() -> Result<()> {
        let bounds = DomainBounds::default();
        for preset in Preset::ALL {
            let state = ParticleState::from_particles(&preset.particles())?;
            assert!(!state.is_empty());
            assert!(state.positions().iter().all(|&p| bounds.contains(p)));
        }
        assert_eq!(Preset::Lattice.particles().len(), 9);
        Ok(())
    }

    #[test]
    fn scenario_json_converts_to_state() -> Result<()> {
        let scenario = ScenarioFile::from_json_str(
            r#"{ "positions": [[1, 1], [9, 9]], "velocities": [[1, 1], [-1, -1]], "masses": [1, 1] }"#,
        )?;
        let state = scenario.into_state()?;
        assert_eq!(state.position_pairs(), vec![(1.0, 1.0), (9.0, 9.0)]);
        assert_eq!(state.velocities()[1], Vec2::new(-1.0, -1.0));
        Ok(())
    }

    #[test]
    fn scenario_with_mismatched_arrays_is_rejected() -> Result<()> {
        let scenario = ScenarioFile::from_json_str(
            r#"{ "positions": [[1, 1], [9, 9]], "velocities": [[1, 1]], "masses": [1, 1] }"#,
        )?;
        let err = scenario.into_state().unwrap_err();
        assert!(matches!(err, EngineError::InvalidParticleState(_)));
        Ok(())
    }

    #[test]
    fn malformed_scenario_json_is_an_error() {
        assert!(ScenarioFile::from_json_str(r#"{ "positions": [[1, 1, 1]] }"#).is_err());
        assert!(ScenarioFile::load("no/such/scenario.json").is_err());
    }

    #[test]
    fn initial_state_dispatches_on_source() -> Result<()> {
        let config = SimulationConfig::from_toml_str(
            "[initial_conditions]\nsource = \"preset\"\npreset = \"head_on\"\n",
        )?;
        let state = initial_state(&config)?;
        assert_eq!(state.position_pairs(), vec![(2.0, 5.0), (8.0, 5.0)]);

        let config = SimulationConfig::from_toml_str(
            "[initial_conditions]\nsource = \"random\"\nnum_particles = 12\nseed = 99\n",
        )?;
        let a = initial_state(&config)?;
        let b = initial_state(&config)?;
        assert_eq!(a.len(), 12);
        assert_eq!(a, b);
        Ok(())
    }
}
