use crate::error::{EngineError, Result};
use genesis_common::Vec2;
use serde::{Deserialize, Serialize};

/// One particle of an initial scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
}

/// Holds the per-particle state vectors for one run.
///
/// Index `i` in every vector refers to the same particle for the whole run. Masses never
/// change after construction; positions and velocities are rewritten every step.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    masses: Vec<f64>,
}

impl ParticleState {
    /// Builds the state buffer, rejecting misaligned or non-physical input.
    pub fn new(positions: Vec<Vec2>, velocities: Vec<Vec2>, masses: Vec<f64>) -> Result<Self> {
        if positions.len() != velocities.len() || positions.len() != masses.len() {
            return Err(EngineError::InvalidParticleState(format!(
                "length mismatch: {} positions, {} velocities, {} masses",
                positions.len(),
                velocities.len(),
                masses.len()
            )));
        }
        if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
            return Err(EngineError::InvalidParticleState(format!(
                "position of particle {} is not finite",
                i
            )));
        }
        if let Some(i) = velocities.iter().position(|v| !v.is_finite()) {
            return Err(EngineError::InvalidParticleState(format!(
                "velocity of particle {} is not finite",
                i
            )));
        }
        if let Some(i) = masses.iter().position(|&m| !m.is_finite() || m <= 0.0) {
            return Err(EngineError::InvalidParticleState(format!(
                "mass of particle {} must be finite and > 0 (got {})",
                i, masses[i]
            )));
        }

        Ok(Self {
            positions,
            velocities,
            masses,
        })
    }

    /// Builds the state buffer from a list of particles.
    pub fn from_particles(particles: &[Particle]) -> Result<Self> {
        Self::new(
            particles.iter().map(|p| p.position).collect(),
            particles.iter().map(|p| p.velocity).collect(),
            particles.iter().map(|p| p.mass).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Disjoint borrows of the three buffers for one step phase: positions, velocities, masses.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Vec2], &mut [Vec2], &[f64]) {
        (&mut self.positions, &mut self.velocities, &self.masses)
    }

    /// Independent copy of the current positions as `(x, y)` pairs.
    pub fn position_pairs(&self) -> Vec<(f64, f64)> {
        self.positions.iter().map(|&p| p.into()).collect()
    }

    /// Total kinetic energy, 1/2 * sum(m |v|^2).
    pub fn kinetic_energy(&self) -> f64 {
        self.velocities
            .iter()
            .zip(self.masses.iter())
            .map(|(v, m)| 0.5 * m * v.length_squared())
            .sum()
    }

    /// Largest speed of any particle (0 for an empty state).
    pub fn max_speed(&self) -> f64 {
        self.velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max)
    }
}
