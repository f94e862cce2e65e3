//! Discrete-time 2D particle simulator.
//!
//! A run takes an initial [`ParticleState`] and fully-resolved [`SimParams`] and produces a
//! [`Trajectory`] of `step_count + 1` position snapshots. Every step applies gravity and
//! optional pairwise repulsion as velocity impulses, moves the particles (semi-implicit
//! Euler), and reflects them off the walls of the rectangular domain. Runs are
//! single-threaded, hold no global state, and are bit-for-bit reproducible.

pub mod boundary;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod scenario;
pub mod simulation;
pub mod state;

pub use error::{EngineError, Result};
pub use simulation::{run_simulation, run_simulation_with_abort, validate_params, Simulation};
pub use state::{Particle, ParticleState};

pub use genesis_common::{DomainBounds, SimParams, Snapshot, Trajectory, Vec2};
