//! Velocity-space force application for one step.
//!
//! Gravity and pairwise repulsion are applied as impulses (`dv = a * dt`) directly to the
//! velocity buffer, before the integrator moves any particle. The repulsion pass is a direct
//! O(n^2) sum over unordered pairs, which is fine for tens of particles; larger systems
//! would need a spatial partition (uniform grid or quadtree) to prune distant pairs.

use crate::state::ParticleState;
use genesis_common::{SimParams, Vec2};

/// Regularization added to every pair distance so coincident particles never divide by zero.
pub const REPULSION_EPSILON: f64 = 1e-5;

/// Applies gravity, then repulsion if enabled, to every particle's velocity.
pub fn accumulate(state: &mut ParticleState, params: &SimParams) {
    apply_gravity(state, params.gravity, params.dt);
    if params.repulsion_enabled() {
        apply_repulsion(state, params.repulsion_strength, params.dt);
    }
}

/// Subtracts `gravity * dt` from every y-velocity.
pub fn apply_gravity(state: &mut ParticleState, gravity: f64, dt: f64) {
    let (_, velocities, _) = state.parts_mut();
    let dv = gravity * dt;
    for v in velocities.iter_mut() {
        v.y -= dv;
    }
}

/// Force exerted on the particle at `pj` by the particle at `pi`.
/// The particle at `pi` receives the exact negation.
///
/// Magnitude is `strength / (|d| + eps)^2`, directed along `d = pj - pi`. At zero separation
/// the direction vector is zero, so coincident particles exert no force on each other.
#[inline]
pub fn pair_repulsion(pi: Vec2, pj: Vec2, strength: f64) -> Vec2 {
    let displacement = pj - pi;
    let distance = displacement.length() + REPULSION_EPSILON;
    let force_magnitude = strength / (distance * distance);
    (displacement / distance) * force_magnitude
}

/// Applies equal and opposite repulsion impulses to every unordered pair `(i, j)`, `i < j`.
/// Does nothing when `strength <= 0`.
pub fn apply_repulsion(state: &mut ParticleState, strength: f64, dt: f64) {
    if strength <= 0.0 {
        return;
    }
    let (positions, velocities, masses) = state.parts_mut();
    let n = positions.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let force = pair_repulsion(positions[i], positions[j], strength);
            velocities[i] -= force / masses[i] * dt;
            velocities[j] += force / masses[j] * dt;
        }
    }
}
