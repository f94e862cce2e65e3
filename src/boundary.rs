use crate::state::ParticleState;
use genesis_common::{clamp, Axis, DomainBounds};

/// Resolves wall crossings after the position update.
///
/// Each axis is handled independently: a coordinate outside `[lower, upper]` has its
/// velocity component scaled by `-elasticity` and is snapped back onto the wall (the
/// overshoot is discarded, not mirrored). A corner hit therefore reflects both axes.
/// A NaN coordinate counts as outside and is snapped to the lower wall.
/// Only the end-of-step position is tested, so a particle fast enough to cross the whole
/// domain in one step is not caught mid-flight.
///
/// Returns the number of (particle, axis) wall hits resolved.
pub fn resolve_boundaries(state: &mut ParticleState, bounds: &DomainBounds, elasticity: f64) -> u32 {
    let (positions, velocities, _) = state.parts_mut();
    let mut hits = 0;
    for (x, v) in positions.iter_mut().zip(velocities.iter_mut()) {
        for axis in Axis::ALL {
            let lower = bounds.lower(axis);
            let upper = bounds.upper(axis);
            let coord = x.get(axis);
            if !(lower..=upper).contains(&coord) {
                *v.get_mut(axis) *= -elasticity;
                *x.get_mut(axis) = clamp(coord, lower, upper);
                hits += 1;
            }
        }
    }
    hits
}
