use crate::state::ParticleState;

/// Drift: advance every position by one step using the already-kicked velocities,
/// `x_n+1 = x_n + v_n+1 * dt` (semi-implicit Euler).
pub fn integrate_positions(state: &mut ParticleState, dt: f64) {
    let (positions, velocities, _) = state.parts_mut();
    for (x, v) in positions.iter_mut().zip(velocities.iter()) {
        *x += *v * dt;
    }
}
