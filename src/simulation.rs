use crate::boundary::resolve_boundaries;
use crate::error::{EngineError, Result};
use crate::forces;
use crate::integrator::integrate_positions;
use crate::state::ParticleState;
use genesis_common::{SimParams, Snapshot, Trajectory};
use log::{debug, info, trace, warn};

/// Checks every parameter against its documented domain before a run starts.
pub fn validate_params(params: &SimParams) -> Result<()> {
    let invalid = |msg: String| Err(EngineError::InvalidConfiguration(msg));

    if !params.gravity.is_finite() || params.gravity < 0.0 {
        return invalid(format!("gravity must be finite and >= 0 (got {})", params.gravity));
    }
    if !(0.0..=1.0).contains(&params.elasticity) {
        return invalid(format!("elasticity must lie in [0, 1] (got {})", params.elasticity));
    }
    if !params.repulsion_strength.is_finite() || params.repulsion_strength < 0.0 {
        return invalid(format!(
            "repulsion_strength must be finite and >= 0 (got {})",
            params.repulsion_strength
        ));
    }
    if !params.dt.is_finite() || params.dt <= 0.0 {
        return invalid(format!("time step must be finite and > 0 (got {})", params.dt));
    }
    if params.step_count == 0 {
        return invalid("step_count must be at least 1".to_string());
    }
    let bounds = &params.bounds;
    if !bounds.min.is_finite() || !bounds.max.is_finite() {
        return invalid("domain bounds must be finite".to_string());
    }
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return invalid(format!(
            "domain bounds must have min < max on both axes (got {:?} .. {:?})",
            bounds.min, bounds.max
        ));
    }
    Ok(())
}

/// Drives one run: owns the particle buffer and the growing trajectory.
///
/// Each call to [`Simulation::step`] applies gravity, repulsion, position integration and
/// wall collisions in that order, then appends a snapshot. The initial state is recorded as
/// snapshot 0 on construction, so a finished run holds `step_count + 1` snapshots.
#[derive(Debug)]
pub struct Simulation {
    params: SimParams,
    state: ParticleState,
    current_step: u32,
    trajectory: Trajectory,
}

impl Simulation {
    /// Validates the parameters and records the initial snapshot.
    pub fn new(initial: ParticleState, params: SimParams) -> Result<Self> {
        validate_params(&params)?;

        let max_displacement = initial.max_speed() * params.dt;
        let smallest_side = params.bounds.width().min(params.bounds.height());
        if max_displacement > smallest_side {
            warn!(
                "Initial step displacement {:.3} exceeds the domain size {:.3}; particles may skip past walls.",
                max_displacement, smallest_side
            );
        }

        let mut sim = Self {
            trajectory: Trajectory::with_capacity(params.step_count as usize + 1),
            params,
            state: initial,
            current_step: 0,
        };
        sim.record_snapshot(0);
        Ok(sim)
    }

    /// Advances the run by one time step and records the result.
    /// Returns `false` without doing anything once all steps have run.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }

        // --- 1. Forces (velocity kick) ---
        forces::accumulate(&mut self.state, &self.params);

        // --- 2. Drift ---
        integrate_positions(&mut self.state, self.params.dt);

        // --- 3. Walls ---
        let wall_collisions = resolve_boundaries(&mut self.state, &self.params.bounds, self.params.elasticity);

        self.current_step += 1;
        self.record_snapshot(wall_collisions);

        trace!(
            "Step [{}/{}] | wall hits: {}",
            self.current_step,
            self.params.step_count,
            wall_collisions
        );
        true
    }

    /// Appends an independent copy of the current positions to the trajectory.
    fn record_snapshot(&mut self, wall_collisions: u32) {
        let snapshot = Snapshot {
            step: self.current_step,
            time: self.current_step as f64 * self.params.dt,
            positions: self.state.position_pairs(),
            kinetic_energy: self.state.kinetic_energy(),
            wall_collisions,
        };
        self.trajectory.push(snapshot);
    }

    /// Runs every remaining step and hands back the trajectory.
    pub fn run(mut self) -> Trajectory {
        while self.step() {}
        self.trajectory
    }

    pub fn is_finished(&self) -> bool {
        self.current_step >= self.params.step_count
    }

    /// Number of steps executed so far.
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    /// Provides access to the simulation parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Snapshots recorded so far (at least the initial one).
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }
}

/// Runs a complete simulation and returns `step_count + 1` snapshots.
///
/// Fails before any step executes if the parameters are invalid.
pub fn run_simulation(initial: ParticleState, params: SimParams) -> Result<Trajectory> {
    run_simulation_with_abort(initial, params, |_| false)
}

/// Like [`run_simulation`], but asks `should_abort` before every step (with the number of
/// steps completed so far). Returning `true` stops the run with [`EngineError::Aborted`].
pub fn run_simulation_with_abort<F>(initial: ParticleState, params: SimParams, mut should_abort: F) -> Result<Trajectory>
where
    F: FnMut(u32) -> bool,
{
    let mut sim = Simulation::new(initial, params)?;
    info!(
        "Running {} steps for {} particles (dt = {}, repulsion {}).",
        sim.params.step_count,
        sim.state.len(),
        sim.params.dt,
        if sim.params.repulsion_enabled() { "on" } else { "off" }
    );
    debug!("Simulation Parameters: {:#?}", sim.params);

    while !sim.is_finished() {
        if should_abort(sim.current_step) {
            info!("Run aborted by caller after {} steps.", sim.current_step);
            return Err(EngineError::Aborted { completed_steps: sim.current_step });
        }
        sim.step();
    }

    let trajectory = sim.trajectory;
    if let Some(last) = trajectory.last() {
        debug!(
            "Final snapshot: t = {:.3}, kinetic energy = {:.6}",
            last.time, last.kinetic_energy
        );
    }
    info!("Simulation finished with {} snapshots.", trajectory.len());
    Ok(trajectory)
}
