pub mod config;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, UniverseConfig, TimingConfig, PhysicsConfig, InitialConditions, InitialSource, OutputConfig};
pub use sim_params::{DomainBounds, SimParams};
pub use snapshot::{Snapshot, Trajectory};
pub use vecmath::{Axis, Vec2, clamp};
