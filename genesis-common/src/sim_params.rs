use serde::{Deserialize, Serialize};
use crate::vecmath::{Axis, Vec2};

/// Axis-aligned rectangular domain the particles are confined to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl DomainBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Lower wall on `axis`.
    #[inline]
    pub fn lower(&self, axis: Axis) -> f64 {
        self.min.get(axis)
    }

    /// Upper wall on `axis`.
    #[inline]
    pub fn upper(&self, axis: Axis) -> f64 {
        self.max.get(axis)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Inclusive containment test; a particle resting on a wall is inside.
    pub fn contains(&self, point: Vec2) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| point.get(axis) >= self.lower(axis) && point.get(axis) <= self.upper(axis))
    }
}

impl Default for DomainBounds {
    fn default() -> Self {
        Self {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(10.0, 10.0),
        }
    }
}

/// Fully-resolved numeric parameters for one run of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // Physics
    pub gravity: f64, // Acceleration magnitude along -y
    pub elasticity: f64, // Coefficient of restitution at the walls, 0..=1
    pub repulsion_strength: f64, // 0 disables pairwise repulsion

    // Time
    pub dt: f64,
    pub step_count: u32,

    // World
    pub bounds: DomainBounds,
}

impl SimParams {
    /// Whether the pairwise repulsion pass runs at all.
    pub fn repulsion_enabled(&self) -> bool {
        self.repulsion_strength > 0.0
    }

    /// Simulated time covered by a complete run.
    pub fn total_time(&self) -> f64 {
        self.step_count as f64 * self.dt
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            elasticity: 0.9,
            repulsion_strength: 0.0,
            dt: 0.05,
            step_count: 100,
            bounds: DomainBounds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_domain_is_ten_by_ten() {
        let bounds = DomainBounds::default();
        assert_eq!(bounds.width(), 10.0);
        assert_eq!(bounds.height(), 10.0);
        assert_eq!(bounds.lower(Axis::X), 0.0);
        assert_eq!(bounds.upper(Axis::Y), 10.0);
    }

    #[test]
    fn containment_includes_the_walls() {
        let bounds = DomainBounds::default();
        assert!(bounds.contains(Vec2::new(0.0, 10.0)));
        assert!(bounds.contains(Vec2::new(5.0, 5.0)));
        assert!(!bounds.contains(Vec2::new(-0.001, 5.0)));
        assert!(!bounds.contains(Vec2::new(5.0, 10.001)));
    }

    #[test]
    fn repulsion_is_gated_on_positive_strength() {
        let mut params = SimParams::default();
        assert!(!params.repulsion_enabled());
        params.repulsion_strength = 0.5;
        assert!(params.repulsion_enabled());
        assert!((params.total_time() - 5.0).abs() < 1e-12);
    }
}
