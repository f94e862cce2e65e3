use serde::{Deserialize, Serialize};

/// A snapshot of the particle state and metrics at a specific step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of completed steps when the snapshot was taken (0 = initial state).
    pub step: u32,
    /// The simulation time at which the snapshot was taken (`step * dt`).
    pub time: f64,
    /// Position of every particle, aligned by index with the initial particle set.
    pub positions: Vec<(f64, f64)>,
    /// Total kinetic energy, 1/2 * sum(m |v|^2).
    pub kinetic_energy: f64,
    /// Wall hits (particle, axis) resolved during the step that produced this snapshot.
    pub wall_collisions: u32,
}

/// The ordered snapshots of one complete run; snapshot 0 is the initial state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    snapshots: Vec<Snapshot>,
}

impl Trajectory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { snapshots: Vec::with_capacity(capacity) }
    }

    /// Appends a snapshot to the end of the history.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn initial(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Number of particles tracked by the run (taken from the initial snapshot).
    pub fn particle_count(&self) -> usize {
        self.initial().map_or(0, |s| s.positions.len())
    }

    /// Path of one particle across every snapshot, or `None` if `index` is out of range.
    pub fn particle_path(&self, index: usize) -> Option<Vec<(f64, f64)>> {
        if index >= self.particle_count() {
            return None;
        }
        self.snapshots
            .iter()
            .map(|s| s.positions.get(index).copied())
            .collect()
    }

    /// Positions in the last snapshot (empty for an empty trajectory).
    pub fn final_positions(&self) -> &[(f64, f64)] {
        match self.last() {
            Some(snapshot) => &snapshot.positions,
            None => &[],
        }
    }

    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

impl From<Vec<Snapshot>> for Trajectory {
    fn from(snapshots: Vec<Snapshot>) -> Self {
        Self { snapshots }
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(step: u32, positions: Vec<(f64, f64)>) -> Snapshot {
        Snapshot {
            step,
            time: step as f64 * 0.1,
            positions,
            kinetic_energy: 0.0,
            wall_collisions: 0,
        }
    }

    fn sample() -> Trajectory {
        Trajectory::from(vec![
            snapshot(0, vec![(1.0, 1.0), (9.0, 9.0)]),
            snapshot(1, vec![(1.5, 1.2), (8.5, 8.8)]),
            snapshot(2, vec![(2.0, 1.3), (8.0, 8.5)]),
        ])
    }

    #[test]
    fn particle_path_follows_one_index() {
        let trajectory = sample();
        assert_eq!(trajectory.particle_count(), 2);
        assert_eq!(
            trajectory.particle_path(1),
            Some(vec![(9.0, 9.0), (8.5, 8.8), (8.0, 8.5)])
        );
        assert_eq!(trajectory.particle_path(2), None);
    }

    #[test]
    fn final_positions_come_from_last_snapshot() {
        let trajectory = sample();
        assert_eq!(trajectory.final_positions(), &[(2.0, 1.3), (8.0, 8.5)]);
        assert!(Trajectory::default().final_positions().is_empty());
    }

    #[test]
    fn push_appends_in_order() {
        let mut trajectory = Trajectory::with_capacity(2);
        assert!(trajectory.is_empty());
        trajectory.push(snapshot(0, vec![(0.0, 0.0)]));
        trajectory.push(snapshot(1, vec![(0.5, 0.0)]));
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.initial().map(|s| s.step), Some(0));
        let steps: Vec<u32> = trajectory.into_snapshots().into_iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 1]);
    }
}
