//! Named results returned by the step engine.

use lf_graph::{NetworkIndex, VarKind};
use nalgebra::DVector;
use std::collections::BTreeMap;

/// State and output values at one element boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub time: f64,
    pub states: BTreeMap<String, f64>,
    pub outputs: BTreeMap<String, f64>,
}

impl Snapshot {
    pub(crate) fn new(
        time: f64,
        index: &NetworkIndex,
        states: &DVector<f64>,
        outputs: &DVector<f64>,
    ) -> Self {
        let collect = |kind: VarKind, values: &DVector<f64>| -> BTreeMap<String, f64> {
            index
                .named(kind, values.as_slice())
                .map(|(name, v)| (name.to_string(), v))
                .collect()
        };
        Self {
            time,
            states: collect(VarKind::State, states),
            outputs: collect(VarKind::Output, outputs),
        }
    }

    /// A state or output by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.states
            .get(name)
            .or_else(|| self.outputs.get(name))
            .copied()
    }
}

/// Time series of snapshots, one column of values per variable name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    pub time: Vec<f64>,
    pub states: BTreeMap<String, Vec<f64>>,
    pub outputs: BTreeMap<String, Vec<f64>>,
}

impl Trajectory {
    pub fn push(&mut self, snapshot: &Snapshot) {
        self.time.push(snapshot.time);
        for (name, v) in &snapshot.states {
            self.states.entry(name.clone()).or_default().push(*v);
        }
        for (name, v) in &snapshot.outputs {
            self.outputs.entry(name.clone()).or_default().push(*v);
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Values of a state or output by name.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.states
            .get(name)
            .or_else(|| self.outputs.get(name))
            .map(Vec::as_slice)
    }

    pub fn last_time(&self) -> Option<f64> {
        self.time.last().copied()
    }
}

impl Extend<Snapshot> for Trajectory {
    fn extend<T: IntoIterator<Item = Snapshot>>(&mut self, iter: T) {
        for snapshot in iter {
            self.push(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_graph::BlockLayout;

    #[test]
    fn trajectory_accumulates_by_name() {
        let layouts = [BlockLayout::new(["V1"], ["h1", "Q1"])];
        let index = NetworkIndex::from_layouts(&layouts).unwrap();

        let a = Snapshot::new(
            0.0,
            &index,
            &DVector::from_vec(vec![8.0]),
            &DVector::from_vec(vec![4.0, 0.5]),
        );
        let b = Snapshot::new(
            1.0,
            &index,
            &DVector::from_vec(vec![7.5]),
            &DVector::from_vec(vec![3.75, 0.48]),
        );
        assert_eq!(a.get("h1"), Some(4.0));
        assert_eq!(a.get("V1"), Some(8.0));
        assert_eq!(a.get("x"), None);

        let mut traj = Trajectory::default();
        traj.extend([a, b]);
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.time, vec![0.0, 1.0]);
        assert_eq!(traj.get("V1"), Some(&[8.0, 7.5][..]));
        assert_eq!(traj.get("Q1"), Some(&[0.5, 0.48][..]));
        assert_eq!(traj.last_time(), Some(1.0));
    }
}
