//! One evaluator instance: a shared network plus a private accumulator.

use std::sync::Arc;

use super::accumulator::Accumulator;
use super::diff::FeatureDiff;
use super::encoder::ActiveFeatures;
use super::network::{Network, OUTPUTS};

/// A per-session evaluator.
///
/// The network is shared by reference across every instance; the accumulator
/// is private and tracks the instance's last-known active feature set. One
/// `refresh` followed by diff-consistent `update`s is numerically equivalent
/// to refreshing on the final set directly.
#[derive(Debug)]
pub struct Evaluator {
    net: Arc<Network>,
    acc: Accumulator,
    primed: bool,
}

impl Evaluator {
    /// Create an evaluator resting at the bias (no features active, not yet
    /// primed for incremental updates).
    pub fn new(net: Arc<Network>) -> Evaluator {
        let acc = Accumulator::from_bias(&net);
        Evaluator {
            net,
            acc,
            primed: false,
        }
    }

    /// Full recompute from an active feature set. O(|active|).
    pub fn refresh(&mut self, active: &ActiveFeatures) {
        self.acc.refresh(&self.net, active.as_slice());
        self.primed = true;
    }

    /// Apply an incremental update. O(|removed| + |added|).
    ///
    /// The diff must have been computed against this evaluator's last-known
    /// active set. Calling this before any [`refresh`](Evaluator::refresh)
    /// is a programming error and fails loudly.
    pub fn update(&mut self, diff: &FeatureDiff) {
        assert!(
            self.primed,
            "Evaluator::update called before the first refresh"
        );
        for &feature in &diff.removed {
            self.acc.remove_feature(&self.net, feature);
        }
        for &feature in &diff.added {
            self.acc.add_feature(&self.net, feature);
        }
    }

    /// Run the forward pass on the current accumulator.
    pub fn forward(&self) -> [f32; OUTPUTS] {
        self.net.forward(self.acc.values())
    }

    /// The accumulator's pre-activation values.
    #[inline]
    pub fn accumulator(&self) -> &[f32] {
        self.acc.values()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::diff::{diff, FeatureDiff};
    use super::super::encoder::ActiveFeatures;
    use super::super::network::Network;
    use super::Evaluator;

    fn net() -> Arc<Network> {
        Arc::new(
            Network::from_parts(
                4,
                2,
                2,
                vec![1.0, -1.0, 2.0, -2.0, 4.0, -4.0, 8.0, -8.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0, 0.0, 1.0],
                vec![0.0, 0.0],
                vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.5],
            )
            .unwrap(),
        )
    }

    fn set(indices: &[u32]) -> ActiveFeatures {
        ActiveFeatures::from_unsorted(indices.to_vec())
    }

    #[test]
    fn update_tracks_refresh() {
        let n = net();
        let first = set(&[0, 2]);
        let second = set(&[1, 2, 3]);

        let mut incremental = Evaluator::new(Arc::clone(&n));
        incremental.refresh(&first);
        incremental.update(&diff(&first, &second));

        let mut direct = Evaluator::new(n);
        direct.refresh(&second);

        for (a, b) in incremental
            .accumulator()
            .iter()
            .zip(direct.accumulator())
        {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_update_is_identity() {
        let n = net();
        let active = set(&[1, 3]);
        let mut eval = Evaluator::new(n);
        eval.refresh(&active);
        let before = eval.accumulator().to_vec();

        eval.update(&FeatureDiff::default());
        assert_eq!(eval.accumulator(), &before[..]);
    }

    #[test]
    fn zero_weights_forward_returns_output_bias() {
        let n = Arc::new(
            Network::from_parts(
                6,
                3,
                2,
                vec![0.0; 18],
                vec![0.0; 3],
                vec![0.0; 6],
                vec![0.0; 2],
                vec![0.0; 8],
                vec![0.5, -1.0, 0.25, 2.0],
            )
            .unwrap(),
        );
        let mut eval = Evaluator::new(n);
        eval.refresh(&set(&[]));
        assert_eq!(eval.forward(), [0.5, -1.0, 0.25, 2.0]);
    }

    #[test]
    #[should_panic(expected = "before the first refresh")]
    fn update_before_refresh_panics() {
        let mut eval = Evaluator::new(net());
        eval.update(&FeatureDiff {
            removed: Vec::new(),
            added: vec![0],
        });
    }
}
