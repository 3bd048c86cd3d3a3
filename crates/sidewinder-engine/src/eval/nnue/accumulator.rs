//! First-hidden-layer accumulator maintained incrementally across turns.

use super::network::Network;

/// The running first-layer pre-activation.
///
/// Always equal to `ft_bias + sum of weight columns for the active feature
/// set it was last refreshed or updated to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    vals: Vec<f32>,
}

impl Accumulator {
    /// Start from the bias alone (the empty active set).
    pub fn from_bias(net: &Network) -> Accumulator {
        Accumulator {
            vals: net.ft_bias().to_vec(),
        }
    }

    /// Full recompute: bias plus every active feature's column.
    pub fn refresh(&mut self, net: &Network, active: &[u32]) {
        self.vals.copy_from_slice(net.ft_bias());
        for &feature in active {
            self.add_feature(net, feature);
        }
    }

    /// Incrementally add one feature's column.
    #[inline]
    pub fn add_feature(&mut self, net: &Network, feature: u32) {
        for (v, &w) in self.vals.iter_mut().zip(net.column(feature)) {
            *v += w;
        }
    }

    /// Incrementally remove one feature's column.
    #[inline]
    pub fn remove_feature(&mut self, net: &Network, feature: u32) {
        for (v, &w) in self.vals.iter_mut().zip(net.column(feature)) {
            *v -= w;
        }
    }

    /// The pre-activation values.
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.vals
    }
}
