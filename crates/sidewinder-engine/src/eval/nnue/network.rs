//! Network weights: the shared, read-only weight bundle and forward pass.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use sidewinder_core::Move;

/// Number of output scores, one per directional move.
pub const OUTPUTS: usize = Move::COUNT;

/// Errors loading or validating a weight bundle.
#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    /// The bundle file could not be read.
    #[error("failed to read weight bundle: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
    /// The bundle is not valid JSON or is missing a named array.
    #[error("malformed weight bundle: {source}")]
    Malformed {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },
    /// A dimension is zero.
    #[error("dimension {dim} must be at least 1")]
    EmptyDimension {
        /// The offending dimension name.
        dim: &'static str,
    },
    /// A named array's length does not match its declared shape.
    #[error("array {array} has {found} entries, shape requires {expected}")]
    ShapeMismatch {
        /// The offending array name.
        array: &'static str,
        /// Entries implied by the declared dimensions.
        expected: usize,
        /// Entries actually present.
        found: usize,
    },
    /// The bundle's feature dimension does not match the feature schema the
    /// process was built with.
    #[error("bundle has {bundle} input features, schema indexes {schema}")]
    FeatureCountMismatch {
        /// Features in the process schema.
        schema: usize,
        /// Features in the bundle.
        bundle: usize,
    },
}

/// On-disk representation: explicit dimensions plus six flat arrays.
#[derive(Debug, Deserialize)]
struct RawNetwork {
    features: usize,
    hidden: usize,
    hidden2: usize,
    ft_weight: Vec<f32>,
    ft_bias: Vec<f32>,
    l1_weight: Vec<f32>,
    l1_bias: Vec<f32>,
    l2_weight: Vec<f32>,
    l2_bias: Vec<f32>,
}

/// The trained network: one shared, immutable bundle per process.
///
/// Layout:
/// - `ft_weight`: feature-major `features x hidden` — the column for feature
///   `f` is the contiguous slice `[f * hidden, (f + 1) * hidden)`, so the
///   accumulator adds and removes features with a single slice walk.
/// - `l1_weight`: row-major `hidden2 x hidden`.
/// - `l2_weight`: row-major `OUTPUTS x hidden2`.
///
/// Every shape is checked eagerly at load; serving must never start on a
/// partially loaded bundle.
#[derive(Debug)]
pub struct Network {
    features: usize,
    hidden: usize,
    hidden2: usize,
    ft_weight: Vec<f32>,
    ft_bias: Vec<f32>,
    l1_weight: Vec<f32>,
    l1_bias: Vec<f32>,
    l2_weight: Vec<f32>,
    l2_bias: Vec<f32>,
}

impl Network {
    /// Validate raw arrays into a usable network.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        features: usize,
        hidden: usize,
        hidden2: usize,
        ft_weight: Vec<f32>,
        ft_bias: Vec<f32>,
        l1_weight: Vec<f32>,
        l1_bias: Vec<f32>,
        l2_weight: Vec<f32>,
        l2_bias: Vec<f32>,
    ) -> Result<Network, WeightsError> {
        for (dim, value) in [
            ("features", features),
            ("hidden", hidden),
            ("hidden2", hidden2),
        ] {
            if value == 0 {
                return Err(WeightsError::EmptyDimension { dim });
            }
        }

        let checks = [
            ("ft_weight", ft_weight.len(), features * hidden),
            ("ft_bias", ft_bias.len(), hidden),
            ("l1_weight", l1_weight.len(), hidden2 * hidden),
            ("l1_bias", l1_bias.len(), hidden2),
            ("l2_weight", l2_weight.len(), OUTPUTS * hidden2),
            ("l2_bias", l2_bias.len(), OUTPUTS),
        ];
        for (array, found, expected) in checks {
            if found != expected {
                return Err(WeightsError::ShapeMismatch {
                    array,
                    expected,
                    found,
                });
            }
        }

        Ok(Network {
            features,
            hidden,
            hidden2,
            ft_weight,
            ft_bias,
            l1_weight,
            l1_bias,
            l2_weight,
            l2_bias,
        })
    }

    /// Load and validate a JSON weight bundle from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Network, WeightsError> {
        let raw: RawNetwork = serde_json::from_reader(reader)?;
        Network::from_parts(
            raw.features,
            raw.hidden,
            raw.hidden2,
            raw.ft_weight,
            raw.ft_bias,
            raw.l1_weight,
            raw.l1_bias,
            raw.l2_weight,
            raw.l2_bias,
        )
    }

    /// Load and validate a JSON weight bundle from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Network, WeightsError> {
        let file = File::open(path)?;
        Network::from_reader(BufReader::new(file))
    }

    /// Number of input features the bundle was trained on.
    #[inline]
    pub fn feature_count(&self) -> usize {
        self.features
    }

    /// First hidden layer width.
    #[inline]
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    /// The first-layer bias vector, the accumulator's resting state.
    #[inline]
    pub fn ft_bias(&self) -> &[f32] {
        &self.ft_bias
    }

    /// The first-layer weight column for one feature.
    #[inline]
    pub fn column(&self, feature: u32) -> &[f32] {
        let start = feature as usize * self.hidden;
        &self.ft_weight[start..start + self.hidden]
    }

    /// Forward pass from a first-layer pre-activation to move scores.
    ///
    /// ReLU over the accumulator, affine + ReLU into the second hidden
    /// layer, final affine to one score per move in [`Move::ALL`] order.
    pub fn forward(&self, accumulator: &[f32]) -> [f32; OUTPUTS] {
        debug_assert_eq!(accumulator.len(), self.hidden);

        let mut h2 = self.l1_bias.clone();
        for (j, out) in h2.iter_mut().enumerate() {
            let row = &self.l1_weight[j * self.hidden..(j + 1) * self.hidden];
            for (&w, &x) in row.iter().zip(accumulator) {
                *out += w * relu(x);
            }
        }

        let mut scores = [0.0f32; OUTPUTS];
        for (k, score) in scores.iter_mut().enumerate() {
            let row = &self.l2_weight[k * self.hidden2..(k + 1) * self.hidden2];
            let mut acc = self.l2_bias[k];
            for (&w, &x) in row.iter().zip(&h2) {
                acc += w * relu(x);
            }
            *score = acc;
        }
        scores
    }
}

/// Rectified linear activation.
#[inline]
fn relu(x: f32) -> f32 {
    x.max(0.0)
}
