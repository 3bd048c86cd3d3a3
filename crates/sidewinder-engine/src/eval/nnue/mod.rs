//! Efficiently updatable neural evaluation.
//!
//! A board snapshot activates a sparse set of input features; from one turn
//! to the next only a handful of them change. The accumulator keeps the
//! first hidden layer's pre-activation in sync by applying the set
//! difference instead of re-encoding the world, so per-turn cost follows the
//! size of the change, not the size of the network input.

mod accumulator;
mod diff;
mod encoder;
mod evaluator;
mod network;
mod pool;
mod schema;

pub use diff::{diff, FeatureDiff};
pub use encoder::{encode, ActiveFeatures};
pub use evaluator::Evaluator;
pub use network::{Network, WeightsError, OUTPUTS};
pub use pool::{ModelPool, Session, SessionKey};
pub use schema::{
    BodyPiece, DomainError, FeatureIndexer, FeatureKey, FeatureKind, FeatureSchema, Role,
    HEALTH_BUCKETS,
};
