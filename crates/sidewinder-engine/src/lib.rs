//! Evaluation engine for sidewinder: the efficiently updatable neural
//! evaluator, its session pool, and the flood-fill fallback.

pub mod eval;

pub use eval::heuristic::{fallback_move, open_space};
pub use eval::nnue::{
    diff, encode, ActiveFeatures, BodyPiece, DomainError, Evaluator, FeatureDiff, FeatureIndexer,
    FeatureKey, FeatureKind, FeatureSchema, ModelPool, Network, Role, Session, SessionKey,
    WeightsError, HEALTH_BUCKETS, OUTPUTS,
};
pub use eval::{rank_moves, select_move, Engine};
