//! Move evaluation: the neural path, the heuristic fallback, and the
//! per-session orchestration between them.

pub mod heuristic;
pub mod nnue;

use std::sync::Arc;

use tracing::{debug, warn};

use sidewinder_core::{Board, GameMode, Move};

use self::nnue::{
    encode, FeatureIndexer, FeatureSchema, ModelPool, Network, SessionKey, WeightsError, OUTPUTS,
};

/// Order the four moves by descending score. Stable on ties, so equal
/// scores fall back to the fixed left/right/down/up order.
pub fn rank_moves(scores: [f32; OUTPUTS]) -> [Move; OUTPUTS] {
    let mut ranked = Move::ALL;
    ranked.sort_by(|a, b| scores[b.index()].total_cmp(&scores[a.index()]));
    ranked
}

/// The move-selection policy: best-scoring move that is also legal.
pub fn select_move(scores: [f32; OUTPUTS], legal: &[Move]) -> Option<Move> {
    rank_moves(scores).into_iter().find(|mv| legal.contains(mv))
}

/// The evaluation engine: feature schema, shared network, and session pool.
///
/// Construction fails if the bundle's feature dimension does not match the
/// schema; a process must not serve with weights indexed differently than
/// they were trained. Without a network the engine degrades to
/// heuristic-only service: every session reports the evaluator unavailable.
pub struct Engine {
    indexer: FeatureIndexer,
    pool: Option<ModelPool>,
}

impl Engine {
    /// Build an engine over a schema, optionally backed by a weight bundle.
    pub fn new(
        schema: &FeatureSchema,
        net: Option<Arc<Network>>,
        max_models: usize,
    ) -> Result<Engine, WeightsError> {
        let indexer = FeatureIndexer::build(schema);

        let pool = match net {
            Some(net) => {
                if net.feature_count() != indexer.feature_count() {
                    return Err(WeightsError::FeatureCountMismatch {
                        schema: indexer.feature_count(),
                        bundle: net.feature_count(),
                    });
                }
                Some(ModelPool::new(net, max_models))
            }
            None => None,
        };

        Ok(Engine { indexer, pool })
    }

    /// Whether any neural evaluation is possible at all.
    #[inline]
    pub fn has_network(&self) -> bool {
        self.pool.is_some()
    }

    /// The feature indexer the engine was built over.
    #[inline]
    pub fn indexer(&self) -> &FeatureIndexer {
        &self.indexer
    }

    /// Begin tracking a session, refreshing an evaluator from the initial
    /// snapshot. Returns false when the session cannot use the neural path:
    /// no network, game outside the schema, or pool exhausted. Such sessions
    /// are simply served by the fallback picker every turn.
    pub fn start_session(
        &self,
        key: SessionKey,
        mode: GameMode,
        board: &Board,
        viewer_id: &str,
    ) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };

        let features = match encode(&self.indexer, mode, board, viewer_id) {
            Ok(features) => features,
            Err(e) => {
                debug!(game_id = %key.game_id, error = %e, "game outside evaluator domain");
                return false;
            }
        };

        let Some(session) = pool.acquire(key.clone()) else {
            warn!(game_id = %key.game_id, "model pool exhausted, serving heuristic-only");
            return false;
        };

        lock_session(&session).refresh(features);
        true
    }

    /// Score the current turn for a tracked session.
    ///
    /// Encodes the new snapshot, applies the incremental update against the
    /// session's last-known set, and returns the four move scores. `None`
    /// means the session has no evaluator (never started, or out of domain)
    /// and the caller should fall back.
    pub fn rank(
        &self,
        key: &SessionKey,
        mode: GameMode,
        board: &Board,
        viewer_id: &str,
    ) -> Option<[f32; OUTPUTS]> {
        let pool = self.pool.as_ref()?;
        let session = pool.session(key)?;

        let next = match encode(&self.indexer, mode, board, viewer_id) {
            Ok(features) => features,
            Err(e) => {
                debug!(game_id = %key.game_id, error = %e, "turn outside evaluator domain");
                return None;
            }
        };

        let mut session = lock_session(&session);
        session.advance(next);
        Some(session.scores())
    }

    /// Stop tracking a session, recycling its evaluator.
    pub fn end_session(&self, key: &SessionKey) {
        if let Some(pool) = &self.pool {
            pool.release(key);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("features", &self.indexer.feature_count())
            .field("pool", &self.pool)
            .finish()
    }
}

/// Lock a session, continuing through poisoning; the session state stays
/// structurally valid after any panic in a holder.
fn lock_session(
    session: &std::sync::Mutex<nnue::Session>,
) -> std::sync::MutexGuard<'_, nnue::Session> {
    session
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
