//! Bounded pool of evaluator instances, one per live game session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::error;

use super::diff::diff;
use super::encoder::ActiveFeatures;
use super::evaluator::Evaluator;
use super::network::{Network, OUTPUTS};

/// Identifies one (game, snake) participation tracked turn-over-turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub game_id: String,
    pub snake_id: String,
}

impl SessionKey {
    /// Build a key from wire ids.
    pub fn new(game_id: impl Into<String>, snake_id: impl Into<String>) -> SessionKey {
        SessionKey {
            game_id: game_id.into(),
            snake_id: snake_id.into(),
        }
    }
}

/// Per-session evaluator state: the instance and its last-known active set.
///
/// The only way to mutate the accumulator is through [`Session::refresh`]
/// and [`Session::advance`], so an update can never be applied against a
/// diff computed from some other snapshot.
#[derive(Debug)]
pub struct Session {
    evaluator: Box<Evaluator>,
    features: ActiveFeatures,
}

impl Session {
    /// Reset to a freshly encoded snapshot (session start).
    pub fn refresh(&mut self, features: ActiveFeatures) {
        self.evaluator.refresh(&features);
        self.features = features;
    }

    /// Advance one turn: diff against the last-known set, update the
    /// accumulator incrementally, remember the new set.
    pub fn advance(&mut self, next: ActiveFeatures) {
        let d = diff(&self.features, &next);
        self.evaluator.update(&d);
        self.features = next;
    }

    /// Scores for the current snapshot.
    pub fn scores(&self) -> [f32; OUTPUTS] {
        self.evaluator.forward()
    }

    /// The last-known active feature set.
    pub fn features(&self) -> &ActiveFeatures {
        &self.features
    }
}

struct PoolInner {
    resident: HashMap<SessionKey, Arc<Mutex<Session>>>,
    recycled: Vec<Box<Evaluator>>,
}

/// Bounded pool of evaluators keyed by session.
///
/// `max_models` caps resident plus recycled instances, which in turn bounds
/// every evaluator allocation the process will ever make. The pool's own
/// lock covers only acquire/release/lookup bookkeeping; per-turn evaluation
/// runs under the individual session's lock, never the pool's.
pub struct ModelPool {
    net: Arc<Network>,
    max_models: usize,
    inner: Mutex<PoolInner>,
}

impl ModelPool {
    /// Create a pool sharing one network across at most `max_models`
    /// evaluators.
    pub fn new(net: Arc<Network>, max_models: usize) -> ModelPool {
        ModelPool {
            net,
            max_models,
            inner: Mutex::new(PoolInner {
                resident: HashMap::new(),
                recycled: Vec::new(),
            }),
        }
    }

    /// Register a session and hand it an evaluator.
    ///
    /// Reuses a recycled instance when one is available (its stale
    /// accumulator is harmless — the caller's next step is always a
    /// refresh), allocates while under the cap, and otherwise returns
    /// `None`: the capacity signal, not an error. The caller serves that
    /// session with the fallback picker instead. Acquiring a key that is
    /// already resident returns the existing session.
    pub fn acquire(&self, key: SessionKey) -> Option<Arc<Mutex<Session>>> {
        let mut inner = lock(&self.inner);

        if let Some(existing) = inner.resident.get(&key) {
            return Some(Arc::clone(existing));
        }

        let evaluator = match inner.recycled.pop() {
            Some(recycled) => recycled,
            None if inner.resident.len() + inner.recycled.len() < self.max_models => {
                Box::new(Evaluator::new(Arc::clone(&self.net)))
            }
            None => return None,
        };

        let session = Arc::new(Mutex::new(Session {
            evaluator,
            features: ActiveFeatures::default(),
        }));
        inner.resident.insert(key, Arc::clone(&session));
        Some(session)
    }

    /// Look up a resident session.
    pub fn session(&self, key: &SessionKey) -> Option<Arc<Mutex<Session>>> {
        lock(&self.inner).resident.get(key).map(Arc::clone)
    }

    /// Remove a session and recycle its evaluator. Releasing a key that is
    /// not resident is a no-op.
    pub fn release(&self, key: &SessionKey) {
        let mut inner = lock(&self.inner);
        let Some(entry) = inner.resident.remove(key) else {
            return;
        };
        match Arc::try_unwrap(entry) {
            Ok(session) => {
                let session = session.into_inner().unwrap_or_else(PoisonError::into_inner);
                inner.recycled.push(session.evaluator);
            }
            Err(_) => {
                // A turn still holds the session it released; the surrounding
                // protocol is supposed to serialize turns within a session.
                error!(game_id = %key.game_id, "released session still in use, dropping evaluator");
            }
        }
    }

    /// Number of sessions currently resident.
    pub fn resident_count(&self) -> usize {
        lock(&self.inner).resident.len()
    }

    /// Number of evaluators parked for reuse.
    pub fn recycled_count(&self) -> usize {
        lock(&self.inner).recycled.len()
    }

    /// The configured instance cap.
    #[inline]
    pub fn max_models(&self) -> usize {
        self.max_models
    }
}

impl std::fmt::Debug for ModelPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("ModelPool")
            .field("max_models", &self.max_models)
            .field("resident", &inner.resident.len())
            .field("recycled", &inner.recycled.len())
            .finish()
    }
}

/// Lock a mutex, continuing through poisoning: the protected state is a
/// plain map and list, both valid after any panic in a holder.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
