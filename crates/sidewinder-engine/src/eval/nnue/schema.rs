//! Feature schema and index mapping for the evaluator input layer.
//!
//! Every feature the network can see is a structured key: which game mode
//! and board size the game is played at, a cell, and what occupies it. The
//! indexer interns those keys into dense integers with a fixed, documented
//! layout so the trained weight columns line up turn after turn. The layout
//! must never change for a given schema: the weights were trained against
//! one fixed ordering, and reordering silently corrupts inference.
//!
//! Layout, in index order:
//! - one block per (mode, size) pair, modes and sizes in schema order
//!   (sizes vary fastest);
//! - within a block, cells in `y * size + x` order;
//! - within a cell: food, hazard, then per role (own, squad-mate for squad
//!   modes only, other): 100 health-bucketed head features followed by the
//!   five body pieces (left, right, down, up, stacked).

use sidewinder_core::{Coord, GameMode};

/// Number of health buckets per head feature group.
pub const HEALTH_BUCKETS: u32 = 100;

/// Viewer-relative classification of a snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Role {
    /// The viewer's own snake.
    Own = 0,
    /// Same squad as the viewer; only exists for squad-capable modes.
    Squadmate = 1,
    /// Any other snake.
    Other = 2,
}

impl Role {
    /// All roles in schema order.
    pub const ALL: [Role; 3] = [Role::Own, Role::Squadmate, Role::Other];
}

/// Which of the five body-piece features a non-head segment activates.
///
/// Named for where the segment sits relative to its predecessor (the
/// neighbor nearer the head): a snake whose head is left of its neck has a
/// `Right` neck. `Stacked` covers segments sharing their predecessor's cell,
/// which happens on spawn turns and under rulesets that grow in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyPiece {
    Left = 0,
    Right = 1,
    Down = 2,
    Up = 3,
    Stacked = 4,
}

impl BodyPiece {
    /// Total number of body pieces.
    pub const COUNT: usize = 5;

    /// All pieces in schema order.
    pub const ALL: [BodyPiece; 5] = [
        BodyPiece::Left,
        BodyPiece::Right,
        BodyPiece::Down,
        BodyPiece::Up,
        BodyPiece::Stacked,
    ];

    /// Return the index (0..4).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Features contributed by one role at one cell: health buckets + pieces.
const ROLE_FEATURES: u32 = HEALTH_BUCKETS + BodyPiece::COUNT as u32;

/// Fixed per-cell offsets for the non-role features.
const FOOD_OFFSET: u32 = 0;
const HAZARD_OFFSET: u32 = 1;
const ROLES_OFFSET: u32 = 2;

/// What occupies a cell, the variable part of a [`FeatureKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// A food cell.
    Food { at: Coord },
    /// A hazard cell.
    Hazard { at: Coord },
    /// A snake head, bucketed by health in [1, 100].
    Head { at: Coord, role: Role, health: i32 },
    /// A non-head body segment.
    Body { at: Coord, role: Role, piece: BodyPiece },
}

/// A fully qualified feature key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureKey {
    pub mode: GameMode,
    pub size: i32,
    pub kind: FeatureKind,
}

/// A key outside the enumerated feature domain.
///
/// Sessions that hit this must not use the evaluator path; the caller falls
/// back to the heuristic move picker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// The (mode, size) pair is not part of the schema.
    #[error("no feature block for {mode} games on a {size}x{size} board")]
    UnsupportedGame {
        /// Requested game mode.
        mode: GameMode,
        /// Requested board size.
        size: i32,
    },
    /// The board is not square; every supported ruleset plays on squares.
    #[error("board is {width}x{height}, only square boards are supported")]
    NonSquareBoard {
        /// Board width.
        width: i32,
        /// Board height.
        height: i32,
    },
    /// The squad-mate role was requested for a mode without squads.
    #[error("role squad-mate does not exist for {mode} games")]
    UnsupportedRole {
        /// The mode lacking the role.
        mode: GameMode,
    },
    /// The cell lies outside the block's board.
    #[error("cell {x},{y} is outside a {size}x{size} board")]
    CellOutOfRange {
        /// Cell x.
        x: i32,
        /// Cell y.
        y: i32,
        /// Block board size.
        size: i32,
    },
    /// The health value has no bucket.
    #[error("health {health} is outside [1, 100]")]
    HealthOutOfRange {
        /// The offending health value.
        health: i32,
    },
}

/// The enumerated (mode x size) domain the indexer is built over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    modes: Vec<GameMode>,
    sizes: Vec<i32>,
}

impl FeatureSchema {
    /// Build a schema over the given modes and board sizes.
    ///
    /// Entries must be distinct; order fixes the index layout.
    pub fn new(modes: Vec<GameMode>, sizes: Vec<i32>) -> FeatureSchema {
        debug_assert!(!modes.is_empty() && !sizes.is_empty());
        FeatureSchema { modes, sizes }
    }

    /// The production schema: every ruleset at the three official board
    /// sizes.
    pub fn standard() -> FeatureSchema {
        FeatureSchema::new(GameMode::ALL.to_vec(), vec![7, 11, 19])
    }

    /// Modes in schema order.
    pub fn modes(&self) -> &[GameMode] {
        &self.modes
    }

    /// Sizes in schema order.
    pub fn sizes(&self) -> &[i32] {
        &self.sizes
    }
}

/// One (mode, size) block of the index space.
///
/// The encoder fetches a block once per board and computes every feature
/// index arithmetically from it; nothing is hashed per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    mode: GameMode,
    size: i32,
    base: u32,
    roles: u32,
}

impl Block {
    /// The game mode this block indexes.
    #[inline]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// The board size this block indexes.
    #[inline]
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Features per cell: food + hazard + per-role groups.
    #[inline]
    fn per_cell(&self) -> u32 {
        ROLES_OFFSET + self.roles * ROLE_FEATURES
    }

    /// Total features in this block.
    #[inline]
    fn len(&self) -> u32 {
        (self.size * self.size) as u32 * self.per_cell()
    }

    #[inline]
    fn cell_base(&self, at: Coord) -> u32 {
        debug_assert!(at.in_bounds(self.size, self.size));
        self.base + (at.y * self.size + at.x) as u32 * self.per_cell()
    }

    /// Index slot of a role within this block, if the role exists here.
    #[inline]
    fn role_slot(&self, role: Role) -> Option<u32> {
        match role {
            Role::Own => Some(0),
            Role::Squadmate => (self.roles == 3).then_some(1),
            Role::Other => Some(self.roles - 1),
        }
    }

    /// Food feature index for a cell.
    #[inline]
    pub fn food(&self, at: Coord) -> u32 {
        self.cell_base(at) + FOOD_OFFSET
    }

    /// Hazard feature index for a cell.
    #[inline]
    pub fn hazard(&self, at: Coord) -> u32 {
        self.cell_base(at) + HAZARD_OFFSET
    }

    /// Head feature index for a cell, role, and clamped health in [1, 100].
    #[inline]
    pub fn head(&self, at: Coord, role: Role, health: i32) -> u32 {
        debug_assert!((1..=HEALTH_BUCKETS as i32).contains(&health));
        let slot = self.role_slot(role).expect("role not in block");
        self.cell_base(at) + ROLES_OFFSET + slot * ROLE_FEATURES + (health - 1) as u32
    }

    /// Body-piece feature index for a cell, role, and piece.
    #[inline]
    pub fn body(&self, at: Coord, role: Role, piece: BodyPiece) -> u32 {
        let slot = self.role_slot(role).expect("role not in block");
        self.cell_base(at) + ROLES_OFFSET + slot * ROLE_FEATURES + HEALTH_BUCKETS + piece.index() as u32
    }
}

/// The total, injective mapping from feature keys to dense indices.
#[derive(Debug, Clone)]
pub struct FeatureIndexer {
    blocks: Vec<Block>,
    feature_count: usize,
}

impl FeatureIndexer {
    /// Enumerate the schema into index blocks.
    pub fn build(schema: &FeatureSchema) -> FeatureIndexer {
        let mut blocks = Vec::with_capacity(schema.modes().len() * schema.sizes().len());
        let mut base = 0u32;

        for &mode in schema.modes() {
            let roles = if mode.supports_squads() { 3 } else { 2 };
            for &size in schema.sizes() {
                let block = Block {
                    mode,
                    size,
                    base,
                    roles,
                };
                base += block.len();
                blocks.push(block);
            }
        }

        FeatureIndexer {
            blocks,
            feature_count: base as usize,
        }
    }

    /// Total number of indexable features; the weight bundle's feature
    /// dimension must equal this.
    #[inline]
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// The index block for a (mode, size) pair.
    pub fn block(&self, mode: GameMode, size: i32) -> Result<&Block, DomainError> {
        self.blocks
            .iter()
            .find(|b| b.mode == mode && b.size == size)
            .ok_or(DomainError::UnsupportedGame { mode, size })
    }

    /// Resolve a fully qualified key, validating every component.
    ///
    /// The encoder bypasses this in favor of per-block arithmetic; lookup
    /// exists for callers holding a single structured key.
    pub fn lookup(&self, key: &FeatureKey) -> Result<u32, DomainError> {
        let block = self.block(key.mode, key.size)?;

        let at = match key.kind {
            FeatureKind::Food { at }
            | FeatureKind::Hazard { at }
            | FeatureKind::Head { at, .. }
            | FeatureKind::Body { at, .. } => at,
        };
        if !at.in_bounds(block.size, block.size) {
            return Err(DomainError::CellOutOfRange {
                x: at.x,
                y: at.y,
                size: block.size,
            });
        }

        match key.kind {
            FeatureKind::Food { at } => Ok(block.food(at)),
            FeatureKind::Hazard { at } => Ok(block.hazard(at)),
            FeatureKind::Head { at, role, health } => {
                if block.role_slot(role).is_none() {
                    return Err(DomainError::UnsupportedRole { mode: key.mode });
                }
                if !(1..=HEALTH_BUCKETS as i32).contains(&health) {
                    return Err(DomainError::HealthOutOfRange { health });
                }
                Ok(block.head(at, role, health))
            }
            FeatureKind::Body { at, role, piece } => {
                if block.role_slot(role).is_none() {
                    return Err(DomainError::UnsupportedRole { mode: key.mode });
                }
                Ok(block.body(at, role, piece))
            }
        }
    }
}
