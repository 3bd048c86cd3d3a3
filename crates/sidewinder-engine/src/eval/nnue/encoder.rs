//! Board-to-feature encoding.

use sidewinder_core::{Board, Coord, GameMode, Snake};

use super::schema::{BodyPiece, DomainError, FeatureIndexer, Role, HEALTH_BUCKETS};

/// The sparse set of feature indices active for one board snapshot.
///
/// Stored sorted and deduplicated; ordering carries no meaning beyond making
/// set difference a linear merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveFeatures(Vec<u32>);

impl ActiveFeatures {
    /// Build from indices in any order, with duplicates removed.
    pub fn from_unsorted(mut indices: Vec<u32>) -> ActiveFeatures {
        indices.sort_unstable();
        indices.dedup();
        ActiveFeatures(indices)
    }

    /// The indices in ascending order.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Number of active features.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no feature is active.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Membership test.
    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.0.binary_search(&index).is_ok()
    }
}

impl FromIterator<u32> for ActiveFeatures {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> ActiveFeatures {
        ActiveFeatures::from_unsorted(iter.into_iter().collect())
    }
}

/// Encode one board snapshot into its active feature set, viewer-relative.
///
/// Walks food cells, hazard cells, and each snake's body head-to-tail; cost
/// is linear in total segment count plus food and hazard counts. Boards
/// whose mode or size fall outside the indexer's schema are reported as
/// [`DomainError`] so the caller can fall back to the heuristic picker.
pub fn encode(
    indexer: &FeatureIndexer,
    mode: GameMode,
    board: &Board,
    viewer_id: &str,
) -> Result<ActiveFeatures, DomainError> {
    if !board.is_square() {
        return Err(DomainError::NonSquareBoard {
            width: board.width,
            height: board.height,
        });
    }
    let block = indexer.block(mode, board.width)?;

    let viewer_squad = board.snake(viewer_id).and_then(|s| s.squad.as_deref());

    let mut raw = Vec::with_capacity(
        board.food.len()
            + board.hazards.len()
            + board.snakes.iter().map(Snake::len).sum::<usize>(),
    );

    for &at in &board.food {
        raw.push(block.food(at));
    }
    for &at in &board.hazards {
        raw.push(block.hazard(at));
    }

    for snake in &board.snakes {
        let role = classify(snake, viewer_id, viewer_squad, mode);
        let health = snake.health.clamp(1, HEALTH_BUCKETS as i32);

        raw.push(block.head(snake.head(), role, health));

        for pair in snake.body.windows(2) {
            let (prev, cur) = (pair[0], pair[1]);
            raw.push(block.body(cur, role, piece_for(prev, cur, mode, board.width)));
        }
    }

    Ok(ActiveFeatures::from_unsorted(raw))
}

/// Viewer-relative role of a snake.
fn classify(snake: &Snake, viewer_id: &str, viewer_squad: Option<&str>, mode: GameMode) -> Role {
    if snake.id == viewer_id {
        Role::Own
    } else if mode.supports_squads()
        && viewer_squad.is_some()
        && snake.squad.as_deref() == viewer_squad
    {
        Role::Squadmate
    } else {
        Role::Other
    }
}

/// Body piece for a segment given its predecessor (the neighbor nearer the
/// head): the piece names where the segment sits relative to it. Wrapped
/// boards normalize the seam-crossing delta back to a unit step first.
fn piece_for(prev: Coord, cur: Coord, mode: GameMode, size: i32) -> BodyPiece {
    let (mut dx, mut dy) = cur.delta(prev);
    if mode.wraps() {
        dx = unwrap_axis(dx, size);
        dy = unwrap_axis(dy, size);
    }
    match (dx.signum(), dy.signum()) {
        (-1, 0) => BodyPiece::Left,
        (1, 0) => BodyPiece::Right,
        (0, -1) => BodyPiece::Down,
        (0, 1) => BodyPiece::Up,
        _ => BodyPiece::Stacked,
    }
}

/// Map a torus delta back into (-size/2, size/2].
#[inline]
fn unwrap_axis(d: i32, size: i32) -> i32 {
    if d > size / 2 {
        d - size
    } else if d < -(size / 2) {
        d + size
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use sidewinder_core::{Board, Coord, GameMode, Snake};

    use super::super::schema::{
        BodyPiece, DomainError, FeatureIndexer, FeatureKey, FeatureKind, FeatureSchema, Role,
    };
    use super::{encode, ActiveFeatures};

    fn snake(id: &str, health: i32, body: &[(i32, i32)]) -> Snake {
        Snake {
            id: id.to_string(),
            squad: None,
            health,
            body: body.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        }
    }

    fn indexer() -> FeatureIndexer {
        FeatureIndexer::build(&FeatureSchema::new(
            vec![GameMode::Standard, GameMode::Squad, GameMode::Wrapped],
            vec![3, 5],
        ))
    }

    fn lookup(indexer: &FeatureIndexer, mode: GameMode, size: i32, kind: FeatureKind) -> u32 {
        indexer.lookup(&FeatureKey { mode, size, kind }).unwrap()
    }

    #[test]
    fn active_features_dedup_and_sort() {
        let set = ActiveFeatures::from_unsorted(vec![9, 3, 9, 1]);
        assert_eq!(set.as_slice(), &[1, 3, 9]);
        assert!(set.contains(3));
        assert!(!set.contains(4));
        assert_eq!(set.len(), 3);
    }

    /// Reference scenario pinning the orientation convention: 3x3 board,
    /// food at (0,0), self body [(1,1), (2,1)] head first.
    #[test]
    fn reference_scenario() {
        let idx = indexer();
        let board = Board {
            width: 3,
            height: 3,
            food: vec![Coord::new(0, 0)],
            hazards: Vec::new(),
            snakes: vec![snake("me", 80, &[(1, 1), (2, 1)])],
        };

        let set = encode(&idx, GameMode::Standard, &board, "me").unwrap();

        let food = lookup(
            &idx,
            GameMode::Standard,
            3,
            FeatureKind::Food {
                at: Coord::new(0, 0),
            },
        );
        let head = lookup(
            &idx,
            GameMode::Standard,
            3,
            FeatureKind::Head {
                at: Coord::new(1, 1),
                role: Role::Own,
                health: 80,
            },
        );
        // The segment at (2,1) sits to the right of the head at (1,1).
        let neck = lookup(
            &idx,
            GameMode::Standard,
            3,
            FeatureKind::Body {
                at: Coord::new(2, 1),
                role: Role::Own,
                piece: BodyPiece::Right,
            },
        );

        assert!(set.contains(food));
        assert!(set.contains(head));
        assert!(set.contains(neck));
        assert_eq!(set.len(), 3);

        // No other body piece fires at (2,1).
        for piece in BodyPiece::ALL {
            if piece == BodyPiece::Right {
                continue;
            }
            let other = lookup(
                &idx,
                GameMode::Standard,
                3,
                FeatureKind::Body {
                    at: Coord::new(2, 1),
                    role: Role::Own,
                    piece,
                },
            );
            assert!(!set.contains(other));
        }
    }

    #[test]
    fn all_four_directions_and_stacked() {
        let idx = indexer();
        // Hooked body exercising down, left, up; then a stacked tail.
        let body = [(2, 2), (2, 1), (1, 1), (1, 2), (1, 2)];
        let board = Board {
            width: 5,
            height: 5,
            food: Vec::new(),
            hazards: Vec::new(),
            snakes: vec![snake("me", 100, &body)],
        };

        let set = encode(&idx, GameMode::Standard, &board, "me").unwrap();

        let expect = [
            ((2, 1), BodyPiece::Down),
            ((1, 1), BodyPiece::Left),
            ((1, 2), BodyPiece::Up),
            ((1, 2), BodyPiece::Stacked),
        ];
        for ((x, y), piece) in expect {
            let f = lookup(
                &idx,
                GameMode::Standard,
                5,
                FeatureKind::Body {
                    at: Coord::new(x, y),
                    role: Role::Own,
                    piece,
                },
            );
            assert!(set.contains(f), "missing {piece:?} at ({x},{y})");
        }
    }

    #[test]
    fn roles_are_viewer_relative() {
        let idx = indexer();
        let mut a = snake("a", 50, &[(0, 0), (0, 1)]);
        let mut b = snake("b", 60, &[(4, 4), (4, 3)]);
        a.squad = Some("red".to_string());
        b.squad = Some("red".to_string());
        let c = snake("c", 70, &[(2, 2), (2, 3)]);
        let board = Board {
            width: 5,
            height: 5,
            food: Vec::new(),
            hazards: Vec::new(),
            snakes: vec![a, b, c.clone()],
        };

        let set = encode(&idx, GameMode::Squad, &board, "a").unwrap();

        let own_head = lookup(
            &idx,
            GameMode::Squad,
            5,
            FeatureKind::Head {
                at: Coord::new(0, 0),
                role: Role::Own,
                health: 50,
            },
        );
        let mate_head = lookup(
            &idx,
            GameMode::Squad,
            5,
            FeatureKind::Head {
                at: Coord::new(4, 4),
                role: Role::Squadmate,
                health: 60,
            },
        );
        let other_head = lookup(
            &idx,
            GameMode::Squad,
            5,
            FeatureKind::Head {
                at: Coord::new(2, 2),
                role: Role::Other,
                health: 70,
            },
        );
        assert!(set.contains(own_head));
        assert!(set.contains(mate_head));
        assert!(set.contains(other_head));

        // Same board through the other snake's eyes: squads no longer match.
        let set_c = encode(&idx, GameMode::Squad, &board, "c").unwrap();
        let a_as_other = lookup(
            &idx,
            GameMode::Squad,
            5,
            FeatureKind::Head {
                at: Coord::new(0, 0),
                role: Role::Other,
                health: 50,
            },
        );
        assert!(set_c.contains(a_as_other));
    }

    #[test]
    fn health_is_clamped() {
        let idx = indexer();
        let board = Board {
            width: 3,
            height: 3,
            food: Vec::new(),
            hazards: Vec::new(),
            snakes: vec![snake("me", 0, &[(1, 1), (1, 0)])],
        };

        let set = encode(&idx, GameMode::Standard, &board, "me").unwrap();
        let bucket_one = lookup(
            &idx,
            GameMode::Standard,
            3,
            FeatureKind::Head {
                at: Coord::new(1, 1),
                role: Role::Own,
                health: 1,
            },
        );
        assert!(set.contains(bucket_one));
    }

    #[test]
    fn hazards_are_encoded() {
        let idx = indexer();
        let board = Board {
            width: 3,
            height: 3,
            food: Vec::new(),
            hazards: vec![Coord::new(2, 2)],
            snakes: vec![snake("me", 50, &[(0, 0), (0, 1)])],
        };

        let set = encode(&idx, GameMode::Standard, &board, "me").unwrap();
        let hazard = lookup(
            &idx,
            GameMode::Standard,
            3,
            FeatureKind::Hazard {
                at: Coord::new(2, 2),
            },
        );
        assert!(set.contains(hazard));
    }

    #[test]
    fn wrapped_seam_normalizes_direction() {
        let idx = indexer();
        // Head at x=0 with the neck across the seam at x=4: the neck sits
        // one step to the "left" on the torus, i.e. the head moved right.
        let board = Board {
            width: 5,
            height: 5,
            food: Vec::new(),
            hazards: Vec::new(),
            snakes: vec![snake("me", 50, &[(0, 2), (4, 2), (3, 2)])],
        };

        let set = encode(&idx, GameMode::Wrapped, &board, "me").unwrap();
        let seam_neck = lookup(
            &idx,
            GameMode::Wrapped,
            5,
            FeatureKind::Body {
                at: Coord::new(4, 2),
                role: Role::Own,
                piece: BodyPiece::Left,
            },
        );
        assert!(set.contains(seam_neck));
    }

    #[test]
    fn out_of_domain_boards_are_rejected() {
        let idx = indexer();
        let board = Board {
            width: 7,
            height: 7,
            food: Vec::new(),
            hazards: Vec::new(),
            snakes: vec![snake("me", 50, &[(0, 0), (0, 1)])],
        };
        assert!(matches!(
            encode(&idx, GameMode::Standard, &board, "me"),
            Err(DomainError::UnsupportedGame { .. })
        ));

        let rect = Board {
            width: 3,
            height: 5,
            food: Vec::new(),
            hazards: Vec::new(),
            snakes: Vec::new(),
        };
        assert!(matches!(
            encode(&idx, GameMode::Standard, &rect, "me"),
            Err(DomainError::NonSquareBoard { .. })
        ));
    }
}
