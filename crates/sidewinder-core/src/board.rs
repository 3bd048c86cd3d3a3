//! The board snapshot: food, hazards, and snakes as seen on one turn.

use crate::coord::Coord;
use crate::error::BoardError;

/// One snake on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    /// Engine-assigned snake id, unique within a game.
    pub id: String,
    /// Squad id, present only in squad games.
    pub squad: Option<String>,
    /// Health as received, 0..100 on the wire.
    pub health: i32,
    /// Body coordinates, head first. Consecutive segments may coincide when
    /// the ruleset stacks them (spawn turns, constrictor growth).
    pub body: Vec<Coord>,
}

impl Snake {
    /// The head cell. Panics on an empty body; [`Board::validate`] rejects
    /// those before any caller gets here.
    #[inline]
    pub fn head(&self) -> Coord {
        self.body[0]
    }

    /// The tail cell.
    #[inline]
    pub fn tail(&self) -> Coord {
        self.body[self.body.len() - 1]
    }

    /// Number of body segments, head included.
    #[inline]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// True if the body is empty (structurally invalid).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Complete board state for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    pub food: Vec<Coord>,
    pub hazards: Vec<Coord>,
    /// Every live snake, the viewer included.
    pub snakes: Vec<Snake>,
}

impl Board {
    /// Look up a snake by id.
    pub fn snake(&self, id: &str) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    /// True if the board is square, which every supported ruleset is.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Structural validation of a snapshot received from outside.
    ///
    /// Checks dimensions, cell bounds, non-empty bodies, and snake id
    /// uniqueness. Game-rule consistency (collisions, health decay) is not
    /// checked here; the engine trusts the game server for that.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.width < 1 || self.height < 1 {
            return Err(BoardError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        for (kind, cells) in [("food", &self.food), ("hazard", &self.hazards)] {
            if let Some(c) = cells.iter().find(|c| !c.in_bounds(self.width, self.height)) {
                return Err(BoardError::CellOutOfBounds {
                    kind,
                    x: c.x,
                    y: c.y,
                });
            }
        }

        for (i, snake) in self.snakes.iter().enumerate() {
            if snake.is_empty() {
                return Err(BoardError::EmptyBody {
                    snake_id: snake.id.clone(),
                });
            }
            if let Some(c) = snake
                .body
                .iter()
                .find(|c| !c.in_bounds(self.width, self.height))
            {
                return Err(BoardError::SegmentOutOfBounds {
                    snake_id: snake.id.clone(),
                    x: c.x,
                    y: c.y,
                });
            }
            if self.snakes[..i].iter().any(|other| other.id == snake.id) {
                return Err(BoardError::DuplicateSnakeId {
                    snake_id: snake.id.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, Snake};
    use crate::coord::Coord;
    use crate::error::BoardError;

    fn snake(id: &str, body: &[(i32, i32)]) -> Snake {
        Snake {
            id: id.to_string(),
            squad: None,
            health: 90,
            body: body.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        }
    }

    fn board() -> Board {
        Board {
            width: 11,
            height: 11,
            food: vec![Coord::new(0, 0)],
            hazards: Vec::new(),
            snakes: vec![snake("a", &[(5, 5), (5, 4), (5, 3)])],
        }
    }

    #[test]
    fn valid_board_passes() {
        assert_eq!(board().validate(), Ok(()));
    }

    #[test]
    fn snake_lookup() {
        let b = board();
        assert_eq!(b.snake("a").map(|s| s.head()), Some(Coord::new(5, 5)));
        assert!(b.snake("missing").is_none());
    }

    #[test]
    fn head_and_tail() {
        let s = snake("a", &[(5, 5), (5, 4), (5, 3)]);
        assert_eq!(s.head(), Coord::new(5, 5));
        assert_eq!(s.tail(), Coord::new(5, 3));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn rejects_bad_dimensions() {
        let mut b = board();
        b.width = 0;
        assert!(matches!(
            b.validate(),
            Err(BoardError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn rejects_out_of_bounds_food() {
        let mut b = board();
        b.food.push(Coord::new(11, 0));
        assert!(matches!(
            b.validate(),
            Err(BoardError::CellOutOfBounds { kind: "food", .. })
        ));
    }

    #[test]
    fn rejects_empty_body() {
        let mut b = board();
        b.snakes.push(snake("b", &[]));
        assert!(matches!(b.validate(), Err(BoardError::EmptyBody { .. })));
    }

    #[test]
    fn rejects_out_of_bounds_segment() {
        let mut b = board();
        b.snakes.push(snake("b", &[(10, 10), (10, 11)]));
        assert!(matches!(
            b.validate(),
            Err(BoardError::SegmentOutOfBounds { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut b = board();
        b.snakes.push(snake("a", &[(0, 1), (0, 2)]));
        assert!(matches!(
            b.validate(),
            Err(BoardError::DuplicateSnakeId { .. })
        ));
    }
}
