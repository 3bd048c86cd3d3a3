//! Rule-based legality filter for candidate moves.
//!
//! This is deliberately not a full rules simulation: it rejects moves that
//! are certain losses on the next tick (walls, occupied cells) and leaves
//! everything else — head-to-head risk, hazard damage — to the evaluator.

use std::collections::HashSet;

use crate::board::Board;
use crate::coord::Coord;
use crate::game_mode::GameMode;
use crate::moves::Move;

/// Compute the moves the viewer can make without dying on arrival.
///
/// A move is kept unless it leaves the board (wrapping rulesets wrap
/// instead), enters the viewer's own body except its tail, or enters another
/// snake's body except its tail. Squad-mates never block in squad games.
/// Returns moves in score-output order; an unknown viewer id yields no moves.
pub fn legal_moves(mode: GameMode, board: &Board, viewer_id: &str) -> Vec<Move> {
    let Some(you) = board.snake(viewer_id) else {
        return Vec::new();
    };

    let blocked = blocked_cells(mode, board, viewer_id);
    let head = you.head();

    Move::ALL
        .iter()
        .copied()
        .filter(|mv| {
            let mut next = mv.apply(head);
            if mode.wraps() {
                next = next.wrapped(board.width, board.height);
            } else if !next.in_bounds(board.width, board.height) {
                return false;
            }
            !blocked.contains(&next)
        })
        .collect()
}

/// Cells occupied by snake bodies that would kill the viewer on entry.
///
/// Tails are omitted: they vacate the cell on the same tick the viewer would
/// arrive (stacked-tail edge cases are accepted as risk, matching how the
/// evaluator was trained).
fn blocked_cells(mode: GameMode, board: &Board, viewer_id: &str) -> HashSet<Coord> {
    let viewer_squad = board.snake(viewer_id).and_then(|s| s.squad.as_deref());

    let mut blocked = HashSet::new();
    for snake in &board.snakes {
        if snake.id != viewer_id
            && mode.supports_squads()
            && viewer_squad.is_some()
            && snake.squad.as_deref() == viewer_squad
        {
            continue;
        }
        for &segment in &snake.body[..snake.body.len() - 1] {
            blocked.insert(segment);
        }
    }
    blocked
}
