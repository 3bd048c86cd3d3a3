//! Flood-fill fallback move picker.
//!
//! Used whenever the neural path is unavailable: no weight bundle loaded,
//! the game is outside the feature schema, the model pool is exhausted, or
//! none of the ranked moves is legal.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;

use sidewinder_core::{Board, Coord, GameMode, Move};

/// Pick a fallback move: the legal move whose destination opens onto the
/// most reachable space, ties broken randomly. With no legal moves the
/// session is lost either way, so any direction serves.
pub fn fallback_move<R: Rng>(
    mode: GameMode,
    board: &Board,
    viewer_id: &str,
    legal: &[Move],
    rng: &mut R,
) -> Move {
    if legal.is_empty() {
        return *Move::ALL.choose(rng).unwrap_or(&Move::Up);
    }

    let Some(you) = board.snake(viewer_id) else {
        return *legal.choose(rng).unwrap_or(&Move::Up);
    };
    let head = you.head();

    let mut best = Vec::new();
    let mut best_space = 0usize;
    for &mv in legal {
        let mut dest = mv.apply(head);
        if mode.wraps() {
            dest = dest.wrapped(board.width, board.height);
        }
        let space = open_space(mode, board, dest);
        if space > best_space {
            best_space = space;
            best.clear();
        }
        if space == best_space {
            best.push(mv);
        }
    }

    *best.choose(rng).unwrap_or(&legal[0])
}

/// Count the cells reachable from `from` by orthogonal steps, treating every
/// body segment except tails as a wall. Returns 0 when `from` itself is
/// blocked or off the board.
pub fn open_space(mode: GameMode, board: &Board, from: Coord) -> usize {
    let blocked: HashSet<Coord> = board
        .snakes
        .iter()
        .flat_map(|s| s.body[..s.body.len() - 1].iter().copied())
        .collect();

    let start = if mode.wraps() {
        from.wrapped(board.width, board.height)
    } else {
        from
    };
    if !start.in_bounds(board.width, board.height) || blocked.contains(&start) {
        return 0;
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        for mv in Move::ALL {
            let mut next = mv.apply(cell);
            if mode.wraps() {
                next = next.wrapped(board.width, board.height);
            } else if !next.in_bounds(board.width, board.height) {
                continue;
            }
            if blocked.contains(&next) || !visited.insert(next) {
                continue;
            }
            queue.push_back(next);
        }
    }

    visited.len()
}
