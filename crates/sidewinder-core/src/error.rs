//! Error types for board validation.

/// Errors from structural validation of a [`Board`](crate::board::Board).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The board has a zero or negative dimension.
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions {
        /// Board width as received.
        width: i32,
        /// Board height as received.
        height: i32,
    },
    /// A food or hazard cell lies outside the board.
    #[error("{kind} cell {x},{y} is outside the board")]
    CellOutOfBounds {
        /// "food" or "hazard".
        kind: &'static str,
        /// Cell x as received.
        x: i32,
        /// Cell y as received.
        y: i32,
    },
    /// A snake has an empty body.
    #[error("snake \"{snake_id}\" has an empty body")]
    EmptyBody {
        /// The offending snake's id.
        snake_id: String,
    },
    /// A snake body segment lies outside the board.
    #[error("snake \"{snake_id}\" has a body segment at {x},{y} outside the board")]
    SegmentOutOfBounds {
        /// The offending snake's id.
        snake_id: String,
        /// Segment x as received.
        x: i32,
        /// Segment y as received.
        y: i32,
    },
    /// Two snakes share the same id.
    #[error("duplicate snake id \"{snake_id}\"")]
    DuplicateSnakeId {
        /// The duplicated id.
        snake_id: String,
    },
}
