//! Wire types for the game protocol.
//!
//! One JSON object per line, mirroring the payloads the game server posts to
//! a snake's webhook endpoints: `info`, `start`, `move`, and `end`. Unknown
//! fields (latency, customizations, ruleset settings) are ignored.

use serde::{Deserialize, Serialize};

use sidewinder_core::{Board, Coord, GameMode, Snake};

/// A cell on the wire.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireCoord {
    pub x: i32,
    pub y: i32,
}

impl From<WireCoord> for Coord {
    fn from(c: WireCoord) -> Coord {
        Coord::new(c.x, c.y)
    }
}

/// Ruleset descriptor; only the name matters to move selection.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRuleset {
    pub name: String,
}

/// Game descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct WireGame {
    pub id: String,
    pub ruleset: WireRuleset,
}

/// One snake as delivered on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireSnake {
    pub id: String,
    pub health: i32,
    /// Body coordinates, head first.
    pub body: Vec<WireCoord>,
    /// Squad id; present only in squad games.
    #[serde(default)]
    pub squad: Option<String>,
}

impl From<WireSnake> for Snake {
    fn from(s: WireSnake) -> Snake {
        Snake {
            id: s.id,
            squad: s.squad.filter(|squad| !squad.is_empty()),
            health: s.health,
            body: s.body.into_iter().map(Coord::from).collect(),
        }
    }
}

/// The board as delivered on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireBoard {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub food: Vec<WireCoord>,
    #[serde(default)]
    pub hazards: Vec<WireCoord>,
    pub snakes: Vec<WireSnake>,
}

/// Payload shared by start, move, and end requests.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnData {
    pub game: WireGame,
    #[serde(default)]
    pub turn: u32,
    pub board: WireBoard,
    pub you: WireSnake,
}

impl TurnData {
    /// The ruleset, if it is one this engine knows.
    pub fn mode(&self) -> Option<GameMode> {
        GameMode::from_name(&self.game.ruleset.name)
    }

    /// Convert the wire board into a core snapshot.
    pub fn to_board(&self) -> Board {
        Board {
            width: self.board.width,
            height: self.board.height,
            food: self.board.food.iter().map(|&c| c.into()).collect(),
            hazards: self.board.hazards.iter().map(|&c| c.into()).collect(),
            snakes: self
                .board
                .snakes
                .iter()
                .cloned()
                .map(Snake::from)
                .collect(),
        }
    }
}

/// A parsed request line.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    /// Identify the snake (appearance and authorship).
    Info,
    /// A game this snake joined is starting.
    Start(TurnData),
    /// Choose a move for one turn.
    Move(TurnData),
    /// A game this snake was in has ended.
    End(TurnData),
}

/// Response to `info`.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub apiversion: &'static str,
    pub author: &'static str,
    pub color: &'static str,
    pub head: &'static str,
    pub tail: &'static str,
    pub version: &'static str,
}

/// Response to `move`.
#[derive(Debug, Serialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub mv: &'static str,
    pub shout: String,
}

/// Response to `start` and `end`.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

/// Error reply for a line that could not be served.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
