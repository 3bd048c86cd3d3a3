//! Game rulesets.

use std::fmt;

/// The ruleset a game is played under.
///
/// Mirrors the ruleset names delivered with each game request. The mode is
/// part of the evaluator's feature schema, so the set here is closed: an
/// unrecognized ruleset name parses to `None` and the caller decides whether
/// to serve it without the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GameMode {
    Standard = 0,
    Solo = 1,
    Royale = 2,
    Squad = 3,
    Wrapped = 4,
    Constrictor = 5,
}

impl GameMode {
    /// Total number of game modes.
    pub const COUNT: usize = 6;

    /// All modes in index order.
    pub const ALL: [GameMode; 6] = [
        GameMode::Standard,
        GameMode::Solo,
        GameMode::Royale,
        GameMode::Squad,
        GameMode::Wrapped,
        GameMode::Constrictor,
    ];

    /// Return the index (0..5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether snakes are grouped into squads under this ruleset.
    #[inline]
    pub const fn supports_squads(self) -> bool {
        matches!(self, GameMode::Squad)
    }

    /// Whether the board wraps at the edges under this ruleset.
    #[inline]
    pub const fn wraps(self) -> bool {
        matches!(self, GameMode::Wrapped)
    }

    /// The ruleset name as it appears on the wire.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            GameMode::Standard => "standard",
            GameMode::Solo => "solo",
            GameMode::Royale => "royale",
            GameMode::Squad => "squad",
            GameMode::Wrapped => "wrapped",
            GameMode::Constrictor => "constrictor",
        }
    }

    /// Parse a wire ruleset name.
    #[inline]
    pub fn from_name(name: &str) -> Option<GameMode> {
        match name {
            "standard" => Some(GameMode::Standard),
            "solo" => Some(GameMode::Solo),
            "royale" => Some(GameMode::Royale),
            "squad" => Some(GameMode::Squad),
            "wrapped" => Some(GameMode::Wrapped),
            "constrictor" => Some(GameMode::Constrictor),
            _ => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
