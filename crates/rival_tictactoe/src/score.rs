//! Cumulative win counters.

use super::Player;
use serde::{Deserialize, Serialize};

/// Wins per player for the lifetime of the process.
///
/// Counters only ever go up; a board reset leaves them alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    x_wins: u32,
    o_wins: u32,
}

impl Score {
    /// Both counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one win for `player`.
    pub fn record_win(&mut self, player: Player) {
        match player {
            Player::X => self.x_wins += 1,
            Player::O => self.o_wins += 1,
        }
    }

    /// Wins recorded for `player`.
    pub fn wins(&self, player: Player) -> u32 {
        match player {
            Player::X => self.x_wins,
            Player::O => self.o_wins,
        }
    }

    /// Wins recorded for X.
    pub fn x_wins(&self) -> u32 {
        self.x_wins
    }

    /// Wins recorded for O.
    pub fn o_wins(&self) -> u32 {
        self.o_wins
    }
}
