//! Outcome of evaluating a board.

use super::Player;
use serde::{Deserialize, Serialize};

/// Where a game stands after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// No line is complete and at least one cell is empty.
    Ongoing,
    /// Player completed a line.
    Win(Player),
    /// Board is full with no completed line.
    Draw,
}

impl GameOutcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameOutcome::Win(player) => Some(*player),
            GameOutcome::Ongoing | GameOutcome::Draw => None,
        }
    }

    /// Returns true once the game has been decided.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameOutcome::Ongoing)
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::Ongoing => write!(f, "Ongoing"),
            GameOutcome::Win(player) => write!(f, "{} Wins!", player),
            GameOutcome::Draw => write!(f, "It's a Draw!"),
        }
    }
}
