//! Legality checks for moves.
//!
//! Each precondition is a small type with a `check` function; [`LegalMove`]
//! composes them in the order a rejection is reported.

use super::action::{Move, MoveError};
use super::state::GameState;
use super::{Board, Player};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game has not been decided.
pub struct GameNotOver;

impl GameNotOver {
    /// Fails with [`MoveError::GameOver`] once the outcome is terminal.
    #[instrument(skip(game))]
    pub fn check(_mov: &Move, game: &GameState) -> Result<(), MoveError> {
        if game.outcome().is_terminal() {
            Err(MoveError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the index addresses one of the nine cells.
pub struct InBounds;

impl InBounds {
    /// Fails with [`MoveError::OutOfBounds`] for indices above 8.
    #[instrument(skip(_game))]
    pub fn check(mov: &Move, _game: &GameState) -> Result<(), MoveError> {
        if mov.index < Board::CELLS {
            Ok(())
        } else {
            Err(MoveError::OutOfBounds(mov.index))
        }
    }
}

/// Precondition: the square at the move's index must be empty.
pub struct SquareIsEmpty;

impl SquareIsEmpty {
    /// Fails with [`MoveError::SquareOccupied`] when the cell holds a mark.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        if game.board().is_empty(mov.index) {
            Ok(())
        } else {
            Err(MoveError::SquareOccupied(mov.index))
        }
    }
}

/// Precondition: it must be the player's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with [`MoveError::WrongPlayer`] when another player is to move.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        if mov.player != game.current_player() {
            Err(MoveError::WrongPlayer(mov.player))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition: game live, index in bounds, square empty, player's turn.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        GameNotOver::check(mov, game)?;
        InBounds::check(mov, game)?;
        SquareIsEmpty::check(mov, game)?;
        PlayersTurn::check(mov, game)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Invariants
// ─────────────────────────────────────────────────────────────

/// Invariant: X has played as many marks as O, or exactly one more.
pub struct BoardConsistent;

impl BoardConsistent {
    /// Returns whether the mark counts are consistent with X moving first.
    #[instrument(skip(board))]
    pub fn holds(board: &Board) -> bool {
        let x_count = board.count(Player::X);
        let o_count = board.count(Player::O);

        let valid = x_count == o_count || x_count == o_count + 1;
        if !valid {
            warn!(x_count, o_count, "Board consistency violated");
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_empty_square() {
        let game = GameState::new();
        assert!(LegalMove::check(&Move::new(Player::X, 4), &game).is_ok());
    }

    #[test]
    fn test_precondition_occupied_square() {
        let mut game = GameState::new();
        game.apply_move(4, Player::X).unwrap();
        assert_eq!(
            LegalMove::check(&Move::new(Player::O, 4), &game),
            Err(MoveError::SquareOccupied(4))
        );
    }

    #[test]
    fn test_precondition_wrong_turn() {
        let game = GameState::new();
        assert_eq!(
            LegalMove::check(&Move::new(Player::O, 4), &game),
            Err(MoveError::WrongPlayer(Player::O))
        );
    }

    #[test]
    fn test_precondition_out_of_bounds() {
        let game = GameState::new();
        assert_eq!(
            LegalMove::check(&Move::new(Player::X, 9), &game),
            Err(MoveError::OutOfBounds(9))
        );
    }

    #[test]
    fn test_board_consistency() {
        assert!(BoardConsistent::holds(&"XO. X.. ...".parse().unwrap()));
        assert!(!BoardConsistent::holds(&"XX. ... ...".parse().unwrap()));
        assert!(!BoardConsistent::holds(&"O.. ... ...".parse().unwrap()));
    }
}
