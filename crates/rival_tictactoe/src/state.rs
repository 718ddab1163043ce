//! The game state machine.

use super::action::{Move, MoveError};
use super::contracts::{BoardConsistent, LegalMove};
use super::{Board, GameOutcome, Player, Score, Square, rules};
use tracing::{debug, info, instrument, warn};

/// Board, player to move, outcome, history and cumulative scores.
///
/// [`GameState::reset`] starts a fresh round but keeps the scores, so one
/// value lives for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    outcome: GameOutcome,
    history: Vec<Move>,
    score: Score,
    win_recorded: bool,
}

impl GameState {
    /// Creates a fresh game: empty board, X to move, zero scores.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Player::X,
            outcome: GameOutcome::Ongoing,
            history: Vec::new(),
            score: Score::new(),
            win_recorded: false,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the outcome as of the last accepted move.
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// Returns the moves of the current round.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the cumulative scores.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Places `player`'s mark at `index`.
    ///
    /// On success the outcome is re-evaluated and, only while the game is
    /// still ongoing, the turn passes to the other player.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveError`] if the game is over, the index is outside 0-8,
    /// the square is occupied, or it is not `player`'s turn. A rejected move
    /// leaves the state exactly as it was.
    #[instrument(skip(self), fields(current = %self.current_player))]
    pub fn apply_move(&mut self, index: usize, player: Player) -> Result<GameOutcome, MoveError> {
        let mov = Move::new(player, index);
        if let Err(e) = LegalMove::check(&mov, self) {
            debug!(error = %e, "Move rejected");
            return Err(e);
        }

        self.board.set(index, Square::Occupied(player));
        self.history.push(mov);
        self.outcome = self.evaluate_outcome();

        if self.outcome == GameOutcome::Ongoing {
            self.current_player = player.opponent();
        }

        debug_assert!(BoardConsistent::holds(&self.board), "Board consistency violated");
        debug!(outcome = %self.outcome, "Move applied");
        Ok(self.outcome)
    }

    /// Evaluates the board: win before draw before ongoing.
    pub fn evaluate_outcome(&self) -> GameOutcome {
        rules::evaluate(&self.board)
    }

    /// Credits the current round's win to `player`.
    ///
    /// Only counts when the round was actually won by `player` and has not
    /// been credited yet, so each win increments the score exactly once.
    /// Returns whether the score changed.
    #[instrument(skip(self))]
    pub fn record_win(&mut self, player: Player) -> bool {
        if self.outcome.winner() != Some(player) || self.win_recorded {
            warn!(
                outcome = %self.outcome,
                already_recorded = self.win_recorded,
                "Win not recorded"
            );
            return false;
        }

        self.score.record_win(player);
        self.win_recorded = true;
        info!(
            x_wins = self.score.x_wins(),
            o_wins = self.score.o_wins(),
            "Win recorded"
        );
        true
    }

    /// Clears the board and gives X the move. Scores are kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        debug!("Resetting board");
        self.board = Board::new();
        self.current_player = Player::X;
        self.outcome = GameOutcome::Ongoing;
        self.history.clear();
        self.win_recorded = false;
    }

    /// Returns true once the round has been decided.
    pub fn is_over(&self) -> bool {
        self.outcome.is_terminal()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
