//! Pure tic-tac-toe game logic.
//!
//! This crate holds everything about the game that does not touch the
//! network or a terminal:
//!
//! - **Board**: nine cells in row-major order (index = row * 3 + col)
//! - **GameState**: board, player to move, outcome, history and scores
//! - **Rules**: win and draw detection over the eight lines
//! - **Contracts**: legality checks applied before every move
//!
//! # Example
//!
//! ```
//! use rival_tictactoe::{GameOutcome, GameState, Player};
//!
//! let mut game = GameState::new();
//! let outcome = game.apply_move(4, Player::X).unwrap();
//! assert_eq!(outcome, GameOutcome::Ongoing);
//! assert_eq!(game.current_player(), Player::O);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod contracts;
mod outcome;
mod position;
mod score;
mod state;
mod types;

pub mod rules;

pub use action::{Move, MoveError};
pub use contracts::{BoardConsistent, GameNotOver, InBounds, LegalMove, PlayersTurn, SquareIsEmpty};
pub use outcome::GameOutcome;
pub use position::Position;
pub use score::Score;
pub use state::GameState;
pub use types::{Board, ParseBoardError, Player, Square};
