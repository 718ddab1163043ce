//! Move resolution for the automated player.
//!
//! A move is first requested from the suggestion service. The response is
//! parsed and validated against the board; anything short of a valid empty
//! index (a transport error, a non-2xx status, text like "banana", an index
//! of 12, an occupied cell) degrades to a uniformly random empty cell.
//! Failures are logged, never returned.
//!
//! Resolution is split in two so a caller can keep handling input while the
//! request is in flight:
//!
//! 1. [`request_suggestion`] owns everything it needs and can be boxed and
//!    polled from a `select!` loop.
//! 2. [`MoveResolver::settle`] turns its result into a move, falling back
//!    to the random choice when needed.
//!
//! [`MoveResolver::resolve_move`] runs both steps back to back.

use crate::llm_client::LlmError;
use crate::suggestion::SuggestionService;
use derive_more::Display;
use derive_new::new;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rival_tictactoe::{Board, Player};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Where a resolved move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum MoveSource {
    /// The suggestion service proposed a valid empty cell.
    Suggested,
    /// Chosen uniformly at random among empty cells.
    Fallback,
}

/// A move chosen for the automated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ResolvedMove {
    /// Board index (0-8).
    pub index: usize,
    /// How the index was chosen.
    pub source: MoveSource,
}

/// Why a suggestion could not be used.
#[derive(Debug, Clone, Display)]
pub enum SuggestionError {
    /// The service call itself failed.
    #[display("suggestion service failed: {}", _0)]
    Service(LlmError),
    /// The response did not start with an integer.
    #[display("suggestion {:?} is not a number", _0)]
    Malformed(String),
    /// The integer is not a board index.
    #[display("suggested index {} is out of range", _0)]
    OutOfRange(usize),
    /// The integer points at an occupied cell.
    #[display("suggested cell {} is occupied", _0)]
    Occupied(usize),
}

impl std::error::Error for SuggestionError {}

impl From<LlmError> for SuggestionError {
    fn from(err: LlmError) -> Self {
        SuggestionError::Service(err)
    }
}

/// Builds the request text for `player` on `board`.
pub fn build_prompt(board: &Board, player: Player) -> String {
    format!(
        "Current Tic-Tac-Toe board: {}. As player {}, choose an empty cell (0-8). Respond ONLY with the number.",
        board.snapshot(),
        player
    )
}

/// Parses the leading integer of a response.
///
/// Surrounding whitespace is ignored and so is anything after the digits,
/// so `" 7\n"` and `"7."` both give 7. A response that does not start with
/// a digit is malformed.
pub fn parse_suggestion(text: &str) -> Result<usize, SuggestionError> {
    let trimmed = text.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let digits = &trimmed[..digits_end];

    if digits.is_empty() {
        return Err(SuggestionError::Malformed(trimmed.to_string()));
    }
    // Anything too long for usize is certainly not a cell.
    digits
        .parse::<usize>()
        .map_err(|_| SuggestionError::Malformed(trimmed.to_string()))
}

/// Checks that `index` names an empty cell of `board`.
pub fn validate_suggestion(board: &Board, index: usize) -> Result<usize, SuggestionError> {
    if index >= Board::CELLS {
        Err(SuggestionError::OutOfRange(index))
    } else if !board.is_empty(index) {
        Err(SuggestionError::Occupied(index))
    } else {
        Ok(index)
    }
}

/// Asks the service for `player`'s move and validates the answer.
///
/// Takes its inputs by value so the returned future is `'static`.
#[instrument(skip(service, board), fields(service = service.name()))]
pub async fn request_suggestion(
    service: Arc<dyn SuggestionService>,
    board: Board,
    player: Player,
) -> Result<usize, SuggestionError> {
    let prompt = build_prompt(&board, player);
    debug!(%prompt, "Requesting suggestion");

    let text = service.suggest(&prompt).await?;
    debug!(response = %text, "Suggestion received");

    let index = parse_suggestion(&text)?;
    validate_suggestion(&board, index)
}

/// Chooses moves for the automated player.
pub struct MoveResolver {
    service: Arc<dyn SuggestionService>,
    rng: StdRng,
}

impl MoveResolver {
    /// Creates a resolver with an entropy-seeded fallback generator.
    pub fn new(service: Arc<dyn SuggestionService>) -> Self {
        Self {
            service,
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a resolver whose fallback choices are reproducible.
    pub fn with_seed(service: Arc<dyn SuggestionService>, seed: u64) -> Self {
        Self {
            service,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns a handle to the suggestion service.
    pub fn service(&self) -> Arc<dyn SuggestionService> {
        Arc::clone(&self.service)
    }

    /// Produces `player`'s move on `board`, or `None` if no cell is empty.
    #[instrument(skip(self, board))]
    pub async fn resolve_move(&mut self, board: &Board, player: Player) -> Option<ResolvedMove> {
        let result = request_suggestion(self.service(), board.clone(), player).await;
        self.settle(board, player, result)
    }

    /// Turns a suggestion result into a move.
    ///
    /// The suggested index is re-checked against `board`; on any error the
    /// move is drawn uniformly from the empty cells.
    #[instrument(skip(self, board, result))]
    pub fn settle(
        &mut self,
        board: &Board,
        player: Player,
        result: Result<usize, SuggestionError>,
    ) -> Option<ResolvedMove> {
        match result.and_then(|index| validate_suggestion(board, index)) {
            Ok(index) => {
                info!(index, "Using suggested move");
                Some(ResolvedMove::new(index, MoveSource::Suggested))
            }
            Err(e) => {
                warn!(error = %e, "Suggestion unusable, falling back to a random move");
                let index = self.fallback_move(board)?;
                info!(index, "Using fallback move");
                Some(ResolvedMove::new(index, MoveSource::Fallback))
            }
        }
    }

    /// Picks an empty cell uniformly at random.
    pub fn fallback_move(&mut self, board: &Board) -> Option<usize> {
        let empty = board.empty_indices();
        let choice = empty.choose(&mut self.rng).copied();
        if choice.is_none() {
            warn!("No empty cells left for a fallback move");
        }
        choice
    }
}

impl std::fmt::Debug for MoveResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveResolver")
            .field("service", &self.service.name())
            .finish_non_exhaustive()
    }
}
