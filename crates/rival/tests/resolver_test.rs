//! Tests for automated move resolution.

use async_trait::async_trait;
use rival::{LlmError, MoveResolver, MoveSource, SuggestionService, build_prompt};
use rival_tictactoe::{Board, Player};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Returns one fixed answer and records every prompt it receives.
struct FixedService {
    answer: Result<String, LlmError>,
    prompts: Mutex<Vec<String>>,
}

impl FixedService {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: Err(LlmError::new("connection refused")),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SuggestionService for FixedService {
    async fn suggest(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn board(s: &str) -> Board {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_valid_suggestion_is_used() {
    let service = FixedService::answering("7");
    let mut resolver = MoveResolver::with_seed(service.clone(), 1);
    let board = board("X.. ... ...");

    let resolved = resolver.resolve_move(&board, Player::O).await.unwrap();
    assert_eq!(resolved.index, 7);
    assert_eq!(resolved.source, MoveSource::Suggested);

    let prompts = service.prompts.lock().unwrap();
    assert_eq!(prompts.as_slice(), [build_prompt(&board, Player::O)]);
}

#[tokio::test]
async fn test_whitespace_and_trailing_text_tolerated() {
    let mut resolver = MoveResolver::with_seed(FixedService::answering(" 2.\n"), 1);
    let resolved = resolver
        .resolve_move(&board("... .X. ..."), Player::O)
        .await
        .unwrap();
    assert_eq!(resolved.index, 2);
    assert_eq!(resolved.source, MoveSource::Suggested);
}

#[tokio::test]
async fn test_non_numeric_answer_falls_back() {
    let mut resolver = MoveResolver::with_seed(FixedService::answering("banana"), 1);
    let board = board("XOX O.. ...");

    let resolved = resolver.resolve_move(&board, Player::X).await.unwrap();
    assert_eq!(resolved.source, MoveSource::Fallback);
    assert!(board.is_empty(resolved.index));
}

#[tokio::test]
async fn test_out_of_range_answer_falls_back() {
    let mut resolver = MoveResolver::with_seed(FixedService::answering("12"), 1);
    let board = board("X.. ... ...");

    let resolved = resolver.resolve_move(&board, Player::O).await.unwrap();
    assert_eq!(resolved.source, MoveSource::Fallback);
    assert!(resolved.index < Board::CELLS);
    assert!(board.is_empty(resolved.index));
}

#[tokio::test]
async fn test_occupied_answer_falls_back() {
    let mut resolver = MoveResolver::with_seed(FixedService::answering("0"), 1);
    let board = board("X.. ... ...");

    let resolved = resolver.resolve_move(&board, Player::O).await.unwrap();
    assert_eq!(resolved.source, MoveSource::Fallback);
    assert_ne!(resolved.index, 0);
}

#[tokio::test]
async fn test_service_error_falls_back() {
    let mut resolver = MoveResolver::with_seed(FixedService::failing(), 1);
    let board = board("XOX XO. O..");

    let resolved = resolver.resolve_move(&board, Player::X).await.unwrap();
    assert_eq!(resolved.source, MoveSource::Fallback);
    assert!([5, 7, 8].contains(&resolved.index));
}

#[tokio::test]
async fn test_full_board_yields_no_move() {
    let mut resolver = MoveResolver::with_seed(FixedService::answering("4"), 1);
    let full = board("XOX XOO OXX");
    assert!(resolver.resolve_move(&full, Player::O).await.is_none());
}

#[tokio::test]
async fn test_single_empty_cell_is_forced() {
    let mut resolver = MoveResolver::with_seed(FixedService::failing(), 1);
    let board = board("XOX XOO OX.");

    let resolved = resolver.resolve_move(&board, Player::X).await.unwrap();
    assert_eq!(resolved.index, 8);
}

#[test]
fn test_fallback_reaches_every_empty_cell() {
    let mut resolver = MoveResolver::with_seed(FixedService::failing(), 42);
    let board = board("X.O .X. O..");
    let empty: HashSet<usize> = board.empty_indices().into_iter().collect();

    let seen: HashSet<usize> = (0..500)
        .map(|_| resolver.fallback_move(&board).unwrap())
        .collect();
    assert_eq!(seen, empty);
}

#[test]
fn test_fallback_is_reproducible_with_seed() {
    let board = board("... .X. ...");
    let picks = |seed| {
        let mut resolver = MoveResolver::with_seed(FixedService::failing(), seed);
        (0..20)
            .map(|_| resolver.fallback_move(&board).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(picks(9), picks(9));
}
