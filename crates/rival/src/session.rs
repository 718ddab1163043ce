//! Turn orchestration.
//!
//! A [`GameSession`] is the single owner of the game state. It runs as one
//! task and reacts to three things: input events from a surface, the
//! completion of an in-flight suggestion request, and the timed reset after
//! a win. Surfaces hold a [`SessionHandle`]; they never touch the state.
//!
//! While the automated player's request is in flight it is O's turn, so
//! cell selections arriving in that window are rejected rather than queued.
//! A reset drops the in-flight request, so a stale answer can never land on
//! a fresh board.

use crate::resolver::{MoveResolver, ResolvedMove, SuggestionError, request_suggestion};
use derive_getters::Getters;
use derive_more::{Display, Error};
use rival_tictactoe::{GameOutcome, GameState, Player, Score};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// The player driven by input events.
pub const HUMAN: Player = Player::X;

/// The player whose moves are resolved through the suggestion service.
pub const AUTOMATED: Player = Player::O;

/// Delay between a win and the automatic board reset.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(2000);

const COMMAND_BUFFER: usize = 32;

/// Something a surface asks of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// The human attempted a move at this index.
    CellSelected(usize),
    /// Clear the board; scores are kept.
    Reset,
    /// Start a new game against the automated player.
    StartAiGame,
}

/// Everything a surface needs to draw the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Snapshot {
    /// Mark per cell, row-major.
    cells: [Option<Player>; 9],
    /// Player to move (the winner, once the round is won).
    current_player: Player,
    /// Outcome as of the last accepted move.
    outcome: GameOutcome,
    /// One-line status, e.g. `Current Player: X` or `O Wins!`.
    status: String,
    /// Cumulative wins.
    score: Score,
    /// True while the automated player's move is being resolved.
    thinking: bool,
    /// The automated player's most recent move this round.
    last_automated_move: Option<ResolvedMove>,
}

/// Session error.
#[derive(Debug, Clone, Display, Error)]
#[display("Session error: {} at {}:{}", message, file, line)]
pub struct SessionError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a new session error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// A suggestion request that has finished, with the label it was made for.
struct CompletedSuggestion {
    player: Player,
    result: Result<usize, SuggestionError>,
}

type SuggestionFuture = Pin<Box<dyn Future<Output = CompletedSuggestion> + Send>>;

#[derive(Debug)]
struct Command {
    input: InputEvent,
    reply: oneshot::Sender<Snapshot>,
}

enum Step {
    Command(Command),
    Resolved(CompletedSuggestion),
    TimedReset,
}

/// Owns one game and drives it from input events.
pub struct GameSession {
    state: GameState,
    resolver: MoveResolver,
    reset_delay: Duration,
    pending: Option<SuggestionFuture>,
    reset_at: Option<Instant>,
    last_automated_move: Option<ResolvedMove>,
}

impl GameSession {
    /// Creates a session with a fresh board and zero scores.
    #[instrument(skip(resolver))]
    pub fn new(resolver: MoveResolver, reset_delay: Duration) -> Self {
        info!("Creating game session");
        Self {
            state: GameState::new(),
            resolver,
            reset_delay,
            pending: None,
            reset_at: None,
            last_automated_move: None,
        }
    }

    /// Returns the game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// True while an automated move is being resolved.
    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Captures the current state for display.
    pub fn snapshot(&self) -> Snapshot {
        let thinking = self.is_thinking();
        let status = match self.state.outcome() {
            GameOutcome::Ongoing if thinking => {
                format!("{} is thinking...", self.state.current_player())
            }
            GameOutcome::Ongoing => format!("Current Player: {}", self.state.current_player()),
            decided => decided.to_string(),
        };

        Snapshot {
            cells: self.state.board().marks(),
            current_player: self.state.current_player(),
            outcome: self.state.outcome(),
            status,
            score: self.state.score(),
            thinking,
            last_automated_move: self.last_automated_move,
        }
    }

    /// Applies one input event.
    #[instrument(skip(self))]
    pub fn handle_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::CellSelected(index) => self.select_cell(index),
            InputEvent::Reset => {
                info!("Reset requested");
                self.reset();
            }
            InputEvent::StartAiGame => {
                info!("Starting AI game");
                self.reset();
            }
        }
    }

    /// Clears the board, cancelling any in-flight request and timed reset.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        if self.pending.take().is_some() {
            debug!("Dropping in-flight suggestion request");
        }
        self.reset_at = None;
        self.last_automated_move = None;
        self.state.reset();
    }

    fn select_cell(&mut self, index: usize) {
        match self.state.apply_move(index, HUMAN) {
            Ok(outcome) => {
                debug!(index, %outcome, "Human move applied");
                self.after_move(outcome);
            }
            Err(e) => debug!(index, error = %e, "Cell selection ignored"),
        }
    }

    fn after_move(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win(winner) => {
                self.state.record_win(winner);
                self.reset_at = Some(Instant::now() + self.reset_delay);
                info!(
                    %winner,
                    wins = self.state.score().wins(winner),
                    delay_ms = self.reset_delay.as_millis() as u64,
                    "Round won, board resets after delay"
                );
            }
            GameOutcome::Draw => info!("Round drawn"),
            GameOutcome::Ongoing => {
                if self.state.current_player() == AUTOMATED {
                    self.begin_resolution();
                }
            }
        }
    }

    fn begin_resolution(&mut self) {
        let player = self.state.current_player();
        let board = self.state.board().clone();
        let service = self.resolver.service();
        debug!(%player, "Resolving automated move");

        self.pending = Some(Box::pin(async move {
            let result = request_suggestion(service, board, player).await;
            CompletedSuggestion { player, result }
        }));
    }

    fn complete_resolution(&mut self, completed: CompletedSuggestion) {
        self.pending = None;
        let CompletedSuggestion { player, result } = completed;

        let Some(resolved) = self.resolver.settle(self.state.board(), player, result) else {
            warn!(%player, "No move available for automated player");
            return;
        };

        // Applied under the label the request was made for.
        match self.state.apply_move(resolved.index, player) {
            Ok(outcome) => {
                info!(
                    index = resolved.index,
                    source = %resolved.source,
                    %outcome,
                    "Automated move applied"
                );
                self.last_automated_move = Some(resolved);
                self.after_move(outcome);
            }
            Err(e) => warn!(index = resolved.index, error = %e, "Automated move rejected"),
        }
    }

    /// Starts the session task and returns a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshots_tx, snapshots_rx) = watch::channel(self.snapshot());
        tokio::spawn(self.run(commands_rx, snapshots_tx));
        SessionHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        snapshots: watch::Sender<Snapshot>,
    ) {
        info!("Session started");
        loop {
            let step = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => Step::Command(command),
                    None => break,
                },
                completed = await_suggestion(&mut self.pending) => Step::Resolved(completed),
                () = await_deadline(self.reset_at) => Step::TimedReset,
            };

            match step {
                Step::Command(Command { input, reply }) => {
                    self.handle_input(input);
                    let snapshot = self.snapshot();
                    snapshots.send_replace(snapshot.clone());
                    // The caller may have stopped waiting.
                    let _ = reply.send(snapshot);
                }
                Step::Resolved(completed) => {
                    self.complete_resolution(completed);
                    snapshots.send_replace(self.snapshot());
                }
                Step::TimedReset => {
                    info!("Resetting board after win");
                    self.reset();
                    snapshots.send_replace(self.snapshot());
                }
            }
        }
        info!("Session ended");
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("resolver", &self.resolver)
            .field("reset_delay", &self.reset_delay)
            .field("thinking", &self.is_thinking())
            .field("reset_at", &self.reset_at)
            .finish()
    }
}

async fn await_suggestion(pending: &mut Option<SuggestionFuture>) -> CompletedSuggestion {
    match pending {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

async fn await_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Cloneable handle used by surfaces to drive a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    /// Sends an input event and returns the snapshot right after it was applied.
    ///
    /// # Errors
    ///
    /// Fails only if the session task has stopped.
    #[instrument(skip(self))]
    pub async fn send(&self, input: InputEvent) -> Result<Snapshot, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command {
                input,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::new("Session has stopped"))?;
        reply_rx
            .await
            .map_err(|_| SessionError::new("Session dropped the reply"))
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Waits until no automated move is pending and returns that snapshot.
    ///
    /// # Errors
    ///
    /// Fails only if the session task has stopped.
    pub async fn wait_until_idle(&self) -> Result<Snapshot, SessionError> {
        let mut snapshots = self.subscribe();
        let snapshot = snapshots
            .wait_for(|snapshot| !snapshot.thinking)
            .await
            .map_err(|_| SessionError::new("Session has stopped"))?
            .clone();
        Ok(snapshot)
    }
}
