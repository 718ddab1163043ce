//! Rival - tic-tac-toe against a language-model opponent
//!
//! A human plays X; O's moves are requested from an LLM and degrade to a
//! uniformly random empty cell whenever the answer is unusable.
//!
//! # Architecture
//!
//! - **Suggestion service**: LLM providers behind the [`SuggestionService`] trait
//! - **Resolver**: prompt, parse, validate, random fallback
//! - **Session**: single-owner actor driving turns, wins and timed resets
//! - **Server**: JSON API over a running session
//!
//! # Example
//!
//! ```no_run
//! use rival::{GameSession, InputEvent, MoveResolver, OfflineService};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = MoveResolver::new(Arc::new(OfflineService));
//! let handle = GameSession::new(resolver, rival::DEFAULT_RESET_DELAY).spawn();
//!
//! handle.send(InputEvent::CellSelected(4)).await?;
//! let snapshot = handle.wait_until_idle().await?;
//! println!("{}", snapshot.status());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod llm_client;
mod resolver;
mod server;
mod session;
mod suggestion;

// Crate-level exports - Configuration
pub use config::{ConfigError, RivalConfig};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Suggestion service
pub use suggestion::{OfflineService, SuggestionService, build_service};

// Crate-level exports - Move resolution
pub use resolver::{
    MoveResolver, MoveSource, ResolvedMove, SuggestionError, build_prompt, parse_suggestion,
    request_suggestion, validate_suggestion,
};

// Crate-level exports - Session
pub use session::{
    AUTOMATED, DEFAULT_RESET_DELAY, GameSession, HUMAN, InputEvent, SessionError, SessionHandle,
    Snapshot,
};

// Crate-level exports - HTTP API
pub use server::{router, serve};
