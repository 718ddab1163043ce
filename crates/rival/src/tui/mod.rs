//! Terminal UI for rival.
//!
//! The UI is a thin client of a running session: it draws whatever snapshot
//! the session last published and forwards key presses as input events.

mod input;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use input::{KeyAction, map_key};
use ratatui::{Terminal, backend::CrosstermBackend};
use rival::SessionHandle;
use rival_tictactoe::Position;
use std::io;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the terminal UI until the user quits.
pub async fn run_tui(handle: SessionHandle) -> Result<()> {
    info!("Starting rival TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_game_loop(&mut terminal, &handle).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    info!("TUI closed");
    res
}

/// Draws the latest snapshot and forwards keys until quit.
#[instrument(skip_all)]
async fn run_game_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: &SessionHandle,
) -> Result<()> {
    let mut cursor = Position::Center;

    loop {
        let snapshot = handle.snapshot();
        terminal.draw(|frame| ui::draw(frame, &snapshot, cursor))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match map_key(key.code, cursor) {
            KeyAction::Quit => {
                info!("User quit");
                return Ok(());
            }
            KeyAction::MoveCursor(position) => {
                debug!(?position, "Cursor moved");
                cursor = position;
            }
            KeyAction::Send(input) => {
                debug!(?input, "Forwarding input");
                if let Err(e) = handle.send(input).await {
                    warn!(error = %e, "Session stopped");
                    return Err(e.into());
                }
            }
            KeyAction::Ignore => {}
        }
    }
}
