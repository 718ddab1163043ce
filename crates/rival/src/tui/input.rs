//! Keyboard mapping for the terminal UI.

use crossterm::event::KeyCode;
use rival::InputEvent;
use rival_tictactoe::Position;

/// What a key press asks the UI to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Leave the UI.
    Quit,
    /// Move the cursor to this position.
    MoveCursor(Position),
    /// Forward an event to the session.
    Send(InputEvent),
    /// Key has no binding.
    Ignore,
}

/// Moves cursor based on arrow keys, stopping at the board edges.
pub fn move_cursor(cursor: Position, key: KeyCode) -> Position {
    let (row, col) = (cursor.row(), cursor.col());
    let target = match key {
        KeyCode::Up => row.checked_sub(1).map(|r| (r, col)),
        KeyCode::Down => Some((row + 1, col)),
        KeyCode::Left => col.checked_sub(1).map(|c| (row, c)),
        KeyCode::Right => Some((row, col + 1)),
        _ => None,
    };

    target
        .and_then(|(r, c)| Position::from_row_col(r, c))
        .unwrap_or(cursor)
}

/// Maps a key press to an action, given where the cursor is.
///
/// Digits 1-9 select cells 0-8 directly; Enter and Space select the cell
/// under the cursor.
pub fn map_key(key: KeyCode, cursor: Position) -> KeyAction {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
            KeyAction::MoveCursor(move_cursor(cursor, key))
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            KeyAction::Send(InputEvent::CellSelected(cursor.to_index()))
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            KeyAction::Send(InputEvent::CellSelected(index))
        }
        KeyCode::Char('r') => KeyAction::Send(InputEvent::Reset),
        KeyCode::Char('a') => KeyAction::Send(InputEvent::StartAiGame),
        _ => KeyAction::Ignore,
    }
}
