//! Crossterm key events to application key presses.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use lodestar_app::KeyInput;

/// Translate a crossterm key event.
///
/// Releases are dropped. Ctrl-C and Ctrl-D map to [`KeyInput::Esc`], which the
/// application treats as quit.
pub fn map_key(event: KeyEvent) -> Option<KeyInput> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c' | 'd') => Some(KeyInput::Esc),
            _ => None,
        };
    }

    let key = match event.code {
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Delete => KeyInput::Delete,
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::Home => KeyInput::Home,
        KeyCode::End => KeyInput::End,
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Esc => KeyInput::Esc,
        _ => return None,
    };
    Some(key)
}
