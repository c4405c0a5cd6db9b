//! Key event mapping
//!
//! Translates raw terminal key events into dashboard actions. The mapping
//! is stateless; whether an action is currently allowed (amount input
//! disabled, modal notice up) is the controller's decision.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Semantic dashboard actions produced from key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Connect,
    Refresh,
    SelectNext,
    SelectPrev,
    ToggleSelect,
    Borrow,
    Repay,
    AmountChar(char),
    AmountBackspace,
    Dismiss,
    Quit,
}

/// Maps a key event to an action, if any
///
/// Only key presses are mapped; release and repeat events from terminals
/// that report them are ignored.
pub fn map_key(event: KeyEvent) -> Option<UiAction> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Some(UiAction::Quit);
    }

    match event.code {
        KeyCode::Char('q') => Some(UiAction::Quit),
        KeyCode::Char('c') => Some(UiAction::Connect),
        KeyCode::Char('g') => Some(UiAction::Refresh),
        KeyCode::Char('b') => Some(UiAction::Borrow),
        KeyCode::Char('r') => Some(UiAction::Repay),
        KeyCode::Down | KeyCode::Right => Some(UiAction::SelectNext),
        KeyCode::Up | KeyCode::Left => Some(UiAction::SelectPrev),
        KeyCode::Enter => Some(UiAction::ToggleSelect),
        KeyCode::Esc => Some(UiAction::Dismiss),
        KeyCode::Backspace => Some(UiAction::AmountBackspace),
        KeyCode::Char(ch) if ch.is_ascii_digit() || ch == '.' => Some(UiAction::AmountChar(ch)),
        _ => None,
    }
}
