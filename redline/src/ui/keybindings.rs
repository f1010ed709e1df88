//! Keybinding dispatcher for redline.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop what else to do. Keys that concern the
//! engine (session toggling, recheck, clearing highlights) are not applied
//! here; they come back as [`KeyAction::Dispatch`] so the event loop, which
//! owns the engine, forwards them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use redline_core::EngineEvent;

use crate::app::{AppState, Mode};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug)]
pub enum KeyAction {
    /// Continue the event loop normally.
    Continue,
    /// Exit cleanly.
    Quit,
    /// Forward an event to the engine.
    Dispatch(EngineEvent),
    /// Close the current document. The engine must see the close before the
    /// buffer goes away, so the event loop handles it.
    CloseDocument,
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Tab => {
            state.next_doc();
            KeyAction::Continue
        }
        KeyCode::BackTab => {
            state.prev_doc();
            KeyAction::Continue
        }

        KeyCode::Char(']') => {
            state.next_change();
            KeyAction::Continue
        }
        KeyCode::Char('[') => {
            state.prev_change();
            KeyAction::Continue
        }

        KeyCode::Char('c') => KeyAction::Dispatch(EngineEvent::ClearHighlights),
        KeyCode::Char('s') => {
            if state.session_active {
                KeyAction::Dispatch(EngineEvent::SessionEnd)
            } else {
                KeyAction::Dispatch(EngineEvent::SessionStart)
            }
        }
        KeyCode::Char('r') => match state.current_path() {
            Some(path) => KeyAction::Dispatch(EngineEvent::Recheck(path)),
            None => KeyAction::Continue,
        },
        KeyCode::Char('x') => KeyAction::CloseDocument,

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,

        _ => KeyAction::Continue,
    }
}

/// Handles scroll keys: j / k / g / G and Ctrl-d / Ctrl-u.
///
/// Returns `None` when the key should fall through to the rest of the Normal
/// handler.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') => state.scroll_top(),
        KeyCode::Char('G') => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

/// Any of `?`, `Esc`, or `q` dismisses the overlay; j/k scroll it.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            state.mode = Mode::Normal;
        }
        _ => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn session_key_follows_engine_state() {
        let mut state = AppState::default();
        assert!(matches!(
            handle_key(key(KeyCode::Char('s')), &mut state),
            KeyAction::Dispatch(EngineEvent::SessionStart)
        ));
        state.session_active = true;
        assert!(matches!(
            handle_key(key(KeyCode::Char('s')), &mut state),
            KeyAction::Dispatch(EngineEvent::SessionEnd)
        ));
    }

    #[test]
    fn recheck_without_documents_is_a_no_op() {
        let mut state = AppState::default();
        assert!(matches!(handle_key(key(KeyCode::Char('r')), &mut state), KeyAction::Continue));
    }

    #[test]
    fn help_overlay_swallows_quit() {
        let mut state = AppState::default();
        handle_key(key(KeyCode::Char('?')), &mut state);
        assert_eq!(state.mode, Mode::HelpOverlay);
        assert!(matches!(handle_key(key(KeyCode::Char('q')), &mut state), KeyAction::Continue));
        assert_eq!(state.mode, Mode::Normal);
        assert!(matches!(handle_key(key(KeyCode::Char('q')), &mut state), KeyAction::Quit));
    }
}
