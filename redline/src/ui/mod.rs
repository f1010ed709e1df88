//! UI rendering module for redline.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! panel has its own module.

mod document_view;
mod file_list;
mod help;
mod layout;
pub mod keybindings;
mod syntax;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame: file list, current document, and status bar.
///
/// The document viewport height is written back into `state` before drawing so
/// half-page scrolls triggered by the next keypress use the current size.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [left, document, status_bar] = compute_layout(frame);
    state.viewport_height = inner_rect(document).height;

    if left.width > 0 {
        file_list::render_file_list(frame, left, state, theme);
    }
    document_view::render_document(frame, document, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
