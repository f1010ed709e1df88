//! Two-panel layout for redline.
//!
//! Pure layout arithmetic, recomputed on every render so each frame reflects
//! the current terminal size. Below 100 columns the file list collapses and
//! the document fills the full width.
//!
//! `Spacing::Overlap(1)` combined with `Block::merge_borders(MergeStrategy::Fuzzy)`
//! makes adjacent panel borders share a single column.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::AppState;
use crate::theme::Theme;

/// Returns `[file_list, document, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 3] {
    let term_width = frame.area().width;

    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let horizontal = if term_width >= 100 {
        Layout::horizontal([Constraint::Percentage(22), Constraint::Fill(1)]).spacing(Spacing::Overlap(1))
    } else {
        Layout::horizontal([Constraint::Length(0), Constraint::Fill(1)]).spacing(Spacing::Overlap(1))
    };

    let [left, document] = main_area.layout(&horizontal);
    [left, document, status_bar]
}

/// The inner `Rect` of a panel after removing its 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// `MergeStrategy::Fuzzy` because `Exact` produces wrong junctions when mixing
/// `Thick` and `Plain` borders.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar: session indicator, cursor position, and the
/// latest engine notice.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = Vec::new();

    if state.session_active {
        spans.push(Span::styled(
            " SESSION ",
            Style::default().fg(theme.status_session).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled(" IDLE ", Style::default().add_modifier(Modifier::BOLD)));
    }

    if let Some(doc) = state.current_doc() {
        spans.push(Span::raw(format!(" {}:{} ", doc.name(), doc.scroll + 1)));
        if !doc.highlights.is_empty() {
            spans.push(Span::raw(format!("({} changed) ", doc.highlights.len())));
        }
    }

    if let Some((level, message)) = &state.notice {
        spans.push(Span::styled(format!(" {message}"), Style::default().fg(theme.notice(*level))));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
