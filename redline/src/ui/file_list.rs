//! File list panel renderer for redline.
//!
//! One row per open document: a change marker, the file name, and the number
//! of lines currently highlighted.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::{AppState, Document};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

pub fn render_file_list(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let title = format!("Files ({})", state.documents.len());
    let block = panel_block(&title, false, theme);

    let items: Vec<ListItem> = if state.documents.is_empty() {
        vec![ListItem::new(Line::raw("No files"))]
    } else {
        state.documents.iter().map(|d| document_item(d, theme)).collect()
    };

    let list = List::new(items).block(block).highlight_style(Style::default().fg(theme.border_active));
    frame.render_stateful_widget(list, area, &mut state.file_list_state);
}

/// Format: `● main.rs  +3` when lines are highlighted, `  main.rs` otherwise.
fn document_item(doc: &Document, theme: &Theme) -> ListItem<'static> {
    let changed = doc.highlights.len();
    let (marker, color) = if changed > 0 { ("● ", theme.file_changed) } else { ("  ", theme.file_clean) };

    let mut spans = vec![Span::styled(marker, Style::default().fg(color)), Span::raw(doc.name())];
    if changed > 0 {
        spans.push(Span::styled(format!("  +{changed}"), Style::default().fg(theme.gutter)));
    }
    ListItem::new(Line::from(spans))
}
