//! Document panel renderer for redline.
//!
//! Renders the current document with manual virtual scrolling: only
//! `styled[scroll..scroll+viewport_height]` becomes list items per frame.
//! Highlighted lines get a full-width background and a gutter marker.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};
use crate::ui::syntax;

pub fn render_document(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let inner = inner_rect(area);
    let viewport_height = inner.height as usize;

    let Some(doc) = state.current_doc_mut() else {
        frame.render_widget(panel_block("Document", true, theme), area);
        frame.render_widget(List::new(vec![ListItem::new(Line::raw("No document open."))]), inner);
        return;
    };

    let title = doc.path.display().to_string();
    frame.render_widget(panel_block(&title, true, theme), area);

    if doc.styled.is_none() {
        doc.styled = Some(syntax::highlight(&doc.path, &doc.lines, theme.syntax_theme));
    }
    let Some(styled) = doc.styled.as_ref() else {
        return;
    };

    let total = styled.len();
    let start = doc.scroll.min(total.saturating_sub(1));
    let end = (start + viewport_height).min(total);
    let number_width = total.max(1).to_string().len();

    let items: Vec<ListItem> = styled[start..end]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let number = start + offset + 1;
            let tag = doc.highlights.get(&number).copied();
            let (marker, gutter_color) = match tag {
                Some(_) => ("▌", theme.gutter_changed),
                None => (" ", theme.gutter),
            };
            let mut spans = vec![Span::styled(
                format!("{number:>number_width$}{marker}"),
                Style::default().fg(gutter_color),
            )];
            spans.extend(line.spans.iter().cloned());
            let item = ListItem::new(Line::from(spans));
            match tag {
                Some(tag) => item.style(Style::default().bg(theme.line_bg(tag))),
                None => item,
            }
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}
