//! Help overlay renderer for redline.
//!
//! Draws a centred modal over the panel layout. `Clear` erases the background
//! first, inside the same `terminal.draw()` closure as every other panel.

use ratatui::{
    Frame,
    layout::Constraint,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled vertically by `help_scroll` rows.
///
/// Skipped on terminals narrower than 50 columns, where the centred area would
/// collapse.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 50 {
        return;
    }

    let overlay_area = frame.area().centered(Constraint::Percentage(70), Constraint::Percentage(70));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help: j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Scroll down / up one line"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from("  [ / ]         Previous / next changed line"),
        Line::from("  Tab / S-Tab   Next / previous document"),
        Line::from(""),
        Line::from("Reconciliation"),
        Line::from("  r             Recheck the current document against disk"),
        Line::from("  c             Clear all change highlights"),
        Line::from("  s             Start / end an agent session"),
        Line::from("  x             Close the current document"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit"),
    ])
}
