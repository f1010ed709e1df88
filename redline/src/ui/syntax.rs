//! Syntax coloring with syntect.
//!
//! Whole documents are highlighted at once (syntect's parse state runs from the
//! top of the file) and cached on the [`Document`](crate::app::Document) until
//! the next reload.

use std::path::Path;
use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::SyntaxSet;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Highlights every line of a file, falling back to plain text when the
/// syntax or theme is unknown.
pub fn highlight(path: &Path, lines: &[String], theme_name: &str) -> Vec<Line<'static>> {
    let Some(theme) = TS.themes.get(theme_name).or_else(|| TS.themes.values().next()) else {
        return lines.iter().map(|l| Line::raw(l.clone())).collect();
    };
    let syntax = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| PS.find_syntax_by_extension(ext))
        .unwrap_or_else(|| PS.find_syntax_plain_text());

    let mut h = HighlightLines::new(syntax, theme);
    lines
        .iter()
        .map(|line| {
            // The newline-aware syntax set expects terminated lines.
            let code = format!("{line}\n");
            let spans: Vec<Span<'static>> = match h.highlight_line(&code, &PS) {
                Ok(ranges) => ranges
                    .into_iter()
                    .map(|(style, text)| to_span(style, text.trim_end_matches('\n')))
                    .filter(|s| !s.content.is_empty())
                    .collect(),
                Err(e) => {
                    tracing::debug!("syntect failed on {}: {e}", path.display());
                    vec![Span::raw(line.clone())]
                }
            };
            Line::from(spans)
        })
        .collect()
}

/// Converts a syntect style into an owned ratatui span. The background is left
/// unset so changed-line backgrounds can be layered on top.
fn to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    let fg = style.foreground;
    let mut out = Style::default();
    if fg.a > 0 {
        out = out.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_styled_line_per_input_line() {
        let lines = vec!["fn main() {".to_owned(), "}".to_owned(), String::new()];
        let styled = highlight(Path::new("x.rs"), &lines, "base16-ocean.dark");
        assert_eq!(styled.len(), 3);
        let text: String = styled[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "fn main() {");
    }

    #[test]
    fn unknown_extension_falls_back_to_plain_text() {
        let lines = vec!["hello".to_owned()];
        let styled = highlight(Path::new("notes.zzz"), &lines, "no-such-theme");
        assert_eq!(styled.len(), 1);
    }
}
