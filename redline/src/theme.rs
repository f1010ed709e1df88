//! Color theme system for redline.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! redline renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB and requires
//!   truecolor.
//!
//! Changed-line backgrounds are deliberately muted so syntect's foreground
//! colors stay readable on top of them.

use ratatui::style::Color;

use redline_core::{HighlightTag, NoticeLevel};

/// All color values used across redline's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    // Document view
    /// Background for lines the last reconciliation added.
    pub line_added_bg: Color,
    /// Background for lines the last reconciliation modified.
    pub line_modified_bg: Color,
    /// Line-number gutter.
    pub gutter: Color,
    /// Gutter marker for changed lines.
    pub gutter_changed: Color,
    /// Name of the syntect theme used for syntax colors.
    pub syntax_theme: &'static str,

    // File list
    /// Documents with highlighted lines.
    pub file_changed: Color,
    /// Documents without highlights.
    pub file_clean: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Session indicator while an agent session is active.
    pub status_session: Color,
    pub notice_info: Color,
    pub notice_warn: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            line_added_bg: Color::Rgb(20, 60, 30),
            line_modified_bg: Color::Rgb(70, 60, 10),
            gutter: Color::DarkGray,
            gutter_changed: Color::Yellow,
            syntax_theme: "base16-ocean.dark",

            file_changed: Color::Yellow,
            file_clean: Color::Reset,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_session: Color::Magenta,
            notice_info: Color::Cyan,
            notice_warn: Color::Yellow,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let sky = Color::Rgb(137, 220, 235); // #89dceb
        let peach = Color::Rgb(250, 179, 135); // #fab387
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            // Green and yellow blended toward base (#1e1e2e).
            line_added_bg: Color::Rgb(42, 62, 52),
            line_modified_bg: Color::Rgb(66, 60, 50),
            gutter: overlay1,
            gutter_changed: yellow,
            syntax_theme: "base16-mocha.dark",

            file_changed: yellow,
            file_clean: text,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_session: mauve,
            notice_info: sky,
            notice_warn: peach,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!("unknown theme '{other}', falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Background for a highlighted line.
    pub fn line_bg(&self, tag: HighlightTag) -> Color {
        match tag {
            HighlightTag::Added => self.line_added_bg,
            HighlightTag::Modified => self.line_modified_bg,
        }
    }

    pub fn notice(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Info => self.notice_info,
            NoticeLevel::Warn => self.notice_warn,
        }
    }
}
