//! TUI color semantics: appearance signal, palettes, and usage-level colors.
//!
//! Pure data. The model stores only the [`Appearance`]; the [`Palette`] is
//! looked up from it on every render, so flipping the signal recolors the
//! whole screen on the next frame.
//!
//! Color semantics:
//! - Green: nominal usage, success (modal card, recharge button)
//! - Orange: warning band
//! - Red: alert band, exhausted allowance
//! - Dim: de-emphasized labels and help text

use ratatui::style::{Color, Modifier, Style};

use crate::usage::UsageLevel;

// ============================================================================
// APPEARANCE SIGNAL
// ============================================================================

/// Binary light/dark signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

impl Appearance {
    /// Read the terminal's appearance from `COLORFGBG`, defaulting to dark.
    pub fn detect() -> Self {
        Self::from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
    }

    /// Interpret a `COLORFGBG` value ("fg;bg" or "fg;default;bg").
    ///
    /// Background indices 0-6 and 8 are dark colors; 7 and 9-15 are light.
    pub fn from_colorfgbg(value: Option<&str>) -> Self {
        let bg = value
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());
        match bg {
            Some(7) | Some(9..=15) => Appearance::Light,
            _ => Appearance::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Appearance::Light => Appearance::Dark,
            Appearance::Dark => Appearance::Light,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Appearance::Light => &LIGHT,
            Appearance::Dark => &DARK,
        }
    }
}

// ============================================================================
// PALETTES
// ============================================================================

/// Color tokens for one appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub card_background: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    /// Ring track behind the progress arc.
    pub progress_track: Color,
}

pub static LIGHT: Palette = Palette {
    background: Color::Rgb(0xf5, 0xf5, 0xf5),
    card_background: Color::Rgb(0xff, 0xff, 0xff),
    text: Color::Rgb(0x33, 0x33, 0x33),
    text_secondary: Color::Rgb(0x66, 0x66, 0x66),
    text_muted: Color::Rgb(0x88, 0x88, 0x88),
    progress_track: Color::Rgb(0xe0, 0xe0, 0xe0),
};

pub static DARK: Palette = Palette {
    background: Color::Rgb(0x12, 0x12, 0x12),
    card_background: Color::Rgb(0x1e, 0x1e, 0x1e),
    text: Color::Rgb(0xff, 0xff, 0xff),
    text_secondary: Color::Rgb(0xb0, 0xb0, 0xb0),
    text_muted: Color::Rgb(0x88, 0x88, 0x88),
    progress_track: Color::Rgb(0x33, 0x33, 0x33),
};

impl Palette {
    pub fn base(&self) -> Style {
        Style::new().fg(self.text).bg(self.background)
    }

    /// Raised surface behind the greeting.
    pub fn card(&self) -> Style {
        Style::new().fg(self.text).bg(self.card_background)
    }

    pub fn secondary(&self) -> Style {
        Style::new().fg(self.text_secondary)
    }

    pub fn muted(&self) -> Style {
        Style::new().fg(self.text_muted)
    }
}

// ============================================================================
// USAGE LEVEL COLORS
// ============================================================================

pub const COLOR_ALERT: Color = Color::Rgb(0xe7, 0x4c, 0x3c);
pub const COLOR_WARNING: Color = Color::Rgb(0xf3, 0x9c, 0x12);
pub const COLOR_NOMINAL: Color = Color::Rgb(0x2e, 0xcc, 0x71);

/// Progress color for a usage band.
pub fn level_color(level: UsageLevel) -> Color {
    match level {
        UsageLevel::Alert => COLOR_ALERT,
        UsageLevel::Warning => COLOR_WARNING,
        UsageLevel::Nominal => COLOR_NOMINAL,
    }
}

// ============================================================================
// UI ELEMENT STYLES
// ============================================================================

/// Exhausted-allowance headline.
pub const STYLE_URGENT: Style = Style::new().fg(COLOR_ALERT).add_modifier(Modifier::BOLD);

/// Primary action button.
pub const STYLE_BUTTON: Style = Style::new()
    .fg(Color::White)
    .bg(COLOR_NOMINAL)
    .add_modifier(Modifier::BOLD);

/// Modal card surface.
pub const STYLE_MODAL: Style = Style::new().fg(Color::Black).bg(COLOR_NOMINAL);

/// Modal title.
pub const STYLE_MODAL_TITLE: Style = Style::new()
    .fg(Color::Black)
    .bg(COLOR_NOMINAL)
    .add_modifier(Modifier::BOLD);

/// Modal close control.
pub const STYLE_CLOSE_BUTTON: Style = Style::new()
    .fg(Color::Rgb(0x33, 0x33, 0x33))
    .bg(Color::Rgb(0xf5, 0xf5, 0xf5));

/// Success badge drawn in the modal.
pub const COLOR_BADGE: Color = Color::White;

/// Everything behind an open modal.
pub const STYLE_OVERLAY: Style = Style::new().add_modifier(Modifier::DIM);

/// Footer / help line.
pub const STYLE_HELP: Style = Style::new().fg(Color::DarkGray);

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_colors_match_bands() {
        assert_eq!(level_color(UsageLevel::Alert), COLOR_ALERT);
        assert_eq!(level_color(UsageLevel::Warning), COLOR_WARNING);
        assert_eq!(level_color(UsageLevel::Nominal), COLOR_NOMINAL);
    }

    #[test]
    fn appearance_selects_palette() {
        assert_eq!(*Appearance::Light.palette(), LIGHT);
        assert_eq!(*Appearance::Dark.palette(), DARK);
        assert_ne!(LIGHT.background, DARK.background);
    }

    #[test]
    fn card_stands_out_from_background() {
        for palette in [&LIGHT, &DARK] {
            assert_eq!(palette.card().bg, Some(palette.card_background));
            assert_ne!(palette.card().bg, palette.base().bg);
        }
    }

    #[test]
    fn toggling_twice_is_identity() {
        assert_eq!(Appearance::Light.toggled(), Appearance::Dark);
        assert_eq!(Appearance::Light.toggled().toggled(), Appearance::Light);
    }

    #[test]
    fn colorfgbg_parsing() {
        assert_eq!(Appearance::from_colorfgbg(Some("15;0")), Appearance::Dark);
        assert_eq!(Appearance::from_colorfgbg(Some("0;15")), Appearance::Light);
        assert_eq!(Appearance::from_colorfgbg(Some("0;default;7")), Appearance::Light);
        assert_eq!(Appearance::from_colorfgbg(Some("garbage")), Appearance::Dark);
        assert_eq!(Appearance::from_colorfgbg(None), Appearance::Dark);
    }

    #[test]
    fn urgent_style_is_bold_red() {
        assert_eq!(STYLE_URGENT.fg, Some(COLOR_ALERT));
        assert!(STYLE_URGENT.add_modifier.contains(Modifier::BOLD));
    }
}
