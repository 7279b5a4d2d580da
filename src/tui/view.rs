//! Pure rendering: map App state to ratatui widget trees.
//!
//! Layout, top to bottom: title bar, greeting, ring, recharge button,
//! footer, help line. The recharge modal is drawn last, over everything.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;

use crate::usage::UsageEngine;

use super::modal::{centered_rect, render_modal};
use super::ring::{Ring, RingGeometry};
use super::state::App;
use super::theme::{self, Palette};

/// Ring dimensions in ring units.
pub const RING_GEOMETRY: RingGeometry = RingGeometry::new(250.0, 20.0);

const BUTTON_LABEL: &str = "RECHARGE DATA";
const FOOTER_TEXT: &str = "Data consumes automatically every second. Press Enter to recharge.";

// ============================================================================
// DISPATCH
// ============================================================================

/// Render the whole screen to the terminal frame.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.palette();

    frame.render_widget(Block::new().style(palette.base()), area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // title
        Constraint::Length(3), // greeting + plan
        Constraint::Min(6),    // ring
        Constraint::Length(3), // button
        Constraint::Length(2), // footer
        Constraint::Length(1), // help
    ])
    .split(area);

    frame.render_widget(render_title(), chunks[0]);
    frame.render_widget(render_header(&app.engine, palette), chunks[1]);
    frame.render_widget(render_ring(&app.engine, palette), chunks[2]);
    render_button(frame, chunks[3]);

    let footer = Paragraph::new(Line::from(FOOTER_TEXT).centered())
        .style(palette.muted())
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    frame.render_widget(render_help(app.modal.is_visible()), chunks[5]);

    render_modal(&app.modal, frame, area);
}

// ============================================================================
// SHARED LAYOUT
// ============================================================================

fn render_title() -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        "recharge-ring",
        Style::new().add_modifier(Modifier::BOLD),
    ))
}

/// Help line showing available keybindings.
fn render_help(modal_open: bool) -> Paragraph<'static> {
    let help_text = if modal_open {
        "[Enter/c/Esc] close  [q] quit"
    } else {
        "[Enter/r] recharge  [t] theme  [L] reload plan  [q] quit"
    };
    Paragraph::new(Span::styled(help_text, theme::STYLE_HELP))
}

// ============================================================================
// DASHBOARD
// ============================================================================

fn render_header<'a>(engine: &'a UsageEngine, palette: &Palette) -> Paragraph<'a> {
    let plan = engine.plan();
    Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Hello, {}", plan.user_name),
            Style::new().fg(palette.text).add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(Span::styled(plan.plan_name.as_str(), palette.secondary())).centered(),
    ])
    .style(palette.card())
}

/// Text shown inside the ring.
pub fn ring_content(engine: &UsageEngine, palette: &Palette) -> Text<'static> {
    let percentage = engine.percentage();

    if percentage == 0.0 {
        return Text::from(vec![
            Line::from(Span::styled("No", theme::STYLE_URGENT)).centered(),
            Line::from(Span::styled("Data Available", theme::STYLE_URGENT)).centered(),
            Line::from(""),
            Line::from(Span::styled("RECHARGE", palette.muted())).centered(),
            Line::from(Span::styled("NOW", palette.muted())).centered(),
        ]);
    }

    let plan = engine.plan();
    let color = theme::level_color(engine.level());
    Text::from(vec![
        Line::from(Span::styled(
            format!("{}%", percentage.round()),
            Style::new().fg(color).add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(Span::styled("Remaining", palette.muted())).centered(),
        Line::from(Span::styled(
            format!(
                "{:.1} {} / {} {}",
                engine.used_mb(),
                plan.currency,
                plan.total_data_mb,
                plan.currency
            ),
            palette.muted(),
        ))
        .centered(),
    ])
}

fn render_ring(engine: &UsageEngine, palette: &Palette) -> Ring<'static> {
    Ring::new(RING_GEOMETRY, engine.percentage())
        .color(theme::level_color(engine.level()))
        .track_color(palette.progress_track)
        .content(ring_content(engine, palette))
}

fn render_button(frame: &mut Frame, area: Rect) {
    let button = centered_rect(area, 32, 3);
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(BUTTON_LABEL).centered(),
        Line::from(""),
    ])
    .style(theme::STYLE_BUTTON);
    frame.render_widget(paragraph, button);
}

// ============================================================================
// TESTS
// ============================================================================
