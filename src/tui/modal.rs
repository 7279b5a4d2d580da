//! Recharge confirmation modal.
//!
//! Visibility plus a two-phase entry animation, driven by an explicit clock:
//!
//! ```text
//! Idle ──show()──▶ BadgeIn ──(600ms)──▶ CheckIn ──(300ms)──▶ Complete
//!   ▲                                                           │
//!   └──────────────────────── dismiss() ◀───────────────────────┘
//! ```
//!
//! The badge scales in with an elastic overshoot; the checkmark only starts
//! once the badge has finished, fading and scaling in with a cubic ease-out.
//! Calling `show()` again restarts both phases. Dismissal is immediate.
//!
//! The modal does not know what closing means. The composition layer owns
//! the reset and the notification.

use std::f64::consts::TAU;
use std::time::Duration;

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::theme;

/// Duration of the badge scale-in.
pub const BADGE_IN: Duration = Duration::from_millis(600);

/// Duration of the checkmark fade/scale-in.
pub const CHECK_IN: Duration = Duration::from_millis(300);

pub const MODAL_TITLE: &str = "Payment successful!";
pub const MODAL_MESSAGE: &str = "Thank you, your payment has been successfully processed.";

// ============================================================================
// STATE
// ============================================================================

/// Entry animation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationPhase {
    #[default]
    Idle,
    BadgeIn { elapsed: Duration },
    CheckIn { elapsed: Duration },
    Complete,
}

/// Externally observable modal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Hidden,
    /// Visible, entry animation still running.
    Appearing,
    /// Visible, animation finished.
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RechargeModal {
    visible: bool,
    phase: AnimationPhase,
}

impl RechargeModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the modal visible and restart the entry animation from zero.
    pub fn show(&mut self) {
        self.visible = true;
        self.phase = AnimationPhase::BadgeIn {
            elapsed: Duration::ZERO,
        };
    }

    /// Hide immediately. Returns whether the modal was visible.
    pub fn dismiss(&mut self) -> bool {
        let was_visible = self.visible;
        self.visible = false;
        self.phase = AnimationPhase::Idle;
        was_visible
    }

    pub fn state(&self) -> ModalState {
        match (self.visible, self.phase) {
            (false, _) => ModalState::Hidden,
            (true, AnimationPhase::Complete) => ModalState::Visible,
            (true, _) => ModalState::Appearing,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_animating(&self) -> bool {
        self.state() == ModalState::Appearing
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Advance the animation clock by `dt`.
    ///
    /// Time left over when the badge finishes is carried into the checkmark
    /// phase.
    pub fn advance(&mut self, dt: Duration) {
        let mut remaining = dt;
        loop {
            match self.phase {
                AnimationPhase::Idle | AnimationPhase::Complete => return,
                AnimationPhase::BadgeIn { elapsed } => {
                    let total = elapsed + remaining;
                    if total < BADGE_IN {
                        self.phase = AnimationPhase::BadgeIn { elapsed: total };
                        return;
                    }
                    remaining = total - BADGE_IN;
                    self.phase = AnimationPhase::CheckIn {
                        elapsed: Duration::ZERO,
                    };
                }
                AnimationPhase::CheckIn { elapsed } => {
                    let total = elapsed + remaining;
                    self.phase = if total < CHECK_IN {
                        AnimationPhase::CheckIn { elapsed: total }
                    } else {
                        AnimationPhase::Complete
                    };
                    return;
                }
            }
        }
    }

    /// Badge scale; overshoots 1.0 while springing in.
    pub fn badge_scale(&self) -> f64 {
        match self.phase {
            AnimationPhase::Idle => 0.0,
            AnimationPhase::BadgeIn { elapsed } => ease_out_elastic(fraction(elapsed, BADGE_IN)),
            AnimationPhase::CheckIn { .. } | AnimationPhase::Complete => 1.0,
        }
    }

    /// Checkmark progress in [0, 1]; drives both opacity and scale.
    pub fn check_progress(&self) -> f64 {
        match self.phase {
            AnimationPhase::Idle | AnimationPhase::BadgeIn { .. } => 0.0,
            AnimationPhase::CheckIn { elapsed } => ease_out_cubic(fraction(elapsed, CHECK_IN)),
            AnimationPhase::Complete => 1.0,
        }
    }
}

fn fraction(elapsed: Duration, total: Duration) -> f64 {
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

// ============================================================================
// EASING
// ============================================================================

/// Elastic ease-out: overshoots, then settles at 1.
pub fn ease_out_elastic(t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let c4 = TAU / 3.0;
    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
}

/// Cubic ease-out: fast start, decelerating finish.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

// ============================================================================
// RENDERING
// ============================================================================

/// Card size in cells.
const CARD_WIDTH: u16 = 44;
const CARD_HEIGHT: u16 = 12;

/// Badge canvas mirrors a 24x24 icon: circle r=11, check "M7 12l3 3 7-7".
const ICON_SIZE: f64 = 24.0;
const ICON_RADIUS: f64 = 11.0;
const CHECK_POINTS: [(f64, f64); 3] = [(7.0, 12.0), (10.0, 15.0), (17.0, 8.0)];

/// Center a `width` x `height` rect in `area`, shrinking to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Draw the modal over whatever is already in the frame. No-op when hidden.
pub fn render_modal(modal: &RechargeModal, frame: &mut Frame, area: Rect) {
    if !modal.is_visible() {
        return;
    }

    frame.buffer_mut().set_style(area, theme::STYLE_OVERLAY);

    let card = centered_rect(area, CARD_WIDTH, CARD_HEIGHT);
    frame.render_widget(Clear, card);

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .style(theme::STYLE_MODAL);
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let rows = Layout::vertical([
        Constraint::Length(1), // title
        Constraint::Length(1),
        Constraint::Length(4), // badge + message
        Constraint::Min(0),
        Constraint::Length(1), // close
    ])
    .split(inner);

    let title = Paragraph::new(Span::styled(MODAL_TITLE, theme::STYLE_MODAL_TITLE))
        .alignment(Alignment::Center);
    frame.render_widget(title, rows[0]);

    let message_row = Layout::horizontal([
        Constraint::Length(8), // badge
        Constraint::Length(1),
        Constraint::Min(0), // message
    ])
    .split(rows[2]);

    frame.render_widget(badge_canvas(modal), message_row[0]);

    let message = Paragraph::new(MODAL_MESSAGE)
        .style(theme::STYLE_MODAL)
        .wrap(Wrap { trim: true });
    frame.render_widget(message, message_row[2]);

    let close = Paragraph::new(Line::from("Close").centered()).style(theme::STYLE_CLOSE_BUTTON);
    frame.render_widget(close, rows[4]);
}

/// Color of the checkmark at a given progress, emulating a fade.
fn check_color(progress: f64) -> Option<Color> {
    if progress < 0.35 {
        None
    } else if progress < 0.7 {
        Some(Color::Gray)
    } else {
        Some(theme::COLOR_BADGE)
    }
}

fn badge_canvas(modal: &RechargeModal) -> Canvas<'static, impl Fn(&mut Context)> {
    let badge_scale = modal.badge_scale();
    let check_progress = modal.check_progress();
    let center = ICON_SIZE / 2.0;

    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, ICON_SIZE])
        .y_bounds([0.0, ICON_SIZE])
        .paint(move |ctx| {
            if badge_scale > 0.0 {
                ctx.draw(&Circle {
                    x: center,
                    y: center,
                    radius: ICON_RADIUS * badge_scale,
                    color: theme::COLOR_BADGE,
                });
            }

            let Some(color) = check_color(check_progress) else {
                return;
            };
            let scale = 0.5 + 0.5 * check_progress;
            // Icon coordinates are y-down; the canvas is y-up.
            let points = CHECK_POINTS.map(|(x, y)| {
                (
                    center + (x - center) * scale,
                    center - (y - center) * scale,
                )
            });
            for pair in points.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].0,
                    y1: pair[0].1,
                    x2: pair[1].0,
                    y2: pair[1].1,
                    color,
                });
            }
        })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // -- state machine --

    #[test]
    fn starts_hidden_and_idle() {
        let modal = RechargeModal::new();
        assert_eq!(modal.state(), ModalState::Hidden);
        assert_eq!(modal.phase(), AnimationPhase::Idle);
        assert_eq!(modal.badge_scale(), 0.0);
    }

    #[test]
    fn show_starts_badge_phase() {
        let mut modal = RechargeModal::new();
        modal.show();
        assert_eq!(modal.state(), ModalState::Appearing);
        assert_eq!(modal.phase(), AnimationPhase::BadgeIn { elapsed: Duration::ZERO });
        assert!(modal.is_animating());
    }

    #[test]
    fn checkmark_waits_for_badge() {
        let mut modal = RechargeModal::new();
        modal.show();
        modal.advance(ms(599));
        assert!(matches!(modal.phase(), AnimationPhase::BadgeIn { .. }));
        assert_eq!(modal.check_progress(), 0.0);

        modal.advance(ms(1));
        assert_eq!(modal.phase(), AnimationPhase::CheckIn { elapsed: Duration::ZERO });
        assert_eq!(modal.badge_scale(), 1.0);
    }

    #[test]
    fn leftover_time_carries_into_checkmark() {
        let mut modal = RechargeModal::new();
        modal.show();
        modal.advance(ms(700));
        assert_eq!(modal.phase(), AnimationPhase::CheckIn { elapsed: ms(100) });
        assert!(modal.check_progress() > 0.0 && modal.check_progress() < 1.0);
    }

    #[test]
    fn full_duration_completes() {
        let mut modal = RechargeModal::new();
        modal.show();
        modal.advance(BADGE_IN + CHECK_IN);
        assert_eq!(modal.phase(), AnimationPhase::Complete);
        assert_eq!(modal.state(), ModalState::Visible);
        assert_eq!(modal.check_progress(), 1.0);
        assert!(!modal.is_animating());

        modal.advance(ms(500));
        assert_eq!(modal.phase(), AnimationPhase::Complete);
    }

    #[test]
    fn show_again_restarts_animation() {
        let mut modal = RechargeModal::new();
        modal.show();
        modal.advance(ms(2000));
        modal.show();
        assert_eq!(modal.phase(), AnimationPhase::BadgeIn { elapsed: Duration::ZERO });
        assert_eq!(modal.check_progress(), 0.0);
    }

    #[test]
    fn dismiss_hides_immediately() {
        let mut modal = RechargeModal::new();
        modal.show();
        modal.advance(ms(100));
        assert!(modal.dismiss());
        assert_eq!(modal.state(), ModalState::Hidden);
        assert_eq!(modal.phase(), AnimationPhase::Idle);
        assert!(!modal.dismiss(), "second dismiss reports not visible");
    }

    #[test]
    fn idle_clock_does_nothing() {
        let mut modal = RechargeModal::new();
        modal.advance(ms(1000));
        assert_eq!(modal.phase(), AnimationPhase::Idle);
    }

    // -- easing --

    #[test]
    fn elastic_easing_endpoints_and_overshoot() {
        assert_eq!(ease_out_elastic(0.0), 0.0);
        assert_eq!(ease_out_elastic(1.0), 1.0);
        let peak = (1..100)
            .map(|i| ease_out_elastic(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0, "elastic easing should overshoot, peak {}", peak);
    }

    #[test]
    fn cubic_easing_decelerates() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        let first_half = ease_out_cubic(0.5) - ease_out_cubic(0.0);
        let second_half = ease_out_cubic(1.0) - ease_out_cubic(0.5);
        assert!(first_half > second_half);
    }

    // -- rendering --

    fn render_to_string(modal: &RechargeModal) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|frame| render_modal(modal, frame, frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol().to_string())
            .collect()
    }

    #[test]
    fn hidden_modal_draws_nothing() {
        let content = render_to_string(&RechargeModal::new());
        assert!(!content.contains("Payment"));
    }

    #[test]
    fn visible_modal_shows_title_and_close() {
        let mut modal = RechargeModal::new();
        modal.show();
        modal.advance(BADGE_IN + CHECK_IN);
        let content = render_to_string(&modal);
        assert!(content.contains(MODAL_TITLE));
        assert!(content.contains("Close"));
        assert!(content.contains("Thank you"));
    }

    #[test]
    fn check_color_fades_in() {
        assert_eq!(check_color(0.0), None);
        assert_eq!(check_color(0.5), Some(Color::Gray));
        assert_eq!(check_color(1.0), Some(theme::COLOR_BADGE));
    }

    #[test]
    fn centered_rect_shrinks_to_fit() {
        let r = centered_rect(Rect::new(0, 0, 30, 8), CARD_WIDTH, CARD_HEIGHT);
        assert_eq!(r, Rect::new(0, 0, 30, 8));
        let r = centered_rect(Rect::new(0, 0, 60, 20), 40, 10);
        assert_eq!(r, Rect::new(10, 5, 40, 10));
    }
}
