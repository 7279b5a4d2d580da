//! Circular progress ring.
//!
//! Two concentric arcs on a Braille canvas: a full-circle track and a
//! progress arc that starts at twelve o'clock and sweeps clockwise with
//! rounded caps. Optional text is centered on top of both.
//!
//! Geometry is in abstract units: a ring of `size` fits a `size` x `size`
//! canvas, and the stroke is centered on radius `(size - stroke) / 2`.
//! The widget maps that square onto a terminal area twice as wide as it is
//! tall, which keeps Braille dots (2x4 per cell) roughly square.

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::text::Text;
use ratatui::widgets::canvas::{Canvas, Painter, Shape};
use ratatui::widgets::{Paragraph, Widget};

/// Distance between samples along an arc, in ring units.
const ARC_STEP: f64 = 0.5;

/// Distance between concentric passes across the stroke, in ring units.
const RADIAL_STEP: f64 = 1.0;

// ============================================================================
// GEOMETRY
// ============================================================================

/// Size and stroke of a ring, and the dash arithmetic derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub size: f64,
    pub stroke_width: f64,
}

impl RingGeometry {
    pub const fn new(size: f64, stroke_width: f64) -> Self {
        RingGeometry { size, stroke_width }
    }

    pub fn radius(&self) -> f64 {
        ((self.size - self.stroke_width) / 2.0).max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.size / 2.0, self.size / 2.0)
    }

    pub fn circumference(&self) -> f64 {
        self.radius() * TAU
    }

    /// Hidden length of the progress dash at `percentage`.
    pub fn dash_offset(&self, percentage: f64) -> f64 {
        let c = self.circumference();
        c - clamp_percentage(percentage) / 100.0 * c
    }

    /// Drawn length of the progress arc at `percentage`.
    pub fn visible_length(&self, percentage: f64) -> f64 {
        self.circumference() - self.dash_offset(percentage)
    }
}

fn clamp_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    }
}

// ============================================================================
// ARC SHAPE
// ============================================================================

/// A thick arc starting at the top and running clockwise.
#[derive(Debug, Clone, Copy)]
struct Arc {
    center: (f64, f64),
    radius: f64,
    stroke: f64,
    /// Fraction of the full circle, in [0, 1].
    sweep: f64,
    round_caps: bool,
    color: Color,
}

impl Arc {
    /// Point at fraction `t` of the circle on a circle of radius `r`.
    fn point(&self, r: f64, t: f64) -> (f64, f64) {
        let angle = FRAC_PI_2 - TAU * t;
        (self.center.0 + r * angle.cos(), self.center.1 + r * angle.sin())
    }

    fn plot(&self, painter: &mut Painter, x: f64, y: f64) {
        if let Some((px, py)) = painter.get_point(x, y) {
            painter.paint(px, py, self.color);
        }
    }

    fn draw_cap(&self, painter: &mut Painter, t: f64) {
        let half = self.stroke / 2.0;
        let (cx, cy) = self.point(self.radius, t);
        let steps = (half / ARC_STEP).ceil() as i64;
        for i in -steps..=steps {
            for j in -steps..=steps {
                let dx = i as f64 * ARC_STEP;
                let dy = j as f64 * ARC_STEP;
                if dx * dx + dy * dy <= half * half {
                    self.plot(painter, cx + dx, cy + dy);
                }
            }
        }
    }
}

impl Shape for Arc {
    fn draw(&self, painter: &mut Painter) {
        if self.sweep <= 0.0 || self.radius <= 0.0 {
            return;
        }

        let half = self.stroke / 2.0;
        let passes = (self.stroke / RADIAL_STEP).ceil().max(1.0) as usize;
        let outer_len = self.sweep * TAU * (self.radius + half);
        let samples = (outer_len / ARC_STEP).ceil().max(1.0) as usize;

        for p in 0..=passes {
            let r = self.radius - half + self.stroke * p as f64 / passes as f64;
            for s in 0..=samples {
                let t = self.sweep * s as f64 / samples as f64;
                let (x, y) = self.point(r, t);
                self.plot(painter, x, y);
            }
        }

        if self.round_caps && self.sweep < 1.0 {
            self.draw_cap(painter, 0.0);
            self.draw_cap(painter, self.sweep);
        }
    }
}

// ============================================================================
// WIDGET
// ============================================================================

/// Ring widget. Stateless: everything comes from its inputs.
#[derive(Debug, Clone)]
pub struct Ring<'a> {
    geometry: RingGeometry,
    percentage: f64,
    color: Color,
    track_color: Color,
    content: Option<Text<'a>>,
}

impl<'a> Ring<'a> {
    pub fn new(geometry: RingGeometry, percentage: f64) -> Self {
        Ring {
            geometry,
            percentage: clamp_percentage(percentage),
            color: Color::Green,
            track_color: Color::DarkGray,
            content: None,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn track_color(mut self, color: Color) -> Self {
        self.track_color = color;
        self
    }

    /// Text drawn at the center, independent of the arcs.
    pub fn content(mut self, content: impl Into<Text<'a>>) -> Self {
        self.content = Some(content.into());
        self
    }

    fn arc(&self, sweep: f64, color: Color, round_caps: bool) -> Arc {
        Arc {
            center: self.geometry.center(),
            radius: self.geometry.radius(),
            stroke: self.geometry.stroke_width,
            sweep,
            round_caps,
            color,
        }
    }
}

/// Largest 2:1 (width:height) rect centered in `area`.
pub fn ring_area(area: Rect) -> Rect {
    let height = area.height.min(area.width / 2);
    let width = height * 2;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Widget for Ring<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let square = ring_area(area);
        if square.is_empty() {
            return;
        }

        let size = self.geometry.size;
        let sweep = self.geometry.visible_length(self.percentage) / self.geometry.circumference().max(f64::EPSILON);
        let track = self.arc(1.0, self.track_color, false);
        let progress = self.arc(sweep, self.color, true);

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, size])
            .y_bounds([0.0, size])
            .paint(|ctx| {
                ctx.draw(&track);
                ctx.layer();
                ctx.draw(&progress);
            })
            .render(square, buf);

        if let Some(content) = self.content {
            let height = (content.height() as u16).min(square.height);
            let inset = ((self.geometry.stroke_width / size) * square.width as f64).ceil() as u16 + 1;
            let width = square.width.saturating_sub(inset * 2);
            let inner = Rect {
                x: square.x + (square.width - width) / 2,
                y: square.y + (square.height - height) / 2,
                width,
                height,
            };
            Paragraph::new(content)
                .alignment(Alignment::Center)
                .render(inner, buf);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
