//! TUI state algebra: pure types, zero effects.
//!
//! The model owns everything the screen shows: the usage engine, the modal,
//! and the appearance signal. Nothing here is global; the effects layer
//! builds one [`App`] and threads it through `update` and `view`.
//!
//! The palette is not stored. It is looked up from the appearance signal on
//! every render.

use crossterm::event::KeyEvent;

use crate::notify::RechargeSummary;
use crate::plan::PlanRecord;
use crate::usage::UsageEngine;

use super::modal::RechargeModal;
use super::theme::{Appearance, Palette};

// ============================================================================
// APP EVENTS
// ============================================================================

/// Everything the event loop can receive from its channel.
///
/// Two producers feed a single mpsc channel:
/// - A key reader thread sends `Key` and `Resize`
/// - The usage ticker thread sends `UsageTick` once per second
#[derive(Debug)]
pub enum AppEvent {
    /// A terminal key press from the crossterm reader thread.
    Key(KeyEvent),
    /// Terminal was resized; only triggers a redraw.
    Resize,
    /// One period of the usage ticker elapsed.
    ///
    /// `generation` identifies the ticker that sent it. Ticks from a
    /// cancelled ticker are ignored.
    UsageTick { generation: u64 },
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Top-level TUI model.
#[derive(Debug)]
pub struct App {
    pub engine: UsageEngine,
    pub modal: RechargeModal,
    /// Light/dark signal. The palette is derived from it.
    pub appearance: Appearance,
    /// Set to true when the app should exit on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(plan: PlanRecord, appearance: Appearance) -> Self {
        App {
            engine: UsageEngine::new(plan),
            modal: RechargeModal::new(),
            appearance,
            should_quit: false,
        }
    }

    pub fn palette(&self) -> &'static Palette {
        self.appearance.palette()
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Semantic user action, decoupled from raw key events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Enter: recharge on the dashboard, close on the modal.
    Enter,
    /// Esc: platform-style dismiss request.
    Back,
    /// Open the recharge modal.
    Recharge,
    /// Close the recharge modal.
    Close,
    /// Flip the light/dark signal.
    ToggleAppearance,
    /// Re-read the plan file.
    ReloadPlan,
    /// Quit the application.
    Quit,
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of a state transition.
///
/// Follows the Elm/TEA pattern: `update` changes the model and describes
/// side effects; the effects layer executes them.
#[derive(Debug, PartialEq)]
pub enum Transition {
    /// Keep running; redraw.
    Continue,
    Quit,
    Effect(Effect),
}

/// Side effect requested by a transition.
#[derive(Debug, PartialEq)]
pub enum Effect {
    /// Post the recharge notification. Fire-and-forget.
    Notify(RechargeSummary),
    /// Load the plan file again and swap it into the engine.
    ReloadPlan,
}

// ============================================================================
// TESTS
// ============================================================================
