//! TUI module for the interactive usage screen.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: model, events, actions, transitions
//! - `update`: transitions over the model
//! - `view`, `ring`, `modal`: rendering
//! - `theme`: appearance signal and palettes
//! - `run`: effects (terminal, threads, notifications)

pub mod modal;
pub mod ring;
pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;
