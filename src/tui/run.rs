//! TUI effects boundary: event loop, terminal lifecycle, key mapping.
//!
//! This is the only module with side effects. It wires the pure layers
//! (state, update, view) to the real terminal via crossterm and ratatui.
//!
//! Architecture: two producer threads feed a single mpsc channel.
//! - Key reader thread: forwards crossterm key and resize events
//! - Usage ticker thread: one `UsageTick` per second
//!
//! While the modal animates, the loop also wakes on a frame timeout to
//! advance the animation clock. Notifications run on their own worker
//! threads and never report back to the loop.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::notify::{NotificationPlatform, RechargeNotifier};
use crate::plan::load_plan;
use crate::usage::TICK_INTERVAL;

use super::state::{Action, App, AppEvent, Effect, Transition};
use super::update::{apply_reloaded_plan, apply_usage_tick, update};
use super::view::render;

/// Redraw period while the modal's entry animation runs.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

// ============================================================================
// KEY MAPPING
// ============================================================================

/// Map a crossterm key event to a semantic Action.
///
/// Returns None for keys that don't map to any action.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Enter => Some(Action::Enter),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('r') => Some(Action::Recharge),
        KeyCode::Char('c') => Some(Action::Close),
        KeyCode::Char('t') => Some(Action::ToggleAppearance),
        KeyCode::Char('L') => Some(Action::ReloadPlan),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Set up the terminal for TUI mode.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

// ============================================================================
// BACKGROUND THREADS
// ============================================================================

/// Spawn a thread that reads crossterm events and forwards them to the channel.
fn spawn_key_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(Event::Resize(..)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "terminal event read failed");
                    break;
                }
            };
            if tx.send(forwarded).is_err() {
                break; // receiver dropped, TUI is shutting down
            }
        }
    });
}

/// Handle on the 1-second usage ticker thread.
///
/// Dropping the handle cancels the ticker. Its thread exits at the next
/// period boundary without sending.
pub struct UsageTicker {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl UsageTicker {
    pub fn start(generation: u64, tx: mpsc::Sender<AppEvent>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        thread::spawn(move || {
            loop {
                thread::sleep(TICK_INTERVAL);
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                if tx.send(AppEvent::UsageTick { generation }).is_err() {
                    break;
                }
            }
        });
        tracing::debug!(generation, "usage ticker started");
        UsageTicker { generation, cancelled }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel this ticker and start its successor.
    pub fn restart(&mut self, tx: mpsc::Sender<AppEvent>) {
        *self = UsageTicker::start(self.generation + 1, tx);
    }
}

impl Drop for UsageTicker {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        tracing::debug!(generation = self.generation, "usage ticker cancelled");
    }
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Run the TUI until the user quits.
///
/// `plan_path` is re-read on the reload action; None means the built-in
/// plan.
pub fn run<P>(
    mut app: App,
    notifier: Arc<RechargeNotifier<P>>,
    plan_path: Option<PathBuf>,
) -> io::Result<()>
where
    P: NotificationPlatform + 'static,
{
    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let (tx, rx) = mpsc::channel::<AppEvent>();

    spawn_key_reader(tx.clone());
    let mut ticker = UsageTicker::start(0, tx.clone());

    let mut rng = rand::rng();
    let mut last_frame = Instant::now();

    tracing::info!(plan = %app.engine.plan().plan_name, "screen started");

    loop {
        terminal.draw(|frame| render(&app, frame))?;

        if app.should_quit {
            break;
        }

        let event = if app.modal.is_animating() {
            match rx.recv_timeout(FRAME_INTERVAL) {
                Ok(e) => Some(e),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(e) => Some(e),
                Err(_) => break, // all senders dropped
            }
        };

        let now = Instant::now();
        app.modal.advance(now - last_frame);
        last_frame = now;

        match event {
            Some(AppEvent::Key(key)) => {
                if let Some(action) = map_key(key) {
                    match update(&mut app, &action) {
                        Transition::Continue => {}
                        Transition::Quit => app.should_quit = true,
                        Transition::Effect(effect) => {
                            handle_effect(effect, &mut app, &notifier, plan_path.as_ref(), &mut ticker, &tx);
                        }
                    }
                }
            }
            Some(AppEvent::UsageTick { generation }) => {
                apply_usage_tick(&mut app, generation, ticker.generation(), &mut rng);
            }
            Some(AppEvent::Resize) | None => {}
        }
    }

    drop(ticker);
    restore_terminal()?;
    tracing::info!("screen closed");
    Ok(())
}

// ============================================================================
// EFFECT HANDLING
// ============================================================================

/// Handle a side effect requested by a transition.
fn handle_effect<P>(
    effect: Effect,
    app: &mut App,
    notifier: &Arc<RechargeNotifier<P>>,
    plan_path: Option<&PathBuf>,
    ticker: &mut UsageTicker,
    tx: &mpsc::Sender<AppEvent>,
) where
    P: NotificationPlatform + 'static,
{
    match effect {
        Effect::Notify(summary) => {
            // Fire-and-forget: the screen never waits on the notifier.
            let notifier = Arc::clone(notifier);
            thread::spawn(move || {
                let outcome = notifier.show_recharge_notification(&summary);
                tracing::debug!(shown = outcome.is_shown(), "notification worker finished");
            });
        }
        Effect::ReloadPlan => match load_plan(plan_path.map(PathBuf::as_path)) {
            Ok(plan) => {
                if apply_reloaded_plan(app, plan) {
                    ticker.restart(tx.clone());
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "plan reload failed, keeping current plan");
            }
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================
