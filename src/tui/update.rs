//! State transitions: (App, Action) → Transition.
//!
//! This is the composition logic of the screen. Fully testable without a
//! terminal. Two modes: the dashboard, and the dashboard with the recharge
//! modal on top. Unhandled actions leave the model unchanged.

use rand::Rng;

use crate::notify::RechargeSummary;
use crate::plan::PlanRecord;

use super::state::{Action, App, Effect, Transition};

/// Apply a user action to the model.
pub fn update(app: &mut App, action: &Action) -> Transition {
    if app.modal.is_visible() {
        update_modal(app, action)
    } else {
        update_dashboard(app, action)
    }
}

/// Apply one period from ticker `generation`. Ticks continue while the modal
/// is open.
///
/// Ticks from any generation other than `live_generation` were queued by a
/// cancelled ticker and are dropped. Returns true if consumption changed.
pub fn apply_usage_tick<R: Rng + ?Sized>(
    app: &mut App,
    generation: u64,
    live_generation: u64,
    rng: &mut R,
) -> bool {
    if generation != live_generation {
        tracing::trace!(generation, live_generation, "dropping stale usage tick");
        return false;
    }
    app.engine.tick(rng)
}

/// Swap in a reloaded plan.
///
/// Returns true when the plan total changed and the usage ticker must be
/// cancelled and replaced.
pub fn apply_reloaded_plan(app: &mut App, plan: PlanRecord) -> bool {
    tracing::info!(plan = %plan.plan_name, total_mb = plan.total_data_mb, "plan reloaded");
    app.engine.replace_plan(plan)
}

// ============================================================================
// PER-MODE HANDLERS
// ============================================================================

/// Dashboard: recharge opens the modal.
fn update_dashboard(app: &mut App, action: &Action) -> Transition {
    match action {
        Action::Enter | Action::Recharge => {
            app.modal.show();
            Transition::Continue
        }
        Action::ToggleAppearance => {
            app.appearance = app.appearance.toggled();
            Transition::Continue
        }
        Action::ReloadPlan => Transition::Effect(Effect::ReloadPlan),
        Action::Quit => Transition::Quit,
        Action::Back | Action::Close => Transition::Continue,
    }
}

/// Modal open: any close request finishes the recharge.
fn update_modal(app: &mut App, action: &Action) -> Transition {
    match action {
        Action::Enter | Action::Back | Action::Close => close_modal(app),
        Action::ToggleAppearance => {
            app.appearance = app.appearance.toggled();
            Transition::Continue
        }
        Action::Quit => Transition::Quit,
        Action::Recharge | Action::ReloadPlan => Transition::Continue,
    }
}

/// Reset consumption and hide the modal, then ask for the notification.
///
/// Reset and hide happen here, before the effect is returned, so they are
/// always complete by the time the notification is dispatched.
fn close_modal(app: &mut App) -> Transition {
    app.engine.reset();
    app.modal.dismiss();
    Transition::Effect(Effect::Notify(RechargeSummary::from_plan(app.engine.plan())))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::modal::ModalState;
    use crate::tui::theme::Appearance;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn plan(total: f64, used: f64) -> PlanRecord {
        PlanRecord {
            user_id: "u1".into(),
            user_name: "Alex".into(),
            plan_name: "Daily Data Pack".into(),
            total_data_mb: total,
            initial_used_mb: used,
            currency: "MB".into(),
        }
    }

    fn app_with_used(used: f64) -> App {
        App::new(plan(500.0, used), Appearance::Light)
    }

    // -- Dashboard --

    #[test]
    fn enter_opens_modal() {
        let mut app = app_with_used(100.0);
        assert_eq!(update(&mut app, &Action::Enter), Transition::Continue);
        assert_eq!(app.modal.state(), ModalState::Appearing);
        assert_eq!(app.engine.used_mb(), 100.0, "opening the modal does not reset");
    }

    #[test]
    fn recharge_key_opens_modal() {
        let mut app = app_with_used(0.0);
        update(&mut app, &Action::Recharge);
        assert!(app.modal.is_visible());
    }

    #[test]
    fn dashboard_back_is_noop() {
        let mut app = app_with_used(10.0);
        assert_eq!(update(&mut app, &Action::Back), Transition::Continue);
        assert!(!app.modal.is_visible());
    }

    #[test]
    fn dashboard_quit() {
        let mut app = app_with_used(0.0);
        assert_eq!(update(&mut app, &Action::Quit), Transition::Quit);
    }

    #[test]
    fn reload_plan_requests_effect() {
        let mut app = app_with_used(0.0);
        assert_eq!(
            update(&mut app, &Action::ReloadPlan),
            Transition::Effect(Effect::ReloadPlan)
        );
    }

    #[test]
    fn toggle_appearance_flips_signal() {
        let mut app = app_with_used(0.0);
        update(&mut app, &Action::ToggleAppearance);
        assert_eq!(app.appearance, Appearance::Dark);
        update(&mut app, &Action::ToggleAppearance);
        assert_eq!(app.appearance, Appearance::Light);
    }

    // -- Modal --

    #[test]
    fn close_resets_hides_and_notifies_with_plan_total() {
        let mut app = app_with_used(450.0);
        update(&mut app, &Action::Recharge);

        let transition = update(&mut app, &Action::Close);

        assert_eq!(app.engine.used_mb(), 0.0);
        assert_eq!(app.engine.percentage(), 100.0);
        assert_eq!(app.modal.state(), ModalState::Hidden);
        assert_eq!(
            transition,
            Transition::Effect(Effect::Notify(RechargeSummary {
                user_name: "Alex".into(),
                plan_name: "Daily Data Pack".into(),
                data_mb: 500.0,
            }))
        );
    }

    #[test]
    fn esc_and_enter_also_close() {
        for action in [Action::Back, Action::Enter] {
            let mut app = app_with_used(200.0);
            update(&mut app, &Action::Recharge);
            let transition = update(&mut app, &action);
            assert!(matches!(transition, Transition::Effect(Effect::Notify(_))));
            assert!(!app.modal.is_visible());
        }
    }

    #[test]
    fn recharge_while_open_does_not_restart() {
        let mut app = app_with_used(0.0);
        update(&mut app, &Action::Recharge);
        app.modal.advance(std::time::Duration::from_millis(200));
        let phase = app.modal.phase();
        update(&mut app, &Action::Recharge);
        assert_eq!(app.modal.phase(), phase);
    }

    #[test]
    fn reload_ignored_while_modal_open() {
        let mut app = app_with_used(0.0);
        update(&mut app, &Action::Recharge);
        assert_eq!(update(&mut app, &Action::ReloadPlan), Transition::Continue);
    }

    #[test]
    fn modal_quit() {
        let mut app = app_with_used(0.0);
        update(&mut app, &Action::Recharge);
        assert_eq!(update(&mut app, &Action::Quit), Transition::Quit);
    }

    // -- Ticks --

    #[test]
    fn ticks_accrue_while_modal_open() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut app = app_with_used(0.0);
        update(&mut app, &Action::Recharge);
        assert!(apply_usage_tick(&mut app, 0, 0, &mut rng));
        assert!(app.engine.used_mb() > 0.0);
    }

    #[test]
    fn stale_generation_tick_is_dropped() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut app = app_with_used(40.0);
        assert!(!apply_usage_tick(&mut app, 0, 1, &mut rng));
        assert_eq!(app.engine.used_mb(), 40.0);
    }

    #[test]
    fn total_change_retires_the_old_ticker() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut app = app_with_used(40.0);
        let mut live = 0;

        if apply_reloaded_plan(&mut app, plan(1000.0, 0.0)) {
            live += 1;
        }
        assert_eq!(live, 1, "a new total restarts the ticker");
        assert_eq!(app.engine.plan().total_data_mb, 1000.0);

        // A tick queued by the cancelled ticker changes nothing.
        assert!(!apply_usage_tick(&mut app, 0, live, &mut rng));
        assert_eq!(app.engine.used_mb(), 40.0);

        // The replacement ticker's ticks land.
        assert!(apply_usage_tick(&mut app, live, live, &mut rng));
        assert!(app.engine.used_mb() > 40.0);
    }

    #[test]
    fn same_total_keeps_the_ticker() {
        let mut app = app_with_used(40.0);
        let mut renamed = plan(500.0, 0.0);
        renamed.plan_name = "Weekend Pack".into();
        assert!(!apply_reloaded_plan(&mut app, renamed));
        assert_eq!(app.engine.plan().plan_name, "Weekend Pack");
        assert_eq!(app.engine.used_mb(), 40.0);
    }
}
