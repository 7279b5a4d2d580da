//! Recharge notification bridge.
//!
//! Three stages, each returning a `Result`:
//! 1. ask the platform for permission
//! 2. create (or reuse the cached) delivery channel
//! 3. display the notification
//!
//! [`RechargeNotifier::show_recharge_notification`] runs the stages in order
//! and folds them into a [`NotifyOutcome`]. Failures are logged and never
//! propagated: the caller only learns what happened, it never has to handle
//! an error.
//!
//! [`SystemNotifier`] is the desktop platform: it shells out to
//! `notify-send` (freedesktop) or `osascript` (macOS).

use std::io;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

use crate::plan::PlanRecord;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Channel every recharge notification is delivered through.
pub const RECHARGE_CHANNEL_ID: &str = "recharge";

/// Human-readable channel name.
pub const RECHARGE_CHANNEL_NAME: &str = "Recharge Notifications";

/// Action identifier attached to a tap on the notification.
pub const DEFAULT_PRESS_ACTION: &str = "default";

/// Application name reported to the desktop notifier.
pub const APP_NAME: &str = "recharge-ring";

// ============================================================================
// PLATFORM TYPES
// ============================================================================

/// Answer to a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    /// Quiet delivery allowed; counts as granted.
    Provisional,
    Denied,
}

impl AuthorizationStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, AuthorizationStatus::Authorized | AuthorizationStatus::Provisional)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Default,
    High,
}

/// Channel configuration handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub importance: Importance,
}

impl ChannelSpec {
    /// The high-importance channel used for recharge confirmations.
    pub fn recharge() -> Self {
        ChannelSpec {
            id: RECHARGE_CHANNEL_ID.to_string(),
            name: RECHARGE_CHANNEL_NAME.to_string(),
            importance: Importance::High,
        }
    }
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub channel_id: String,
    pub importance: Importance,
    pub press_action: String,
}

/// Error raised by a platform stage.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("permission request failed: {0}")]
    Permission(String),

    #[error("channel creation failed: {0}")]
    Channel(String),

    #[error("display failed: {0}")]
    Display(String),

    #[error("no desktop notifier available")]
    Unavailable,
}

/// The platform notification capability.
///
/// Implementations must be shareable across threads: the UI dispatches
/// notifications on worker threads.
pub trait NotificationPlatform: Send + Sync {
    fn request_permission(&self) -> Result<AuthorizationStatus, NotifyError>;

    /// Create the channel, or return the existing one. Returns its id.
    fn create_channel(&self, spec: &ChannelSpec) -> Result<String, NotifyError>;

    /// Show a notification. Returns the platform's notification id.
    fn display(&self, notification: &Notification) -> Result<String, NotifyError>;
}

// ============================================================================
// RECHARGE CONTENT
// ============================================================================

/// What the notification reports about a recharge.
#[derive(Debug, Clone, PartialEq)]
pub struct RechargeSummary {
    pub user_name: String,
    pub plan_name: String,
    pub data_mb: f64,
}

impl RechargeSummary {
    /// Summary for a full recharge of `plan`. The amount is the plan total.
    pub fn from_plan(plan: &PlanRecord) -> Self {
        RechargeSummary {
            user_name: plan.user_name.clone(),
            plan_name: plan.plan_name.clone(),
            data_mb: plan.total_data_mb,
        }
    }
}

/// Build the recharge notification for `summary` on `channel_id`.
pub fn recharge_notification(summary: &RechargeSummary, channel_id: &str) -> Notification {
    Notification {
        title: format!("🎉 Recharge Successful, {}!", summary.user_name),
        body: format!(
            "Your {} has been recharged with {} MB. Enjoy your data!",
            summary.plan_name, summary.data_mb
        ),
        channel_id: channel_id.to_string(),
        importance: Importance::High,
        press_action: DEFAULT_PRESS_ACTION.to_string(),
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// How a notification attempt ended.
#[derive(Debug)]
pub enum NotifyOutcome {
    Shown { notification_id: String },
    /// Permission refused, or the permission query itself failed.
    PermissionDenied,
    /// Channel creation or display failed.
    Failed(NotifyError),
}

impl NotifyOutcome {
    pub fn is_shown(&self) -> bool {
        matches!(self, NotifyOutcome::Shown { .. })
    }
}

/// Runs the permission → channel → display pipeline over a platform.
///
/// The channel id is cached after the first successful creation and reused
/// for the lifetime of the notifier.
pub struct RechargeNotifier<P> {
    platform: P,
    channel: Mutex<Option<String>>,
}

impl<P: NotificationPlatform> RechargeNotifier<P> {
    pub fn new(platform: P) -> Self {
        RechargeNotifier {
            platform,
            channel: Mutex::new(None),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Stage 1. Any failure counts as "not granted".
    fn permission_granted(&self) -> bool {
        match self.platform.request_permission() {
            Ok(status) => {
                tracing::debug!(?status, "notification permission status");
                if !status.is_granted() {
                    tracing::info!("notification permission denied");
                }
                status.is_granted()
            }
            Err(e) => {
                tracing::error!(error = %e, "error requesting notification permission");
                false
            }
        }
    }

    /// Stage 2. Idempotent across calls.
    fn channel(&self) -> Result<String, NotifyError> {
        let mut cached = self.channel.lock();
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }
        match self.platform.create_channel(&ChannelSpec::recharge()) {
            Ok(id) => {
                tracing::info!(channel = %id, "notification channel created");
                *cached = Some(id.clone());
                Ok(id)
            }
            Err(e) => {
                tracing::error!(error = %e, "error creating notification channel");
                Err(e)
            }
        }
    }

    /// Notify the user of a completed recharge. Best-effort.
    pub fn show_recharge_notification(&self, summary: &RechargeSummary) -> NotifyOutcome {
        tracing::info!(
            user = %summary.user_name,
            plan = %summary.plan_name,
            data_mb = summary.data_mb,
            "showing recharge notification"
        );

        if !self.permission_granted() {
            tracing::info!("no notification permission, skipping notification");
            return NotifyOutcome::PermissionDenied;
        }

        let channel_id = match self.channel() {
            Ok(id) => id,
            Err(e) => return self.failed(e),
        };

        let notification = recharge_notification(summary, &channel_id);
        match self.platform.display(&notification) {
            Ok(notification_id) => {
                tracing::info!(id = %notification_id, "notification displayed");
                NotifyOutcome::Shown { notification_id }
            }
            Err(e) => self.failed(e),
        }
    }

    fn failed(&self, error: NotifyError) -> NotifyOutcome {
        tracing::error!(error = %error, "failed to show notification");
        NotifyOutcome::Failed(error)
    }
}

// ============================================================================
// DESKTOP PLATFORM
// ============================================================================

/// External program used to post desktop notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// freedesktop `notify-send` (Linux, BSD).
    NotifySend,
    /// AppleScript `display notification` (macOS).
    Osascript,
}

impl Backend {
    /// The backend native to the current OS.
    pub fn native() -> Self {
        if cfg!(target_os = "macos") {
            Backend::Osascript
        } else {
            Backend::NotifySend
        }
    }

    fn program(self) -> &'static str {
        match self {
            Backend::NotifySend => "notify-send",
            Backend::Osascript => "osascript",
        }
    }

    /// Whether the backend program can be started at all.
    fn probe(self) -> io::Result<bool> {
        let args: &[&str] = match self {
            Backend::NotifySend => &["--version"],
            Backend::Osascript => &["-e", "return"],
        };
        match Command::new(self.program())
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) => Ok(status.success()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Arguments that post `notification` through this backend.
    pub fn display_args(self, notification: &Notification) -> Vec<String> {
        match self {
            Backend::NotifySend => {
                let urgency = match notification.importance {
                    Importance::High => "normal",
                    Importance::Default => "low",
                };
                vec![
                    format!("--app-name={}", APP_NAME),
                    format!("--urgency={}", urgency),
                    format!("--category={}", notification.channel_id),
                    notification.title.clone(),
                    notification.body.clone(),
                ]
            }
            Backend::Osascript => vec![
                "-e".to_string(),
                format!(
                    "display notification {} with title {}",
                    applescript_string(&notification.body),
                    applescript_string(&notification.title)
                ),
            ],
        }
    }
}

/// Quote `s` as an AppleScript string literal.
fn applescript_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Desktop notifications through the OS notifier command.
///
/// "Permission" is denied when notifications are disabled on the command
/// line or when the backend program is not installed.
pub struct SystemNotifier {
    enabled: bool,
    backend: Backend,
    available: OnceLock<bool>,
    next_id: AtomicU64,
}

impl SystemNotifier {
    pub fn new(enabled: bool) -> Self {
        Self::with_backend(enabled, Backend::native())
    }

    pub fn with_backend(enabled: bool, backend: Backend) -> Self {
        SystemNotifier {
            enabled,
            backend,
            available: OnceLock::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn backend_available(&self) -> Result<bool, NotifyError> {
        if let Some(available) = self.available.get() {
            return Ok(*available);
        }
        let available = self
            .backend
            .probe()
            .map_err(|e| NotifyError::Permission(e.to_string()))?;
        Ok(*self.available.get_or_init(|| available))
    }
}

impl NotificationPlatform for SystemNotifier {
    fn request_permission(&self) -> Result<AuthorizationStatus, NotifyError> {
        if !self.enabled {
            return Ok(AuthorizationStatus::Denied);
        }
        if self.backend_available()? {
            Ok(AuthorizationStatus::Authorized)
        } else {
            tracing::warn!(program = self.backend.program(), "desktop notifier not found");
            Ok(AuthorizationStatus::Denied)
        }
    }

    fn create_channel(&self, spec: &ChannelSpec) -> Result<String, NotifyError> {
        // Desktop notifiers have no channel registry; the id travels as the
        // notification category.
        if !matches!(self.available.get(), Some(true)) {
            return Err(NotifyError::Unavailable);
        }
        Ok(spec.id.clone())
    }

    fn display(&self, notification: &Notification) -> Result<String, NotifyError> {
        let output = Command::new(self.backend.program())
            .args(self.backend.display_args(notification))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| NotifyError::Display(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotifyError::Display(format!(
                "{} exited with {}: {}",
                self.backend.program(),
                output.status,
                stderr.trim()
            )));
        }

        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(format!("{}-{}", notification.channel_id, n))
    }
}

// ============================================================================
// TESTS
// ============================================================================
