//! recharge-ring CLI
//!
//! Interactive data-usage screen, plus one-shot status and notification
//! commands for the same plan.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use recharge_ring::notify::{NotifyOutcome, RechargeNotifier, RechargeSummary, SystemNotifier};
use recharge_ring::plan::{load_plan, PlanRecord};
use recharge_ring::report::{format_snapshot, OutputFormat, UsageSnapshot};
use recharge_ring::tui::run::run;
use recharge_ring::tui::state::App;
use recharge_ring::tui::theme::Appearance;
use recharge_ring::usage::UsageEngine;

#[derive(Parser)]
#[command(name = "recharge-ring")]
#[command(about = "Watch a mobile-data plan deplete and recharge it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Plan file (JSON); defaults to the built-in plan
    #[arg(long, global = true)]
    plan: Option<PathBuf>,

    /// Color scheme; `auto` reads COLORFGBG
    #[arg(long, value_enum, default_value = "auto", global = true)]
    appearance: AppearanceArg,

    /// Never post desktop notifications
    #[arg(long, global = true)]
    no_notify: bool,

    /// Log file for the interactive screen
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive usage screen (default)
    Run,

    /// Print the plan's starting usage and exit
    Status {
        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Send the recharge notification once and report what happened
    Notify,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum AppearanceArg {
    Auto,
    Light,
    Dark,
}

impl AppearanceArg {
    fn resolve(self) -> Appearance {
        match self {
            AppearanceArg::Auto => Appearance::detect(),
            AppearanceArg::Light => Appearance::Light,
            AppearanceArg::Dark => Appearance::Dark,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let log_path = cli.log_file.or_else(default_log_path);
            init_logging(LogTarget::File(log_path), "recharge_ring=info");
            cmd_run(cli.plan, cli.appearance.resolve(), !cli.no_notify)
        }
        Commands::Status { format } => {
            init_logging(LogTarget::Stderr, "recharge_ring=warn");
            cmd_status(cli.plan.as_deref(), format.into())
        }
        Commands::Notify => {
            init_logging(LogTarget::Stderr, "recharge_ring=info");
            cmd_notify(cli.plan.as_deref(), !cli.no_notify)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// LOGGING
// ============================================================================

enum LogTarget {
    /// The TUI owns the terminal, so it logs to a file (or not at all).
    File(Option<PathBuf>),
    Stderr,
}

fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("recharge-ring").join("recharge-ring.log"))
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. `RUST_LOG` overrides `default_directive`.
fn init_logging(target: LogTarget, default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
        LogTarget::File(Some(path)) => match open_log_file(&path) {
            Ok(file) => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_ansi(false)
                            .with_writer(Mutex::new(file)),
                    )
                    .init();
            }
            Err(e) => {
                eprintln!("Note: logging disabled, cannot open {}: {}", path.display(), e);
            }
        },
        LogTarget::File(None) => {}
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn load(plan_path: Option<&Path>) -> Result<PlanRecord, String> {
    load_plan(plan_path).map_err(|e| e.to_string())
}

fn cmd_run(plan_path: Option<PathBuf>, appearance: Appearance, notifications: bool) -> Result<(), String> {
    let plan = load(plan_path.as_deref())?;
    let app = App::new(plan, appearance);
    let notifier = Arc::new(RechargeNotifier::new(SystemNotifier::new(notifications)));

    run(app, notifier, plan_path).map_err(|e| e.to_string())
}

fn cmd_status(plan_path: Option<&Path>, format: OutputFormat) -> Result<(), String> {
    let plan = load(plan_path)?;
    let engine = UsageEngine::new(plan);
    let snapshot = UsageSnapshot::capture(&engine);

    match format {
        OutputFormat::Human => print!("{}", format_snapshot(&snapshot, format)),
        OutputFormat::Json => println!("{}", format_snapshot(&snapshot, format)),
    }

    Ok(())
}

fn cmd_notify(plan_path: Option<&Path>, notifications: bool) -> Result<(), String> {
    let plan = load(plan_path)?;
    let notifier = RechargeNotifier::new(SystemNotifier::new(notifications));

    match notifier.show_recharge_notification(&RechargeSummary::from_plan(&plan)) {
        NotifyOutcome::Shown { notification_id } => {
            println!("Notification shown ({}).", notification_id);
            Ok(())
        }
        NotifyOutcome::PermissionDenied => {
            println!("Notifications not permitted; nothing shown.");
            Ok(())
        }
        NotifyOutcome::Failed(e) => Err(format!("notification failed: {}", e)),
    }
}
