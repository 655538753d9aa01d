//! xbpsbridge - Process supervision and output parsing for a package
//! manager GUI
//!
//! This library mediates between a graphical package-manager front-end
//! and the XBPS command-line tools: it launches package operations as
//! external processes, incrementally parses their interleaved
//! stdout/stderr streams, and emits normalized, presentation-ready
//! progress events to the UI layer.
//!
//! ## Features
//!
//! - **Streaming parser:** Copes with partial lines, escape-sequence
//!   noise, and concatenated progress records in a single buffered read
//! - **Ordered classification:** An explicit rule cascade turns raw
//!   chatter into percentages, download targets, and styled status lines
//! - **Session dedup:** Identical text is emitted at most once per
//!   command invocation
//! - **Terminal fallback:** Every operation has a terminal-bound variant
//!   that bypasses parsing entirely
//! - **Configuration:** TOML/JSON configuration files
//!
//! ## Module Organization
//!
//! ### Core Functionality
//!
//! - [`parse`] - Chunk splitting, noise filtering, classification,
//!   presentation formatting
//! - [`exec`] - Operation entry points, process supervision, privilege
//!   helpers, package queries
//! - [`events`] - Lifecycle and UI event types, the broadcast bus
//! - [`models`] - Data structures (OperationKind, Severity)
//! - [`mod@error`] - Error types and Result aliases
//!
//! ### Utilities
//!
//! - [`config`] - Configuration loading and validation
//!
//! ## Quick Start
//!
//! ```no_run
//! use xbpsbridge::{build_executor, init, UiEvent};
//!
//! # async fn run() -> xbpsbridge::Result<()> {
//! let config = init()?;
//! let (mut executor, process_events, bus) = build_executor(&config);
//!
//! let mut ui_events = bus.subscribe();
//! executor.do_install("ripgrep")?;
//!
//! tokio::spawn(async move { executor.drive(process_events).await });
//!
//! while let Some(event) = ui_events.recv().await {
//!     match event {
//!         UiEvent::Percentage(p) => println!("{}%", p),
//!         UiEvent::Text(line) => println!("{}", line),
//!         UiEvent::Finished { exit_code, .. } => {
//!             println!("done: {}", exit_code);
//!             break;
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Data flows one-directional through the pipeline:
//!
//! - **Supervisor tasks** read the child's stdout/stderr into buffers
//!   and publish `ProcessEvent`s (tokio tasks, blocking-free)
//! - **The adapter** (`PackageExecutor`) drains the buffers on each
//!   notification and runs one synchronous parse pass to completion
//! - **UI emissions** go over a broadcast channel, fire-and-forget; a
//!   slow listener lags in its own domain
//!
//! The only shared mutable session state - the printed-lines ledger and
//! the operation kind - is owned by the parser session and reset at the
//! start of each new command invocation.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod events;
pub mod models;

// Core modules
pub mod exec;
pub mod parse;

// Re-exports for core functionality
pub use config::{Config, ConfigLoader};
pub use error::{Error, Result};
pub use events::{ExitStatusKind, ProcessEvent, UiEvent, UiEventBus, UiEventSubscription};
pub use exec::{PackageExecutor, PackageQuery, ProcessSupervisor, ShellSupervisor, SuHelper, XbpsQuery};
pub use models::{OperationKind, Severity};
pub use parse::{OutputParser, TextFormatter};

// Version information
/// The current version of xbpsbridge from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The crate description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize logging for an embedding front-end.
///
/// `RUST_LOG` wins when set; otherwise `debug` selects between debug
/// and info level. The parser's own debug-mode flag additionally gates
/// the per-stage value tracing.
pub fn init_tracing(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Initialize the bridge: load configuration from the default
/// locations, falling back to defaults when loading fails.
///
/// # Errors
///
/// Returns an error only when a configuration file exists but fails
/// validation; a missing or unreadable file falls back to defaults.
pub fn init() -> Result<Config> {
    info!("Initializing {} v{}", NAME, VERSION);

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults", e);
            Config::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Build a fully wired executor from a configuration: the shell
/// supervisor, the xbps package-query collaborator, and the UI bus.
///
/// The returned receiver carries supervisor notifications; hand it to
/// [`PackageExecutor::drive`] on a tokio task.
pub fn build_executor(
    config: &Config,
) -> (
    PackageExecutor,
    tokio::sync::mpsc::UnboundedReceiver<ProcessEvent>,
    UiEventBus,
) {
    let su = config
        .process
        .su_helper
        .as_deref()
        .and_then(SuHelper::from_name)
        .unwrap_or_else(SuHelper::detect);

    let bus = UiEventBus::default();
    let (supervisor, process_events) = ShellSupervisor::new(su, config.process.terminal.clone());

    let mut executor = PackageExecutor::new(
        config,
        bus.clone(),
        Box::new(supervisor),
        std::sync::Arc::new(XbpsQuery::new()),
    );
    executor.set_su_helper(su);

    (executor, process_events, bus)
}

/// Validate system requirements for the bridge
///
/// Checks that the xbps executables the operations shell out to are
/// present on the system.
pub fn validate_system() -> SystemValidation {
    let mut issues = Vec::new();

    let required_commands = ["xbps-install", "xbps-remove", "xbps-query"];
    for cmd in &required_commands {
        if !exec::su::command_exists(cmd) {
            issues.push(ValidationIssue::MissingCommand(cmd.to_string()));
        }
    }

    let is_valid = issues.is_empty();
    if is_valid {
        info!("System validation passed");
    } else {
        warn!("System validation found {} issues", issues.len());
    }

    SystemValidation { is_valid, issues }
}

/// System validation result
#[derive(Debug, Clone)]
pub struct SystemValidation {
    /// Whether the system meets all requirements
    pub is_valid: bool,
    /// List of validation issues found (empty if `is_valid` is true)
    pub issues: Vec<ValidationIssue>,
}

/// Validation issues that can be found during system validation
#[derive(Debug, Clone)]
pub enum ValidationIssue {
    /// A required command is not available on the system
    MissingCommand(String),
    /// A required capability is missing
    MissingCapability(String),
}
