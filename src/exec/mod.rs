//! Package Operation Execution
//!
//! The process event adapter: launches package operations through the
//! supervisor, tracks which logical operation is in flight, and routes
//! process lifecycle notifications into the parsing pipeline. Each
//! notification triggers one synchronous processing pass; the child
//! process keeps running and buffering independently.

pub mod commands;
pub mod query;
pub mod su;
pub mod supervisor;

// Re-exports for convenience
pub use query::{PackageQuery, XbpsQuery};
pub use su::SuHelper;
pub use supervisor::{ProcessSupervisor, ShellSupervisor};

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{ExitStatusKind, ProcessEvent, UiEvent, UiEventBus};
use crate::models::OperationKind;
use crate::parse::{noise, OutputParser};

/// kdesu prints its usage banner instead of a password prompt when
/// invoked with a stale configuration; the sync flow treats it as noise.
const KDESU_USAGE_BANNER: &str = "Usage: /usr/bin/kdesu [options] command";

/// Sync preambles gksu echoes back before any real output
const GKSU_SYNC_PREAMBLES: &[&str] = &[
    ":: Synchronizing package databases...",
    ":: Starting full system upgrade...",
];

/// Process event adapter between the supervisor and the UI bus
pub struct PackageExecutor {
    parser: OutputParser,
    supervisor: Box<dyn ProcessSupervisor>,
    su: SuHelper,
    bus: UiEventBus,
    /// Interactive replay of the last supervised command
    last_command: Vec<String>,
}

impl PackageExecutor {
    pub fn new(
        config: &Config,
        bus: UiEventBus,
        supervisor: Box<dyn ProcessSupervisor>,
        query: Arc<dyn PackageQuery>,
    ) -> Self {
        let su = config
            .process
            .su_helper
            .as_deref()
            .and_then(SuHelper::from_name)
            .unwrap_or_else(SuHelper::detect);

        let mut parser = OutputParser::new(bus.clone(), query);
        parser.set_debug_mode(config.parser.debug_mode);
        parser
            .formatter()
            .set_treat_url_links(config.parser.treat_url_links);

        Self {
            parser,
            supervisor,
            su,
            bus,
            last_command: Vec::new(),
        }
    }

    /// Override the detected privilege helper.
    pub fn set_su_helper(&mut self, su: SuHelper) {
        self.su = su;
    }

    /// The operation currently in flight
    pub fn operation(&self) -> OperationKind {
        self.parser.operation()
    }

    /// Pump supervisor notifications until the channel closes.
    pub async fn drive(&mut self, mut events: mpsc::UnboundedReceiver<ProcessEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
    }

    /// One synchronous, non-reentrant processing pass per notification.
    pub fn handle_event(&mut self, event: ProcessEvent) {
        match event {
            ProcessEvent::Started => self.on_started(),
            ProcessEvent::OutputReady => self.on_output_ready(),
            ProcessEvent::ErrorReady => self.on_error_ready(),
            ProcessEvent::Finished { exit_code, status } => self.on_finished(exit_code, status),
        }
    }

    /// Announce the operation, then catch up on anything the process
    /// already wrote before the started notification landed.
    fn on_started(&mut self) {
        if let Some(preamble) = self.parser.operation().preamble() {
            self.parser
                .formatter()
                .print_raw(&format!("<b>{}</b><br><br>", preamble));
        }

        let buffered = self.supervisor.read_all_standard_output();
        let buffered = buffered.trim();
        if !buffered.is_empty() {
            self.parser.formatter().print_line(buffered);
        }

        self.bus.publish(UiEvent::Started);
    }

    fn on_output_ready(&mut self) {
        match self.su {
            SuHelper::Kdesu => {
                let output = self.supervisor.read_all_standard_output();

                if self.parser.operation() == OperationKind::SyncDatabase
                    && output.contains(KDESU_USAGE_BANNER)
                {
                    self.bus.publish(UiEvent::ReadOutput);
                    return;
                }

                let output = noise::strip_fontconfig_chatter(&output);
                if !output.trim().is_empty() {
                    self.parser.feed(&output);
                }
            }
            SuHelper::Gksu => {
                // gksu owns the prompt dance; whatever comes through is
                // already line-shaped, so it goes straight to the
                // formatter
                let output = self.supervisor.read_all_standard_output();
                let output = output.trim();
                if !output.is_empty()
                    && !GKSU_SYNC_PREAMBLES.iter().any(|line| output.contains(line))
                {
                    self.parser.formatter().print_line(output);
                }
            }
            _ => {
                let output = self.supervisor.read_all_standard_output();
                if !output.trim().is_empty() {
                    self.parser.feed(&output);
                }
            }
        }

        self.bus.publish(UiEvent::ReadOutput);
    }

    fn on_error_ready(&mut self) {
        let message = self.supervisor.read_all_standard_error();
        let message = noise::strip_fontconfig_chatter(&message);
        if !message.trim().is_empty() {
            self.parser.feed(&message);
        }

        self.bus.publish(UiEvent::ReadOutputError);
    }

    /// Exit information is not interpreted here; the caller decides
    /// whether to retry in a terminal.
    fn on_finished(&mut self, exit_code: i32, status: ExitStatusKind) {
        self.bus.publish(UiEvent::Finished { exit_code, status });
    }

    // --------------------- operation entry points ---------------------

    /// Remove obsolete packages from the cache.
    pub fn do_clean_cache(&mut self) -> Result<()> {
        self.last_command.clear();
        self.parser.begin(OperationKind::CleanCache);
        self.supervisor.execute_command(&commands::clean_cache())
    }

    /// Install the given packages, streaming parsed output to the UI.
    pub fn do_install(&mut self, packages: &str) -> Result<()> {
        self.last_command = commands::install_retry_list(packages);
        self.parser.begin(OperationKind::Install);
        self.supervisor.execute_command(&commands::install(packages))
    }

    /// Install the given packages inside a terminal window.
    pub fn do_install_in_terminal(&mut self, packages: &str) -> Result<()> {
        self.last_command = commands::install_retry_list(packages);
        self.parser.begin(OperationKind::RunInTerminal);
        self.supervisor.run_in_terminal(&self.last_command)
    }

    /// Remove the given packages, streaming parsed output to the UI.
    pub fn do_remove(&mut self, packages: &str) -> Result<()> {
        self.last_command = commands::remove_retry_list(packages);
        self.parser.begin(OperationKind::Remove);
        self.supervisor.execute_command(&commands::remove(packages))
    }

    /// Remove the given packages inside a terminal window.
    pub fn do_remove_in_terminal(&mut self, packages: &str) -> Result<()> {
        self.last_command = commands::remove_retry_list(packages);
        self.parser.begin(OperationKind::RunInTerminal);
        self.supervisor.run_in_terminal(&self.last_command)
    }

    /// Remove one package set and install another in a single pass.
    pub fn do_remove_and_install(&mut self, to_remove: &str, to_install: &str) -> Result<()> {
        self.last_command = commands::remove_and_install_retry_list(to_remove, to_install);
        self.parser.begin(OperationKind::RemoveAndInstall);
        self.supervisor
            .execute_command(&commands::remove_and_install(to_remove, to_install))
    }

    /// Remove-then-install inside a terminal window.
    pub fn do_remove_and_install_in_terminal(
        &mut self,
        to_remove: &str,
        to_install: &str,
    ) -> Result<()> {
        self.last_command = commands::remove_and_install_retry_list(to_remove, to_install);
        self.parser.begin(OperationKind::RunInTerminal);
        self.supervisor.run_in_terminal(&self.last_command)
    }

    /// Upgrade the entire system, streaming parsed output to the UI.
    pub fn do_system_upgrade(&mut self) -> Result<()> {
        self.last_command = commands::system_upgrade_retry_list();
        self.parser.begin(OperationKind::SystemUpgrade);
        self.supervisor.execute_command(&commands::system_upgrade())
    }

    /// Upgrade the entire system inside a terminal window.
    pub fn do_system_upgrade_in_terminal(&mut self) -> Result<()> {
        self.last_command = commands::system_upgrade_retry_list();
        self.parser.begin(OperationKind::RunSystemUpgradeInTerminal);
        self.supervisor.run_in_terminal(&self.last_command)
    }

    /// Refresh the repository index.
    pub fn do_sync_database(&mut self) -> Result<()> {
        let command = commands::sync_database(su::is_root(), su::command_exists("xlocate"));
        self.parser.begin(OperationKind::SyncDatabase);
        self.supervisor.execute_command(&command)
    }

    /// Re-run the last recorded command inside a terminal; the explicit
    /// recovery path after a failed transaction.
    pub fn run_latest_command_in_terminal(&mut self) -> Result<()> {
        if self.last_command.is_empty() {
            return Err(Error::NoPreviousCommand);
        }
        self.parser.begin(OperationKind::RunInTerminal);
        self.supervisor.run_in_terminal(&self.last_command)
    }
}
