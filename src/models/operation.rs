//! Package Operation Model
//!
//! Identifies which logical package-management action is in flight.
//! The kind is set once per command invocation and gates whether the
//! parsing pipeline runs at all: terminal-bound operations hand their
//! output stream to the spawned terminal emulator, so there is nothing
//! for the pipeline to interpret.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The package-management action currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// No operation dispatched yet
    #[default]
    None,
    /// Remove obsolete packages from the local cache
    CleanCache,
    /// Refresh the repository index
    SyncDatabase,
    /// Upgrade every installed package
    SystemUpgrade,
    /// Remove the selected packages
    Remove,
    /// Install the selected packages
    Install,
    /// Remove one package set, then install another
    RemoveAndInstall,
    /// Run an arbitrary recorded command inside a terminal window
    RunInTerminal,
    /// Run the system upgrade inside a terminal window
    RunSystemUpgradeInTerminal,
}

impl OperationKind {
    /// Terminal-bound operations render inside the spawned terminal
    /// emulator; the parsing pipeline must stay out of their way.
    pub fn bypasses_parsing(&self) -> bool {
        matches!(
            self,
            OperationKind::RunInTerminal | OperationKind::RunSystemUpgradeInTerminal
        )
    }

    /// Preamble text announced to the UI when the operation's process
    /// starts.
    pub fn preamble(&self) -> Option<&'static str> {
        match self {
            OperationKind::None => None,
            OperationKind::CleanCache => Some("Cleaning package cache..."),
            OperationKind::SyncDatabase => Some("Synchronizing package database..."),
            OperationKind::SystemUpgrade | OperationKind::RunSystemUpgradeInTerminal => {
                Some("Starting full system upgrade...")
            }
            OperationKind::Remove => Some("Removing the selected packages..."),
            OperationKind::Install => Some("Installing the selected packages..."),
            OperationKind::RemoveAndInstall => {
                Some("Removing/installing the selected packages...")
            }
            OperationKind::RunInTerminal => Some("Running command inside a terminal..."),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::None => "none",
            OperationKind::CleanCache => "clean-cache",
            OperationKind::SyncDatabase => "sync-database",
            OperationKind::SystemUpgrade => "system-upgrade",
            OperationKind::Remove => "remove",
            OperationKind::Install => "install",
            OperationKind::RemoveAndInstall => "remove-and-install",
            OperationKind::RunInTerminal => "run-in-terminal",
            OperationKind::RunSystemUpgradeInTerminal => "run-system-upgrade-in-terminal",
        };
        write!(f, "{}", name)
    }
}
