//! Privilege Helper Detection
//!
//! Package transactions run behind whichever privilege helper the
//! desktop provides. The adapter consults the helper kind to apply
//! helper-specific output quirks; selection policy beyond simple
//! detection lives with the embedding front-end.

use std::process::Command;

/// The privilege helper wrapping package-manager invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuHelper {
    /// No helper; the bridge already runs with sufficient privileges
    Direct,
    /// Plain sudo
    Sudo,
    /// KDE's graphical helper
    Kdesu,
    /// GTK's graphical helper
    Gksu,
}

impl SuHelper {
    /// Detect the available helper, preferring the graphical ones.
    pub fn detect() -> Self {
        if is_root() {
            SuHelper::Direct
        } else if command_exists("kdesu") {
            SuHelper::Kdesu
        } else if command_exists("gksu") {
            SuHelper::Gksu
        } else {
            SuHelper::Sudo
        }
    }

    /// Parse a configured helper override.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "direct" => Some(SuHelper::Direct),
            "sudo" => Some(SuHelper::Sudo),
            "kdesu" => Some(SuHelper::Kdesu),
            "gksu" => Some(SuHelper::Gksu),
            _ => None,
        }
    }

    /// Build the argv that runs `command` behind this helper.
    pub fn wrap(&self, command: &str) -> Vec<String> {
        match self {
            SuHelper::Direct => {
                vec!["sh".to_string(), "-c".to_string(), command.to_string()]
            }
            SuHelper::Sudo => vec![
                "sudo".to_string(),
                "--".to_string(),
                "sh".to_string(),
                "-c".to_string(),
                command.to_string(),
            ],
            SuHelper::Kdesu => vec![
                "kdesu".to_string(),
                "-t".to_string(),
                "-c".to_string(),
                command.to_string(),
            ],
            SuHelper::Gksu => vec!["gksu".to_string(), command.to_string()],
        }
    }
}

/// Check if a command exists on the system
pub(crate) fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Whether the bridge itself already runs with root privileges
pub fn is_root() -> bool {
    // Safety: geteuid has no failure modes and touches no memory
    unsafe { libc::geteuid() == 0 }
}
