//! Severity Model
//!
//! The display-styling category assigned to a status line. The GUI
//! renders the emitted rich text directly, so the colors here are part
//! of the presentation contract rather than a theme concern.

/// Error and removal lines
pub const RED: &str = "#E55451";
/// Progress and success lines
pub const GREEN: &str = "#4BC413";
/// Warnings and package-name highlights
pub const ORANGE: &str = "#FF8040";

/// Display severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Errors, failures, and package removals
    Error,
    /// Transaction progress verbs and success notices
    Progress,
    /// Warnings and downgrades
    Warning,
    /// A bare token that looks like a package identifier
    PackageName,
    /// Everything else, left unstyled
    Plain,
}

impl Severity {
    /// Presentation color, if the severity has one
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Severity::Error => Some(RED),
            Severity::Progress => Some(GREEN),
            Severity::Warning | Severity::PackageName => Some(ORANGE),
            Severity::Plain => None,
        }
    }

    /// Wrap `text` in the bold/color markup this severity carries.
    ///
    /// Error lines get a trailing non-breaking space so consecutive red
    /// lines do not run together in the rendered view.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Severity::Error => {
                format!("<b><font color=\"{}\">{}&nbsp;</font></b>", RED, text)
            }
            Severity::Progress => {
                format!("<b><font color=\"{}\">{}</font></b>", GREEN, text)
            }
            Severity::Warning | Severity::PackageName => {
                format!("<b><font color=\"{}\">{}</font></b>", ORANGE, text)
            }
            Severity::Plain => text.to_string(),
        }
    }
}
