//! Output Noise Filtering
//!
//! Strips escape-sequence fragments, confirmation prompts, and known
//! third-party diagnostic chatter from candidate lines before they are
//! classified. The inputs are adversarial: helper tools and terminal
//! emulators leak partial escape sequences, and a buffered read can cut
//! a multi-byte sequence anywhere, so part of the catalogue consists of
//! literal captured fragments rather than well-formed sequences.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal escape fragments observed in captured helper and terminal
/// output. Removed as exact byte sequences, in this order. Some entries
/// are unreachable once the bare ESC has been removed; they stay so the
/// list matches the captured catalogue.
const ESCAPE_FRAGMENTS: &[&str] = &[
    "\u{1b}[0;1m",
    "\u{1b}[0m",
    "\u{1b}[1;33m",
    "\u{1b}[00;31m",
    "\u{1b}[1;34m",
    "c\u{1b}",
    "C\u{1b}",
    "\u{1b}",
    "[m[0;37m",
    "o\u{1b}",
    "[m\u{1b}",
    ";37m",
    "[c",
    "[mo",
    "[1A[K",
];

/// Interactive confirmation prompt embedded in a status line
static CONFIRM_PROMPT: Lazy<Regex> = Lazy::new(|| Regex::new(r".+\[Y/n\].+").unwrap());

/// Third-party diagnostic chatter: font configuration warnings,
/// privilege-helper banners, toolkit warnings, process-id noise,
/// deprecated-signal notices. Each pattern consumes the remainder of the
/// line from its anchor point.
static DIAGNOSTIC_CHATTER: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\(process.+",
        r"Using the fallback.+",
        r"Gkr-Message:.+",
        r"kdesu.+",
        r"kbuildsycoca.+",
        r"Connecting to deprecated signal.+",
        r"QVariant.+",
        r"libGL.+",
        r"Password.+",
        r"gksu-run.+",
        r"GConf Error:.+",
        r"org\.kde\.",
        r"QCommandLineParser",
        r"QCoreApplication.+",
        r"Fontconfig warning.+",
        r"reading configurations from.+",
        r".+annot load library.+",
        r"pci id for fd \d+.+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Buggy strings leaked by the gksu/libgtop helper stack
static HELPER_CHATTER: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"you should recompile libgtop and dependent applications.+",
        r"This libgtop was compiled on.+",
        r"If you see strange problems caused by it.+",
        r"LibGTop-Server.+",
        r"received eof.+",
        r"pid [0-9]+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Download rate/size/time chatter that never reaches the UI
static TRANSFER_CHATTER: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"ETA",
        r"KiB",
        r"MiB",
        r"B/s",
        r"[0-9]+ B",
        r"[0-9]{2}:[0-9]{2}",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Fontconfig chatter the privilege helpers leak on their own streams
static FONTCONFIG_CHATTER: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"Fontconfig warning: "[^"]*", line \d+:"#,
        r"reading configurations from.+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Remove confirmation prompts and literal escape fragments.
pub fn scrub(candidate: &str) -> String {
    let mut text = CONFIRM_PROMPT.replace_all(candidate, "").into_owned();
    for fragment in ESCAPE_FRAGMENTS {
        if text.contains(fragment) {
            text = text.replace(fragment, "");
        }
    }
    text
}

/// Remove every match of the diagnostic-chatter catalogue.
pub fn strip_diagnostics(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in DIAGNOSTIC_CHATTER.iter() {
        if pattern.is_match(&out) {
            out = pattern.replace_all(&out, "").into_owned();
        }
    }
    out
}

/// Remove the helper buggy-string catalogue.
pub fn strip_helper_chatter(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in HELPER_CHATTER.iter() {
        if pattern.is_match(&out) {
            out = pattern.replace_all(&out, "").into_owned();
        }
    }
    out
}

/// Remove the fontconfig side-table applied when draining helper
/// streams, before any splitting happens.
pub fn strip_fontconfig_chatter(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in FONTCONFIG_CHATTER.iter() {
        if pattern.is_match(&out) {
            out = pattern.replace_all(&out, "").into_owned();
        }
    }
    out
}

/// True when the line is download rate/size/time chatter.
pub fn is_transfer_chatter(text: &str) -> bool {
    TRANSFER_CHATTER.iter().any(|pattern| pattern.is_match(text))
}
