//! Presentation Formatting
//!
//! Converts classified status lines into styled, deduplicated rich-text
//! units. The formatter owns the session's printed-lines ledger:
//! identical text is emitted at most once per command invocation, no
//! matter how many buffered reads repeat it.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::events::{UiEvent, UiEventBus};
use crate::models::Severity;

/// Whether bare URLs are converted into clickable anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlHandling {
    /// Wrap URLs in anchor tags (the default)
    Linkify,
    /// Leave the text as-is
    Plain,
}

/// Raw transaction-counter fragment leaking through, e.g. "(3" or "3)"
static PAREN_DIGIT_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\d").unwrap());
static PAREN_DIGIT_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d\)").unwrap());

/// End-of-transaction aggregate summary
static TRANSACTION_SUMMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+ downloaded, \d+ installed, \d+ updated, \d+ configured, \d+ removed")
        .unwrap()
});

/// "is/are up-to-date" phrasing excluded from the package-name heuristic
static UP_TO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(is|are) up-to-date").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").unwrap());

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(https?|ftp)://[^\s<>"]+"#).unwrap());

/// Error/removal keyword family
const ERROR_KEYWORDS: &[&str] = &[
    "removed",
    "removing ",
    "could not ",
    "error",
    "failed",
    "is not synced",
    "Removing",
    "removing",
    "Deinstalling",
    "deinstalling",
    "could not be found",
];

/// Progress/success verb family, matched case-insensitively
const PROGRESS_KEYWORDS: &[&str] = &[
    "reinstalled",
    "installed",
    "upgraded",
    "updated",
    "verifying",
    "building",
    "checking",
    "configuring",
    "downloading",
    "reinstalling",
    "installing",
    "updating",
    "upgrading",
    "loading",
    "resolving",
    "extracting",
    "unpacking",
    "running",
    "looking",
];

/// Warning keyword family
const WARNING_KEYWORDS: &[&str] = &["warning", "downgrading", "options changed"];

/// Classify a line into its display severity. The families overlap
/// ("removing" vs the progress verbs); the first matching family wins.
pub fn classify_severity(text: &str) -> Severity {
    let lower = text.to_lowercase();

    if ERROR_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        Severity::Error
    } else if PROGRESS_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        Severity::Progress
    } else if WARNING_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        Severity::Warning
    } else if text.contains('-') && !UP_TO_DATE.is_match(text) && !WHITESPACE.is_match(text) {
        // Best-effort guess: an unadorned hyphenated token is most
        // likely a package identifier. Known-imprecise.
        Severity::PackageName
    } else {
        Severity::Plain
    }
}

/// Convert bare URLs into clickable anchors.
pub fn linkify_urls(text: &str) -> String {
    URL.replace_all(text, |caps: &regex::Captures<'_>| {
        let url = &caps[0];
        format!("<a href=\"{}\">{}</a>", url, url)
    })
    .into_owned()
}

/// Styles, deduplicates, and emits presentation lines
pub struct TextFormatter {
    /// Exact text already emitted this session
    printed: HashSet<String>,
    bus: UiEventBus,
    treat_url_links: bool,
}

impl TextFormatter {
    pub fn new(bus: UiEventBus) -> Self {
        Self {
            printed: HashSet::new(),
            bus,
            treat_url_links: true,
        }
    }

    /// Forget everything printed so far (new command invocation).
    pub fn reset(&mut self) {
        self.printed.clear();
    }

    /// Default URL treatment for lines printed without an explicit
    /// override.
    pub fn set_treat_url_links(&mut self, value: bool) {
        self.treat_url_links = value;
    }

    /// Whether `text` was already emitted verbatim this session.
    pub fn was_printed(&self, text: &str) -> bool {
        self.printed.contains(text)
    }

    /// Emit synthetic UI text with no suppression, styling, or dedup.
    pub fn print_raw(&mut self, text: &str) {
        self.bus.publish(UiEvent::Text(text.to_string()));
    }

    /// Suppress, style, deduplicate, and emit one line.
    pub fn print_line(&mut self, text: &str) {
        let urls = if self.treat_url_links {
            UrlHandling::Linkify
        } else {
            UrlHandling::Plain
        };
        self.print_line_with(text, urls);
    }

    /// `print_line` with an explicit URL treatment.
    pub fn print_line_with(&mut self, text: &str, urls: UrlHandling) {
        if Self::suppressed(text) {
            return;
        }
        if self.printed.contains(text) {
            return;
        }

        let mut styled = if TRANSACTION_SUMMARY.is_match(text) {
            format!("<b>{}</b>", text)
        } else if text.contains("<font color") {
            // Already styled upstream; just terminate the line
            format!("{}<br>", text)
        } else {
            classify_severity(text).apply(text)
        };

        if styled.contains("::") {
            // Section marker: frame it with blank lines
            styled = format!("<br><B>{}</B><br><br>", styled);
        }
        if !styled.contains("<br") {
            styled.push_str("<br>");
        }
        if urls == UrlHandling::Linkify {
            styled = linkify_urls(&styled);
        }

        // The ledger records the pre-styling text: emission is idempotent
        // per session regardless of styling differences on re-evaluation
        self.printed.insert(text.to_string());
        self.bus.publish(UiEvent::Text(styled));
    }

    /// Ordered suppression checks; any match drops the line.
    fn suppressed(text: &str) -> bool {
        let lower = text.to_lowercase();

        let counter_fragment = (PAREN_DIGIT_OPEN.is_match(text)
            || PAREN_DIGIT_CLOSE.is_match(text))
            && !lower.contains("target")
            && !lower.contains("package");

        counter_fragment
            || lower.starts_with("enter a selection")
            || lower.starts_with("proceed with")
            || text.contains('%')
            || text.contains("---")
            || text.contains("removed obsolete entry")
            || text.contains("avg rate")
    }
}
