//! Output Parsing Pipeline
//!
//! The parser session behind the bridge: splits raw process chunks into
//! candidate lines, scrubs noise, routes every candidate through an
//! ordered classifier cascade, and hands the survivors to the
//! presentation formatter.
//!
//! The cascade is an explicit ordered table of rules. The patterns
//! overlap on purpose - a download line carries both a percentage and a
//! verb the severity families would match - and the documented
//! precedence is what keeps the interpretation deterministic. Do not
//! reorder the table.

pub mod format;
pub mod noise;
pub mod splitter;

// Re-exports for convenience
pub use format::{classify_severity, linkify_urls, TextFormatter, UrlHandling};
pub use splitter::{split_chunk, SplitOutcome};

use std::sync::Arc;

use crate::events::{UiEvent, UiEventBus};
use crate::exec::query::PackageQuery;
use crate::models::severity::RED;
use crate::models::{OperationKind, Severity};

/// Whether a cascade rule fully handled the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// The candidate is consumed; stop evaluating rules
    Stop,
    /// Evaluate the next rule
    Next,
}

/// A candidate moving through the classifier cascade
#[derive(Debug)]
struct Candidate {
    text: String,
    /// Set by the completion rule when the candidate contains "100%"
    completed: bool,
}

type Rule = fn(&mut OutputParser, &mut Candidate) -> Flow;

/// The classifier cascade, evaluated strictly in order
const CASCADE: &[Rule] = &[
    OutputParser::rule_completion,
    OutputParser::rule_target_lines,
    OutputParser::rule_percentage,
    OutputParser::rule_status_text,
];

/// Parser session: owns the operation kind and the formatter (and with
/// it the printed-lines ledger) for one command invocation.
pub struct OutputParser {
    operation: OperationKind,
    formatter: TextFormatter,
    bus: UiEventBus,
    query: Arc<dyn PackageQuery>,
    debug_mode: bool,
}

impl OutputParser {
    pub fn new(bus: UiEventBus, query: Arc<dyn PackageQuery>) -> Self {
        Self {
            operation: OperationKind::None,
            formatter: TextFormatter::new(bus.clone()),
            bus,
            query,
            debug_mode: false,
        }
    }

    /// Trace every pipeline stage's intermediate values.
    pub fn set_debug_mode(&mut self, value: bool) {
        self.debug_mode = value;
    }

    /// Start a new parsing session: store the operation kind and clear
    /// the printed-lines ledger.
    pub fn begin(&mut self, operation: OperationKind) {
        self.operation = operation;
        self.formatter.reset();
    }

    /// The operation currently in flight
    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Access to the formatter (preamble emission, configuration)
    pub fn formatter(&mut self) -> &mut TextFormatter {
        &mut self.formatter
    }

    /// Split a raw chunk and classify every resulting candidate.
    pub fn feed(&mut self, chunk: &str) {
        if self.operation.bypasses_parsing() {
            return;
        }

        let outcome = splitter::split_chunk(chunk);
        if outcome.is_empty() && !outcome.decomposed {
            // No split strategy applied; classify the whole chunk rather
            // than dropping it
            let fallback = chunk.trim();
            if !fallback.is_empty() {
                if self.debug_mode {
                    debug!("split fallback: {:?}", fallback);
                }
                self.parse_line(fallback);
            }
            return;
        }

        for candidate in outcome.candidates {
            if self.debug_mode {
                debug!("split candidate: {:?}", candidate);
            }
            self.parse_line(&candidate);
        }
    }

    /// Scrub and classify one candidate line.
    pub fn parse_line(&mut self, raw: &str) {
        if self.operation.bypasses_parsing() {
            return;
        }

        let scrubbed = noise::strip_diagnostics(&noise::scrub(raw));
        if self.debug_mode {
            debug!("classify: {:?}", scrubbed);
        }

        let mut candidate = Candidate {
            text: scrubbed,
            completed: false,
        };
        for rule in CASCADE {
            if rule(self, &mut candidate) == Flow::Stop {
                return;
            }
        }
    }

    fn emit_percentage(&mut self, value: u8) {
        if self.debug_mode {
            debug!("percentage: {}", value);
        }
        self.bus.publish(UiEvent::Percentage(value));
    }

    /// Rule 1: a completed download/transaction reports "100%" anywhere
    /// in the line. Completion takes priority over the positional
    /// extraction in rule 3, which cannot parse a three-digit value.
    fn rule_completion(&mut self, candidate: &mut Candidate) -> Flow {
        if candidate.text.contains("100%") {
            self.emit_percentage(100);
            candidate.completed = true;
        }
        Flow::Next
    }

    /// Rule 2: package-archive download targets and repository file
    /// updates. A download line keeps flowing into rule 3 for its
    /// percentage but is never classified as generic text; a file-update
    /// line is fully consumed here.
    fn rule_target_lines(&mut self, candidate: &mut Candidate) -> Flow {
        let text = &candidate.text;

        if (text.contains(".xbps:") || text.contains(".xbps.sig:")) && text.contains('%') {
            if let Some(colon) = text.find(':') {
                let target = text[..colon].to_string();
                if !self.formatter.was_printed(&target) {
                    self.formatter
                        .print_line(&Severity::PackageName.apply(&target));
                }
            }
            return Flow::Next;
        }

        if text.contains("Updating")
            && !text.contains("B/s")
            && !text.contains("configuration file")
        {
            let Some(quote) = text.find('\'') else {
                // Malformed update notice; drop it
                return Flow::Stop;
            };
            let target = text[..quote].replace("Updating `", "");
            let target = target.trim().replace("[*] ", "");

            if !self.formatter.was_printed(&target) {
                self.formatter.print_line(&format!("Updating {}", target));
            }
            return Flow::Stop;
        }

        Flow::Next
    }

    /// Rule 3: positional percentage extraction. The value sits directly
    /// before the `%`, preceded by a space one or two characters back.
    fn rule_percentage(&mut self, candidate: &mut Candidate) -> Flow {
        if !candidate.text.contains('%') && !candidate.completed {
            return Flow::Next;
        }

        let chars: Vec<char> = candidate.text.chars().collect();
        let Some(position) = chars.iter().position(|&c| c == '%') else {
            return Flow::Stop;
        };
        if position < 3 {
            // Not enough lookback to extract a value
            return Flow::Stop;
        }

        let token: String = if chars[position - 2].is_whitespace() {
            chars[position - 1..=position].iter().collect()
        } else if chars[position - 3].is_whitespace() {
            chars[position - 2..=position].iter().collect()
        } else {
            String::new()
        };
        let token = token.trim();

        if self.debug_mode {
            debug!("percentage token: {:?}", token);
        }

        if let Some(digits) = token.strip_suffix('%') {
            if !digits.is_empty() {
                if let Ok(value) = digits.parse::<u8>() {
                    if value <= 100 {
                        self.emit_percentage(value);
                    }
                }
            }
        }
        Flow::Stop
    }

    /// Rule 4: full text classification for lines with no progress
    /// marker.
    fn rule_status_text(&mut self, candidate: &mut Candidate) -> Flow {
        if noise::is_transfer_chatter(&candidate.text) {
            return Flow::Stop;
        }

        let stripped = noise::strip_helper_chatter(&noise::strip_diagnostics(&candidate.text));
        let mut msg = stripped.trim().to_string();

        // Leading "(n/m) " transaction counter; captured but not reused
        if splitter::starts_with_counter(&msg) {
            let Some(close) = msg.find(')') else {
                return Flow::Stop;
            };
            msg = msg.get(close + 2..).unwrap_or("").to_string();
        }

        if msg.is_empty() {
            return Flow::Stop;
        }

        if msg.contains("removing ") && !self.formatter.was_printed(&format!("{} ", msg)) {
            // Interleaved buffer reads fabricate "removing" lines for
            // packages that were never touched; only a name with an
            // ellipsis or a confirmed installed package goes out
            let package: String = msg.chars().skip(9).collect();
            let package = package.trim();

            if package.contains("...") || self.query.is_installed(package) {
                self.formatter
                    .print_line(&format!("<b><font color=\"{}\">{}</font></b>", RED, msg));
            }
        } else {
            self.formatter.print_line(&msg);
        }
        Flow::Stop
    }
}
