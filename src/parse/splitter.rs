//! Chunk Splitting
//!
//! Breaks a raw chunk of process output into candidate substrings for
//! classification. A chunk carries no guaranteed line boundaries: the
//! package manager, the downloader, and the privilege helper interleave
//! freely, and a single read may concatenate several transaction
//! records or percentage reports on one line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Transaction counter marker, e.g. "(  3/12) "
static COUNTER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s{0,3}[0-9]{1,4}/[0-9]{1,4}\) ").unwrap());

/// Result of splitting one raw chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Candidate substrings ready for classification
    pub candidates: Vec<String>,
    /// False when a segment was swallowed whole by the counter marker
    /// and produced no candidates; callers must not silently drop the
    /// chunk in that case
    pub decomposed: bool,
}

impl SplitOutcome {
    /// Whether the split produced any candidates at all
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// True when `text` begins with a transaction counter marker.
pub fn starts_with_counter(text: &str) -> bool {
    COUNTER_MARKER.find(text).is_some_and(|m| m.start() == 0)
}

/// Split a raw output chunk into classification candidates.
///
/// The chunk is first split on newlines (empty segments discarded).
/// Each segment is then decomposed in strict order: on counter markers
/// when that yields at least two pieces, else on `%` delimiters, else
/// the whole segment passes through as a single candidate. Empty or
/// whitespace-only chunks produce zero candidates.
pub fn split_chunk(chunk: &str) -> SplitOutcome {
    let mut candidates = Vec::new();
    let mut decomposed = true;

    for segment in chunk.trim().split('\n').filter(|s| !s.is_empty()) {
        let pieces: Vec<&str> = COUNTER_MARKER
            .split(segment)
            .filter(|p| !p.is_empty())
            .collect();

        match pieces.len() {
            // The whole segment was counter markers; nothing usable here
            0 => decomposed = false,
            1 => split_on_percent(segment, &mut candidates),
            _ => candidates.extend(pieces.iter().map(|p| p.to_string())),
        }
    }

    SplitOutcome {
        candidates,
        decomposed,
    }
}

/// Decompose concatenated percentage reports into one candidate each,
/// restoring the `%` delimiter on pieces that end in a digit.
fn split_on_percent(segment: &str, candidates: &mut Vec<String>) {
    let pieces: Vec<&str> = segment.split('%').filter(|p| !p.is_empty()).collect();

    if pieces.len() > 1 {
        for piece in pieces {
            let mut piece = piece.trim().to_string();
            if piece.is_empty() {
                continue;
            }
            if piece.chars().last().is_some_and(|c| c.is_ascii_digit()) {
                piece.push('%');
            }
            candidates.push(piece);
        }
    } else if !segment.is_empty() {
        candidates.push(segment.to_string());
    }
}
