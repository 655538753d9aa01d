//! Unit tests for chunk splitting

use xbpsbridge::parse::splitter::{split_chunk, starts_with_counter};

#[test]
fn test_counter_records_split_independently() {
    let outcome = split_chunk("(  1/10) installing foo (  2/10) installing bar");

    assert_eq!(outcome.candidates.len(), 2);
    assert_eq!(outcome.candidates[0].trim(), "installing foo");
    assert_eq!(outcome.candidates[1].trim(), "installing bar");
    // Neither candidate carries the counter prefix
    for candidate in &outcome.candidates {
        assert!(!starts_with_counter(candidate));
        assert!(!candidate.contains("/10)"));
    }
}

#[test]
fn test_concatenated_percentages_split() {
    let outcome = split_chunk("foo-1.0_1.xbps: 45% bar-2.0_2.xbps: 80%");

    assert_eq!(
        outcome.candidates,
        vec!["foo-1.0_1.xbps: 45%", "bar-2.0_2.xbps: 80%"]
    );
}

#[test]
fn test_multi_line_chunk() {
    let outcome = split_chunk("line one\n\nline two\nline three\n");

    assert_eq!(outcome.candidates, vec!["line one", "line two", "line three"]);
    assert!(outcome.decomposed);
}

#[test]
fn test_whitespace_only_chunk_is_not_an_error() {
    let outcome = split_chunk("  \n\t\n   ");
    assert!(outcome.is_empty());
    assert!(outcome.decomposed);
}

#[test]
fn test_undecomposable_segment_is_signalled() {
    // A segment consumed entirely by the counter marker yields nothing;
    // the caller must be told instead of losing the chunk silently
    let outcome = split_chunk("(  7/12) ");
    assert!(outcome.is_empty());
    assert!(!outcome.decomposed);
}

#[test]
fn test_mixed_counter_and_percent_lines() {
    let outcome =
        split_chunk("(  1/2) downloading foo (  2/2) downloading bar\nbaz.xbps: 10% qux.xbps: 20%");

    assert_eq!(outcome.candidates.len(), 4);
    assert_eq!(outcome.candidates[2], "baz.xbps: 10%");
    assert_eq!(outcome.candidates[3], "qux.xbps: 20%");
}

#[test]
fn test_counter_with_wide_ordinals() {
    let outcome = split_chunk("( 123/4567) verifying a (1000/4567) verifying b");
    assert_eq!(outcome.candidates.len(), 2);
}

#[test]
fn test_percent_reappended_only_to_numeric_tails() {
    let outcome = split_chunk("45% complete 99% almost");
    // "complete 99" regains its delimiter; the trailing word does not
    assert_eq!(outcome.candidates, vec!["45%", "complete 99%", "almost"]);
}
