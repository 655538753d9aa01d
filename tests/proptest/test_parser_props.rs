//! Property-based tests for the parsing pipeline

use std::sync::Arc;

use proptest::prelude::*;

use xbpsbridge::events::{UiEvent, UiEventBus, UiEventSubscription};
use xbpsbridge::exec::PackageQuery;
use xbpsbridge::parse::splitter::{split_chunk, starts_with_counter};
use xbpsbridge::{OperationKind, OutputParser};

struct NeverInstalled;

impl PackageQuery for NeverInstalled {
    fn is_installed(&self, _package: &str) -> bool {
        false
    }
}

fn parser() -> (OutputParser, UiEventSubscription) {
    let bus = UiEventBus::new(4096);
    let sub = bus.subscribe();
    let mut parser = OutputParser::new(bus, Arc::new(NeverInstalled));
    parser.begin(OperationKind::Install);
    (parser, sub)
}

fn drain(sub: &mut UiEventSubscription) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Some(event) = sub.try_recv() {
        events.push(event);
    }
    events
}

proptest! {
    /// Any input whatsoever: emitted percentages stay within 0..=100
    /// and the parser never panics.
    #[test]
    fn percentages_stay_in_bounds(chunk in ".*") {
        let (mut parser, mut sub) = parser();
        parser.feed(&chunk);

        for event in drain(&mut sub) {
            if let UiEvent::Percentage(value) = event {
                prop_assert!(value <= 100);
            }
        }
    }

    /// Feeding the same line any number of times emits its text at most
    /// once per session.
    #[test]
    fn dedup_is_idempotent(line in "[a-zA-Z][a-zA-Z0-9 _.-]{0,40}", repeats in 1usize..6) {
        let (mut parser, mut sub) = parser();
        for _ in 0..repeats {
            parser.parse_line(&line);
        }

        let texts: Vec<String> = drain(&mut sub)
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Text(text) => Some(text),
                _ => None,
            })
            .collect();
        prop_assert!(texts.len() <= 1);
    }

    /// Counter-split candidates never retain the counter prefix.
    #[test]
    fn split_candidates_drop_counters(
        a in 1u16..9999,
        b in 1u16..9999,
        word_one in "[a-z]{1,12}",
        word_two in "[a-z]{1,12}",
    ) {
        let chunk = format!("({:>4}/{}) {} ({:>4}/{}) {}", a, b, word_one, a, b, word_two);
        let outcome = split_chunk(&chunk);

        prop_assert_eq!(outcome.candidates.len(), 2);
        for candidate in &outcome.candidates {
            prop_assert!(!starts_with_counter(candidate));
        }
    }

    /// Splitting never invents content: every candidate is a substring
    /// of the original chunk, modulo the restored percent sign.
    #[test]
    fn split_preserves_content(chunk in "[a-z0-9 %()/.\n-]{0,80}") {
        let outcome = split_chunk(&chunk);
        for candidate in &outcome.candidates {
            let bare = candidate.trim_end_matches('%');
            prop_assert!(chunk.contains(bare), "{:?} not in {:?}", bare, chunk);
        }
    }

    /// Terminal-bound sessions emit nothing, whatever the input.
    #[test]
    fn terminal_bypass_is_total(chunk in ".*") {
        let (mut parser, mut sub) = parser();
        parser.begin(OperationKind::RunInTerminal);
        parser.feed(&chunk);
        prop_assert!(drain(&mut sub).is_empty());
    }
}
