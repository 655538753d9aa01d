//! End-to-end pipeline tests: raw process chunks in, UI events out
//!
//! Drives a `PackageExecutor` with a mock supervisor, staging chunks the
//! way a real child process delivers them - partial lines, escape noise,
//! interleaved stderr - and asserts on the resulting event stream.

use std::sync::{Arc, Mutex};

use xbpsbridge::events::{ProcessEvent, UiEvent, UiEventBus, UiEventSubscription};
use xbpsbridge::exec::{PackageQuery, ProcessSupervisor, SuHelper};
use xbpsbridge::{Config, PackageExecutor, Result};

/// Shared handles into the mock supervisor
#[derive(Clone, Default)]
struct MockState {
    stdout: Arc<Mutex<String>>,
    stderr: Arc<Mutex<String>>,
}

struct MockSupervisor {
    state: MockState,
}

impl ProcessSupervisor for MockSupervisor {
    fn execute_command(&mut self, _command: &str) -> Result<()> {
        Ok(())
    }

    fn run_in_terminal(&mut self, _commands: &[String]) -> Result<()> {
        Ok(())
    }

    fn read_all_standard_output(&mut self) -> String {
        std::mem::take(&mut *self.state.stdout.lock().unwrap())
    }

    fn read_all_standard_error(&mut self) -> String {
        std::mem::take(&mut *self.state.stderr.lock().unwrap())
    }
}

struct InstalledSet(Vec<&'static str>);

impl PackageQuery for InstalledSet {
    fn is_installed(&self, package: &str) -> bool {
        self.0.contains(&package)
    }
}

fn harness(installed: Vec<&'static str>) -> (PackageExecutor, MockState, UiEventSubscription) {
    let bus = UiEventBus::new(1024);
    let sub = bus.subscribe();
    let state = MockState::default();
    let mut executor = PackageExecutor::new(
        &Config::default(),
        bus,
        Box::new(MockSupervisor {
            state: state.clone(),
        }),
        Arc::new(InstalledSet(installed)),
    );
    executor.set_su_helper(SuHelper::Direct);
    (executor, state, sub)
}

fn feed(executor: &mut PackageExecutor, state: &MockState, chunk: &str) {
    state.stdout.lock().unwrap().push_str(chunk);
    executor.handle_event(ProcessEvent::OutputReady);
}

fn drain(sub: &mut UiEventSubscription) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Some(event) = sub.try_recv() {
        events.push(event);
    }
    events
}

fn percentages(events: &[UiEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            UiEvent::Percentage(value) => Some(*value),
            _ => None,
        })
        .collect()
}

fn texts(events: &[UiEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            UiEvent::Text(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_install_transcript() {
    let (mut executor, state, mut sub) = harness(vec![]);
    executor.do_install("ripgrep").unwrap();
    executor.handle_event(ProcessEvent::Started);

    feed(&mut executor, &state, "ripgrep-14.1.0_1.xbps: 12% 1.2MiB\n");
    feed(&mut executor, &state, "ripgrep-14.1.0_1.xbps: 67% 1.2MiB\n");
    feed(&mut executor, &state, "ripgrep-14.1.0_1.xbps: 100%\n");
    feed(&mut executor, &state, "installing ripgrep-14.1.0_1\n");
    feed(
        &mut executor,
        &state,
        "1 downloaded, 1 installed, 0 updated, 1 configured, 0 removed\n",
    );

    let events = drain(&mut sub);

    // Preamble first
    let texts = texts(&events);
    assert!(texts[0].contains("Installing the selected packages..."));

    // Download target announced exactly once despite three chunks
    let target_lines: Vec<&String> = texts
        .iter()
        .filter(|t| t.contains("ripgrep-14.1.0_1.xbps"))
        .collect();
    assert_eq!(target_lines.len(), 1);
    assert!(target_lines[0].contains("#FF8040"));

    // Percentages in order, bounded
    let percents = percentages(&events);
    assert_eq!(percents, vec![12, 67, 100]);

    // The status line and the summary came through styled
    assert!(texts.iter().any(|t| t.contains("installing ripgrep-14.1.0_1")));
    assert!(texts
        .iter()
        .any(|t| t.starts_with("<b>1 downloaded")));
}

#[test]
fn test_fragmented_reads_still_classify() {
    // A chunk boundary can land anywhere; records concatenated into one
    // segment must still come out as independent candidates
    let (mut executor, state, mut sub) = harness(vec![]);
    executor.do_system_upgrade().unwrap();

    feed(
        &mut executor,
        &state,
        "(  1/3) configuring base-system-0.114_1 (  2/3) configuring bash-5.2_1",
    );

    let texts = texts(&drain(&mut sub));
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("configuring base-system-0.114_1"));
    assert!(texts[1].contains("configuring bash-5.2_1"));
}

#[test]
fn test_rate_and_eta_noise_is_silent() {
    let (mut executor, state, mut sub) = harness(vec![]);
    executor.do_sync_database().unwrap();

    feed(&mut executor, &state, "ETA 00:02\n");
    feed(&mut executor, &state, "523 KiB 1.3 MiB/s\n");
    feed(&mut executor, &state, "124 B\n");

    let events = drain(&mut sub);
    assert!(percentages(&events).is_empty());
    assert!(texts(&events).is_empty());
}

#[test]
fn test_removal_false_positive_guard() {
    let (mut executor, state, mut sub) = harness(vec!["real-pkg-1.0_1"]);
    executor.do_remove("real-pkg").unwrap();

    // Not installed, no ellipsis: fabricated by interleaving, dropped
    feed(&mut executor, &state, "removing orphan-pkg\n");
    assert!(texts(&drain(&mut sub)).is_empty());

    // Confirmed installed: emitted red
    feed(&mut executor, &state, "removing real-pkg-1.0_1\n");
    let emitted = texts(&drain(&mut sub));
    assert_eq!(emitted.len(), 1);
    assert!(emitted[0].contains("#E55451"));

    // Ellipsis bypasses the query entirely
    feed(&mut executor, &state, "removing another-orphan...\n");
    let emitted = texts(&drain(&mut sub));
    assert_eq!(emitted.len(), 1);
}

#[test]
fn test_stderr_flows_through_same_pipeline() {
    let (mut executor, state, mut sub) = harness(vec![]);
    executor.do_install("foo").unwrap();

    state
        .stderr
        .lock()
        .unwrap()
        .push_str("ERROR: foo-1.0_1 is not synced\n");
    executor.handle_event(ProcessEvent::ErrorReady);

    let events = drain(&mut sub);
    assert!(events.contains(&UiEvent::ReadOutputError));
    let texts = texts(&events);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("#E55451"));
}

#[test]
fn test_escape_noise_and_prompts_are_scrubbed() {
    let (mut executor, state, mut sub) = harness(vec![]);
    executor.do_install("foo").unwrap();

    feed(
        &mut executor,
        &state,
        "\u{1b}[0;1minstalled foo-1.0_1\u{1b}[0m\nDo you want to continue? [Y/n] \u{1b}[0m\n",
    );

    let texts = texts(&drain(&mut sub));
    assert_eq!(texts.len(), 1);
    assert!(!texts[0].contains('\u{1b}'));
    assert!(texts[0].contains("installed foo-1.0_1"));
}

#[test]
fn test_terminal_bound_operations_emit_nothing() {
    let (mut executor, state, mut sub) = harness(vec![]);
    executor.do_system_upgrade_in_terminal().unwrap();
    executor.handle_event(ProcessEvent::Started);

    feed(&mut executor, &state, "installing foo-1.0_1\nbar.xbps: 45%\n100%\n");

    let events = drain(&mut sub);
    assert!(percentages(&events).is_empty());
    // The preamble still announces the upgrade; nothing else comes out
    let texts = texts(&events);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Starting full system upgrade..."));
}

#[test]
fn test_duplicate_chunks_dedup_across_reads() {
    let (mut executor, state, mut sub) = harness(vec![]);
    executor.do_sync_database().unwrap();

    for _ in 0..3 {
        feed(&mut executor, &state, "x86_64-repodata: verifying RSA signature...\n");
    }

    let texts = texts(&drain(&mut sub));
    assert_eq!(texts.len(), 1);
}

#[test]
fn test_finished_passthrough_preserves_exit_information() {
    use xbpsbridge::ExitStatusKind;

    let (mut executor, _state, mut sub) = harness(vec![]);
    executor.do_install("foo").unwrap();
    executor.handle_event(ProcessEvent::Finished {
        exit_code: 19,
        status: ExitStatusKind::Normal,
    });

    let events = drain(&mut sub);
    assert!(events.contains(&UiEvent::Finished {
        exit_code: 19,
        status: ExitStatusKind::Normal,
    }));
}
