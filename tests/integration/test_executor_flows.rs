//! Supervisor lifecycle tests against real child processes
//!
//! These exercise the tokio-backed `ShellSupervisor` end to end with
//! plain shell commands standing in for the package manager.

use xbpsbridge::events::{ExitStatusKind, ProcessEvent};
use xbpsbridge::exec::{ProcessSupervisor, ShellSupervisor, SuHelper};

#[tokio::test]
async fn test_lifecycle_ordering() {
    let (mut supervisor, mut events) = ShellSupervisor::new(SuHelper::Direct, "xterm");
    supervisor
        .execute_command("echo one; echo two; echo three")
        .expect("spawn");

    let mut order = Vec::new();
    while let Some(event) = events.recv().await {
        let done = matches!(event, ProcessEvent::Finished { .. });
        order.push(event);
        if done {
            break;
        }
    }

    // Started strictly first, Finished strictly last
    assert_eq!(order.first(), Some(&ProcessEvent::Started));
    assert!(matches!(order.last(), Some(ProcessEvent::Finished { .. })));
    assert!(order.contains(&ProcessEvent::OutputReady));

    let output = supervisor.read_all_standard_output();
    assert!(output.contains("one"));
    assert!(output.contains("three"));
}

#[tokio::test]
async fn test_interleaved_streams_keep_separate_buffers() {
    let (mut supervisor, mut events) = ShellSupervisor::new(SuHelper::Direct, "xterm");
    supervisor
        .execute_command("echo out1; echo err1 >&2; echo out2; echo err2 >&2")
        .expect("spawn");

    while let Some(event) = events.recv().await {
        if matches!(event, ProcessEvent::Finished { .. }) {
            break;
        }
    }

    let stdout = supervisor.read_all_standard_output();
    let stderr = supervisor.read_all_standard_error();
    assert!(stdout.contains("out1") && stdout.contains("out2"));
    assert!(stderr.contains("err1") && stderr.contains("err2"));
    assert!(!stdout.contains("err1"));
    assert!(!stderr.contains("out1"));
}

#[tokio::test]
async fn test_exit_code_forwarded_without_interpretation() {
    let (mut supervisor, mut events) = ShellSupervisor::new(SuHelper::Direct, "xterm");
    supervisor.execute_command("exit 42").expect("spawn");

    let mut finished = None;
    while let Some(event) = events.recv().await {
        if let ProcessEvent::Finished { exit_code, status } = event {
            finished = Some((exit_code, status));
            break;
        }
    }

    assert_eq!(finished, Some((42, ExitStatusKind::Normal)));
}

#[tokio::test]
async fn test_spawn_failure_is_an_error_not_an_event() {
    let (mut supervisor, mut events) =
        ShellSupervisor::new(SuHelper::Direct, "no-such-terminal-xyzzy");

    // The terminal binary does not exist; the launch must fail eagerly
    let result = supervisor.run_in_terminal(&["echo hi;".to_string()]);
    assert!(result.is_err());

    // And nothing was published
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_sequential_commands_reuse_the_supervisor() {
    let (mut supervisor, mut events) = ShellSupervisor::new(SuHelper::Direct, "xterm");

    supervisor.execute_command("echo first").expect("spawn");
    while let Some(event) = events.recv().await {
        if matches!(event, ProcessEvent::Finished { .. }) {
            break;
        }
    }
    assert!(supervisor.read_all_standard_output().contains("first"));

    supervisor.execute_command("echo second").expect("spawn");
    while let Some(event) = events.recv().await {
        if matches!(event, ProcessEvent::Finished { .. }) {
            break;
        }
    }
    let output = supervisor.read_all_standard_output();
    assert!(output.contains("second"));
    assert!(!output.contains("first"));
}
