// tests/workflow_validation.rs

use servectl::launch::{LaunchSpec, TrialOutput};
use servectl::workflow::{
    self, BenignNoticeFilter, WorkflowAction, WorkflowEvent, WorkflowMachine, WorkflowOutcome,
    WorkflowState,
};
use servectl_test_utils::fakes::{FakeLauncher, LaunchEvent};
use servectl_test_utils::{init_tracing, with_timeout};

fn spec() -> LaunchSpec {
    LaunchSpec {
        program: "node".to_string(),
        entry_point: "./backend.js".into(),
        cwd: ".".into(),
    }
}

// ---------------------------------------------------------------------------
// Pure machine
// ---------------------------------------------------------------------------

#[test]
fn stdout_promotes() {
    let mut m = WorkflowMachine::new();
    let actions = m.handle(WorkflowEvent::StdoutReady("listening on 8080".into()));

    assert_eq!(
        actions,
        vec![WorkflowAction::TerminateTrial, WorkflowAction::SpawnDetached]
    );
    assert_eq!(m.state(), WorkflowState::Promoting);
    assert!(m.is_decided());
}

#[test]
fn stderr_aborts_and_reports_line() {
    let mut m = WorkflowMachine::new();
    let actions = m.handle(WorkflowEvent::StderrLine("Error: EADDRINUSE".into()));

    assert_eq!(actions.len(), 3);
    assert_eq!(
        actions[0],
        WorkflowAction::ReportStderr("Error: EADDRINUSE".into())
    );
    assert_eq!(actions[1], WorkflowAction::TerminateTrial);
    assert!(matches!(actions[2], WorkflowAction::MarkFailed(_)));
    assert_eq!(m.state(), WorkflowState::Aborting);
}

#[test]
fn deprecation_notice_is_ignored() {
    let mut m = WorkflowMachine::new();

    let actions = m.handle(WorkflowEvent::StderrLine(
        "(node:1234) [DEP0040] DeprecationWarning: The `punycode` module is deprecated.".into(),
    ));
    assert!(actions.is_empty());

    let actions = m.handle(WorkflowEvent::StderrLine(
        "(Use `node --trace-deprecation ...` to show where the warning was created)".into(),
    ));
    assert!(actions.is_empty());

    assert_eq!(m.state(), WorkflowState::TrialRunning);
    assert!(!m.is_decided());
}

#[test]
fn early_exit_aborts_without_terminating() {
    let mut m = WorkflowMachine::new();
    let actions = m.handle(WorkflowEvent::TrialExited);

    assert_eq!(actions.len(), 1);
    assert!(matches!(actions[0], WorkflowAction::MarkFailed(_)));
    assert_eq!(m.state(), WorkflowState::Aborting);
}

#[test]
fn first_verdict_wins() {
    let mut m = WorkflowMachine::new();
    m.handle(WorkflowEvent::StdoutReady("ready".into()));

    assert!(m.handle(WorkflowEvent::StderrLine("late error".into())).is_empty());
    assert!(m.handle(WorkflowEvent::TrialExited).is_empty());
    assert_eq!(m.state(), WorkflowState::Promoting);

    m.finish();
    assert_eq!(m.state(), WorkflowState::Done);
}

#[test]
fn finish_before_verdict_keeps_running_state() {
    let mut m = WorkflowMachine::new();
    m.finish();
    assert_eq!(m.state(), WorkflowState::TrialRunning);
}

#[test]
fn benign_filter_only_matches_notices() {
    let filter = BenignNoticeFilter::new();
    assert!(filter.is_benign("(node:42) DeprecationWarning: Buffer() is deprecated"));
    assert!(filter.is_benign("(Use `node --trace-warnings ...` to show where the warning was created)"));
    assert!(!filter.is_benign("TypeError: cannot read properties of undefined"));
    assert!(!filter.is_benign("Warning: something else"));
}

#[test]
fn deprecation_chunk_with_hint_is_ignored() {
    let mut m = WorkflowMachine::new();
    let chunk = "(node:7) [DEP0005] DeprecationWarning: Buffer() is deprecated.\n\
                 (Use `node --trace-deprecation ...` to show where the warning was created)\n";

    assert!(m.handle(WorkflowEvent::StderrLine(chunk.into())).is_empty());
    assert_eq!(m.state(), WorkflowState::TrialRunning);
}

#[test]
fn hint_on_later_line_of_chunk_is_benign() {
    let filter = BenignNoticeFilter::new();
    assert!(filter.is_benign(
        "\n(Use `node --trace-warnings ...` to show where the warning was created)"
    ));
}

#[test]
fn partial_stdout_chunk_promotes() {
    let mut m = WorkflowMachine::new();
    let actions = m.handle(WorkflowEvent::StdoutReady("listen".into()));
    assert_eq!(
        actions,
        vec![WorkflowAction::TerminateTrial, WorkflowAction::SpawnDetached]
    );
}

// ---------------------------------------------------------------------------
// Async driver with a fake launcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ready_trial_is_promoted_once() {
    init_tracing();
    let launcher = FakeLauncher::new().with_trial_output(vec![
        TrialOutput::Stderr("(node:1) DeprecationWarning: old api".into()),
        TrialOutput::Stdout("Server listening on 8080".into()),
        TrialOutput::Stderr("late noise".into()),
    ]);

    let outcome = with_timeout(workflow::run(&launcher, &spec()))
        .await
        .expect("workflow runs");

    assert_eq!(outcome, WorkflowOutcome::Promoted);
    assert!(outcome.is_success());
    assert_eq!(
        launcher.events(),
        vec![
            LaunchEvent::Monitored(spec()),
            LaunchEvent::TrialTerminated,
            LaunchEvent::Detached(spec()),
            LaunchEvent::TrialDisowned,
        ]
    );
}

#[tokio::test]
async fn stderr_trial_is_aborted_without_spawn() {
    let launcher = FakeLauncher::new().with_trial_output(vec![
        TrialOutput::Stderr("Error: Cannot find module 'express'".into()),
        TrialOutput::Stdout("never reached".into()),
    ]);

    let outcome = with_timeout(workflow::run(&launcher, &spec()))
        .await
        .expect("workflow runs");

    match outcome {
        WorkflowOutcome::Aborted { reason } => assert!(reason.contains("stderr"), "got {reason}"),
        other => panic!("expected abort, got {other:?}"),
    }
    assert!(launcher.detached_spawns().is_empty());
    assert!(launcher.trial_terminated());
}

#[tokio::test]
async fn silent_exit_is_aborted() {
    let launcher = FakeLauncher::new().with_trial_output(vec![]);

    let outcome = with_timeout(workflow::run(&launcher, &spec()))
        .await
        .expect("workflow runs");

    assert!(matches!(outcome, WorkflowOutcome::Aborted { .. }));
    assert!(launcher.detached_spawns().is_empty());
    assert!(!launcher.trial_terminated());
}

#[tokio::test]
async fn verdict_does_not_wait_for_streams_to_close() {
    let launcher = FakeLauncher::new()
        .with_trial_output(vec![TrialOutput::Stdout("ready".into())])
        .hold_trial_open();

    let outcome = with_timeout(workflow::run(&launcher, &spec()))
        .await
        .expect("workflow runs");

    assert_eq!(outcome, WorkflowOutcome::Promoted);
    assert_eq!(launcher.detached_spawns().len(), 1);
}

#[tokio::test]
async fn trial_spawn_failure_is_an_error() {
    let launcher = FakeLauncher::new().failing_monitored();

    let err = workflow::run(&launcher, &spec())
        .await
        .expect_err("spawn failure must surface");
    assert!(err.to_string().contains("monitored spawn failed"));
    assert!(launcher.events().is_empty());
}

#[tokio::test]
async fn promotion_spawn_failure_is_an_error() {
    let launcher = FakeLauncher::new()
        .with_trial_output(vec![TrialOutput::Stdout("ready".into())])
        .failing_detached();

    let result = with_timeout(workflow::run(&launcher, &spec())).await;
    assert!(result.is_err());
    assert!(launcher.trial_terminated());
}

#[tokio::test]
async fn custom_filter_can_be_supplied() {
    let launcher = FakeLauncher::new().with_trial_output(vec![
        TrialOutput::Stderr("(node:9) DeprecationWarning: strict filter".into()),
    ]);
    let machine = WorkflowMachine::with_filter(BenignNoticeFilter::default());

    let outcome = with_timeout(workflow::run_with(&launcher, &spec(), machine))
        .await
        .expect("workflow runs");

    // The notice is ignored, then the closed stream counts as an exit.
    assert!(matches!(outcome, WorkflowOutcome::Aborted { .. }));
    assert!(!launcher.trial_terminated());
}

// ---------------------------------------------------------------------------
// Real processes
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod unix_processes {
    use std::fs;

    use servectl::launch::{LaunchSpec, Launcher, TrialOutput, UnixLauncher};
    use servectl::workflow::{self, WorkflowOutcome};
    use servectl_test_utils::with_timeout;

    fn script_spec(dir: &std::path::Path, body: &str) -> LaunchSpec {
        let script = dir.join("server.sh");
        fs::write(&script, body).expect("write script");
        LaunchSpec {
            program: "sh".to_string(),
            entry_point: script,
            cwd: dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn monitored_trial_streams_both_outputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = script_spec(dir.path(), "echo out-line\necho err-line >&2\n");

        let mut trial = UnixLauncher.spawn_monitored(&spec).expect("spawn");
        let mut stdout = String::new();
        let mut stderr = String::new();
        while let Some(chunk) = with_timeout(trial.output.recv()).await {
            match chunk {
                TrialOutput::Stdout(s) => stdout.push_str(&s),
                TrialOutput::Stderr(s) => stderr.push_str(&s),
            }
        }

        assert_eq!(stdout, "out-line\n");
        assert_eq!(stderr, "err-line\n");
        trial.control.terminate().await.expect("terminate after exit is ok");
    }

    #[tokio::test]
    async fn monitored_trial_decodes_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = script_spec(dir.path(), "printf 'ok\\377'\nexec sleep 10\n");

        let mut trial = UnixLauncher.spawn_monitored(&spec).expect("spawn");
        let first = with_timeout(trial.output.recv()).await;

        assert_eq!(first, Some(TrialOutput::Stdout("ok\u{FFFD}".to_string())));
        trial.control.terminate().await.expect("terminate");
    }

    #[tokio::test]
    async fn real_trial_that_reports_ready_is_promoted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = script_spec(dir.path(), "echo ready\n");

        let outcome = with_timeout(workflow::run(&UnixLauncher, &spec))
            .await
            .expect("workflow runs");
        assert_eq!(outcome, WorkflowOutcome::Promoted);
    }

    #[tokio::test]
    async fn ready_banner_without_newline_is_promoted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = script_spec(dir.path(), "printf listening\nexec sleep 10\n");

        let outcome = with_timeout(workflow::run(&UnixLauncher, &spec))
            .await
            .expect("workflow runs");
        assert_eq!(outcome, WorkflowOutcome::Promoted);
    }

    #[tokio::test]
    async fn non_utf8_stdout_is_promoted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = script_spec(dir.path(), "printf '\\377\\n'\nexec sleep 10\n");

        let outcome = with_timeout(workflow::run(&UnixLauncher, &spec))
            .await
            .expect("workflow runs");
        assert_eq!(outcome, WorkflowOutcome::Promoted);
    }

    #[tokio::test]
    async fn stderr_without_newline_is_aborted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = script_spec(dir.path(), "printf boom >&2\nexec sleep 10\n");

        let outcome = with_timeout(workflow::run(&UnixLauncher, &spec))
            .await
            .expect("workflow runs");
        assert!(matches!(outcome, WorkflowOutcome::Aborted { .. }), "got {outcome:?}");
    }

    #[tokio::test]
    async fn real_trial_with_stderr_is_killed_and_aborted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = script_spec(dir.path(), "echo boom >&2\nexec sleep 30\n");

        let outcome = with_timeout(workflow::run(&UnixLauncher, &spec))
            .await
            .expect("workflow runs");
        assert!(matches!(outcome, WorkflowOutcome::Aborted { .. }));
    }
}
