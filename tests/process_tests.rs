#![cfg(unix)]

use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use trimkit::adapters::TokioProcessRunner;
use trimkit::ports::ProcessPort;
use trimkit::DomainError;

fn sh(script: &str) -> Vec<OsString> {
    vec!["-c".into(), script.into()]
}

#[tokio::test]
async fn test_large_output_is_drained_while_running() {
    let runner = TokioProcessRunner::new();
    let result = timeout(
        Duration::from_secs(30),
        runner.run(Path::new("/bin/sh"), &sh("i=0; while [ $i -lt 50000 ]; do echo \"line $i\"; i=$((i+1)); done")),
    )
    .await
    .expect("process hung on a full pipe")
    .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output.lines().count(), 50000);
    assert!(result.output.starts_with("line 0\n"));
    assert!(result.output.trim_end().ends_with("line 49999"));
}

#[tokio::test]
async fn test_stdout_and_stderr_are_combined() {
    let runner = TokioProcessRunner::new();
    let result = runner
        .run(Path::new("/bin/sh"), &sh("echo out; echo err 1>&2"))
        .await
        .unwrap();

    assert!(result.output.contains("out\n"));
    assert!(result.output.contains("err\n"));
}

#[tokio::test]
async fn test_nonzero_exit_is_data() {
    let runner = TokioProcessRunner::new();
    let result = runner
        .run(Path::new("/bin/sh"), &sh("echo failing; exit 3"))
        .await
        .unwrap();

    assert_eq!(result.exit_code, 3);
    assert!(!result.success());
    assert_eq!(result.trimmed_output(), "failing");
}

#[tokio::test]
async fn test_invalid_utf8_is_replaced() {
    let runner = TokioProcessRunner::new();
    let result = runner
        .run(Path::new("/bin/sh"), &sh("printf 'ok\\377done'"))
        .await
        .unwrap();

    assert_eq!(result.output, "ok\u{FFFD}done");
}

#[tokio::test]
async fn test_missing_program_is_spawn_failure() {
    let runner = TokioProcessRunner::new();
    let result = runner
        .run(Path::new("/definitely/not/a/program"), &[])
        .await;

    assert!(matches!(result, Err(DomainError::SpawnFailed { .. })));
}

#[tokio::test]
async fn test_cancellation_kills_the_process() {
    let runner = TokioProcessRunner::new();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = runner
        .run_cancellable(Path::new("/bin/sh"), &sh("exec sleep 30"), &cancel)
        .await;

    assert_eq!(result, Err(DomainError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(10));
}
