#![cfg(unix)]

mod common;
use crate::common::{buffered_sink, init_tracing, with_timeout, write_script};

use std::error::Error;
use std::time::{Duration, Instant};

use tempfile::tempdir;

use cmdchain::{CollectionKind, Command, CommandHandler, RunState};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn prefixed_scripts_stream_output_after_status_line() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let ok = write_script(dir.path(), "ok.sh", "printf 'foo\\n'\n");
    let ok = ok.display().to_string();

    let (sink, out) = buffered_sink();
    let mut handler = CommandHandler::new(out).with_prefix("sh ");
    handler.add(ok.as_str())?.add_collection([ok.as_str()])?;

    with_timeout(handler.execute(None, true)).await?;

    let expected = format!("Executing: sh {ok}\nfoo\n");
    assert_eq!(sink.fetch(), format!("{expected}{expected}"));
    assert!(!handler.has_error());
    assert!(!handler.has_skipped());
    assert_eq!(handler.state(), RunState::Completed);

    Ok(())
}

#[tokio::test]
async fn failing_required_script_keeps_sentinel_from_running() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let sentinel = dir.path().join("sentinel");
    let ok = write_script(dir.path(), "ok.sh", "printf 'foo\\n'\n");
    let bad = write_script(dir.path(), "bad.sh", "exit 1\n");
    let touch = write_script(
        dir.path(),
        "touch.sh",
        &format!("touch '{}'\n", sentinel.display()),
    );

    let (sink, out) = buffered_sink();
    let mut handler = CommandHandler::new(out).with_prefix("sh ");
    handler.add_collection([&ok, &ok, &bad, &touch].map(|p| p.display().to_string()))?;

    with_timeout(handler.execute(None, true)).await?;

    assert!(!sentinel.exists());
    assert_eq!(handler.state(), RunState::Halted);

    handler.show_error_messages()?;
    let bad_cmd = format!("sh {}", bad.display());
    let ok_cmd = format!("sh {}", ok.display());
    assert_eq!(
        sink.fetch(),
        format!(
            "Executing: {ok_cmd}\nfoo\nExecuting: {ok_cmd}\nfoo\nExecuting: {bad_cmd}\nError: {bad_cmd}\n"
        )
    );

    // The failure is retried, the successes are not.
    with_timeout(handler.execute(None, true)).await?;
    let second = sink.fetch();
    assert_eq!(second.matches("Executing:").count(), 1);
    assert!(second.contains(&format!("Executing: {bad_cmd}")));
    assert!(second.contains(&format!("Cached: {ok_cmd}")));

    Ok(())
}

#[tokio::test]
async fn skippable_script_failure_does_not_stop_later_commands() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let sentinel = dir.path().join("sentinel");

    let (_sink, out) = buffered_sink();
    let mut handler = CommandHandler::new(out);
    handler
        .add_skippable("exit 7")?
        .add(format!("touch '{}'", sentinel.display()))?;

    with_timeout(handler.execute(None, true)).await?;

    assert!(sentinel.exists());
    assert!(handler.has_skipped());
    assert!(!handler.has_error());
    assert_eq!(handler.state(), RunState::Completed);

    Ok(())
}

#[tokio::test]
async fn command_timeout_kills_and_halts() -> TestResult {
    init_tracing();

    let (_sink, out) = buffered_sink();
    let mut handler = CommandHandler::new(out).with_timeout(Some(Duration::from_secs(30)));
    handler
        .add_command(Command::new("sleep 5").with_timeout(Duration::from_millis(150)))?
        .add("echo unreachable")?;

    let started = Instant::now();
    with_timeout(handler.execute(None, true)).await?;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(handler.state(), RunState::Halted);
    let errors: Vec<_> = handler
        .collection(CollectionKind::Error)
        .map(|c| c.iter().map(|cmd| cmd.command().to_string()).collect())
        .unwrap_or_default();
    assert_eq!(errors, vec!["sleep 5".to_string()]);

    Ok(())
}

#[tokio::test]
async fn timeout_also_kills_what_the_command_started() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let sentinel = dir.path().join("sentinel");

    let (_sink, out) = buffered_sink();
    let mut handler = CommandHandler::new(out);
    handler.add_command(
        Command::new(format!("(sleep 1; touch '{}'); true", sentinel.display()))
            .with_timeout(Duration::from_millis(200)),
    )?;

    with_timeout(handler.execute(None, true)).await?;
    assert_eq!(handler.state(), RunState::Halted);

    // Long enough for the orphaned subshell to have touched the file.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!sentinel.exists());

    Ok(())
}
