mod common;
use crate::common::{buffered_sink, init_tracing, with_timeout};

use std::error::Error;
use std::time::Duration;

use proptest::prelude::*;

use cmdchain::handler::merge;
use cmdchain::{Command, CommandHandler, MergeMode};
use cmdchain_test_utils::scripted_backend::{RecordedRun, ScriptedBackend};

type TestResult = Result<(), Box<dyn Error>>;

fn handler(prefix: &str, timeout: Option<Duration>) -> CommandHandler {
    let (_sink, out) = buffered_sink();
    CommandHandler::with_backend(ScriptedBackend::new(), out)
        .with_prefix(prefix)
        .with_timeout(timeout)
}

fn summary(h: &CommandHandler) -> Vec<(String, Option<Duration>, bool)> {
    h.commands()
        .iter()
        .map(|c| (c.command().to_string(), c.timeout(), c.is_required()))
        .collect()
}

#[test]
fn merge_non_keeps_plain_donor_commands_verbatim() -> TestResult {
    init_tracing();

    let mut donor = handler("", None);
    donor.add("echo a")?.add_skippable("echo b")?;

    let mut receiver = handler("php ", Some(Duration::from_secs(3)));
    receiver.add_handler(&donor, MergeMode::Non, MergeMode::Non);

    assert_eq!(summary(&receiver), summary(&donor));
    Ok(())
}

#[test]
fn merge_not_defined_prefix_only_fills_missing_donor_prefix() -> TestResult {
    let mut bare = handler("", None);
    bare.add("./a")?;
    let mut prefixed = handler("sh ", None);
    prefixed.add("./b")?;

    let mut receiver = handler("php ", None);
    receiver
        .add_handler(&bare, MergeMode::NotDefined, MergeMode::Non)
        .add_handler(&prefixed, MergeMode::NotDefined, MergeMode::Non);

    let texts: Vec<_> = receiver.commands().iter().map(|c| c.command()).collect();
    assert_eq!(texts, vec!["php ./a", "sh ./b"]);
    Ok(())
}

#[test]
fn merge_not_defined_timeout_prefers_the_donor_chain() -> TestResult {
    let own = Duration::from_millis(100);
    let donor_default = Duration::from_secs(2);
    let receiver_default = Duration::from_secs(9);

    let mut donor_without_default = handler("", None);
    donor_without_default
        .add("no-timeout")?
        .add_command(Command::new("own").with_timeout(own))?;

    let mut donor_with_default = handler("", Some(donor_default));
    donor_with_default.add("backfilled")?;

    let mut receiver = handler("", Some(receiver_default));
    receiver
        .add_handler(&donor_without_default, MergeMode::Non, MergeMode::NotDefined)
        .add_handler(&donor_with_default, MergeMode::Non, MergeMode::NotDefined);

    let timeouts: Vec<_> = receiver.commands().iter().map(|c| c.timeout()).collect();
    assert_eq!(
        timeouts,
        vec![Some(receiver_default), Some(own), Some(donor_default)]
    );
    Ok(())
}

#[test]
fn merge_all_overrides_prefix_and_timeout() -> TestResult {
    let mut donor = handler("sh ", Some(Duration::from_secs(2)));
    donor.add_command(Command::skippable("x").with_timeout(Duration::from_millis(5)))?;

    let mut receiver = handler("nice ", None);
    receiver.add_handler(&donor, MergeMode::All, MergeMode::All);

    assert_eq!(
        summary(&receiver),
        vec![("nice sh x".to_string(), None, false)]
    );
    // Donor untouched.
    assert_eq!(
        summary(&donor),
        vec![("sh x".to_string(), Some(Duration::from_millis(5)), false)]
    );
    Ok(())
}

#[test]
fn empty_donor_is_a_no_op() -> TestResult {
    let donor = handler("sh ", None);
    let mut receiver = handler("", None);
    receiver.add("only")?;

    merge(&mut receiver, &donor, MergeMode::All, MergeMode::All);

    assert_eq!(receiver.commands().len(), 1);
    Ok(())
}

#[test]
fn merged_commands_get_fresh_identities() -> TestResult {
    let mut donor = handler("", None);
    donor.add("a")?;

    let mut receiver = handler("", None);
    receiver.add("r")?;
    receiver.add_handler(&donor, MergeMode::Non, MergeMode::Non);
    receiver.add_handler(&donor, MergeMode::Non, MergeMode::Non);

    let mut ids: Vec<_> = receiver.commands().iter().map(|c| c.id()).collect();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert_eq!(donor.commands()[0].id().map(|id| id.get()), Some(0));
    Ok(())
}

#[tokio::test]
async fn donated_commands_run_with_resolved_timeouts() -> TestResult {
    init_tracing();

    let mut donor = handler("sh ", None);
    donor.add("./setup.sh")?;

    let backend = ScriptedBackend::new();
    let (_sink, out) = buffered_sink();
    let mut receiver = CommandHandler::with_backend(backend.clone(), out)
        .with_timeout(Some(Duration::from_secs(4)));
    receiver.add("main")?;
    receiver.add_handler(&donor, MergeMode::Non, MergeMode::NotDefined);

    with_timeout(receiver.execute(None, true)).await?;

    assert_eq!(
        backend.runs(),
        vec![
            RecordedRun {
                command: "main".to_string(),
                timeout: Some(Duration::from_secs(4)),
            },
            RecordedRun {
                command: "sh ./setup.sh".to_string(),
                timeout: Some(Duration::from_secs(4)),
            },
        ]
    );
    Ok(())
}

fn merge_mode() -> impl Strategy<Value = MergeMode> {
    prop_oneof![
        Just(MergeMode::Non),
        Just(MergeMode::NotDefined),
        Just(MergeMode::All),
    ]
}

fn timeout() -> impl Strategy<Value = Option<Duration>> {
    proptest::option::of((0u64..10_000).prop_map(Duration::from_millis))
}

proptest! {
    #[test]
    fn merged_command_follows_precedence(
        prefix_mode in merge_mode(),
        timeout_mode in merge_mode(),
        receiver_prefix in "[a-z]{0,4}",
        donor_prefix in "[a-z]{0,4}",
        receiver_timeout in timeout(),
        donor_timeout in timeout(),
        own_timeout in timeout(),
    ) {
        let mut donor = handler(&donor_prefix, donor_timeout);
        let mut cmd = Command::new("run");
        if let Some(t) = own_timeout {
            cmd = cmd.with_timeout(t);
        }
        donor.add_command(cmd).unwrap();

        let mut receiver = handler(&receiver_prefix, receiver_timeout);
        receiver.add_handler(&donor, prefix_mode, timeout_mode);

        let donated = &donor.commands()[0];
        let merged = &receiver.commands()[0];

        // Stored donor timeout: own, else donor default.
        prop_assert_eq!(donated.timeout(), own_timeout.or(donor_timeout));

        let expected_prefix = match prefix_mode {
            MergeMode::Non => "",
            MergeMode::All => receiver_prefix.as_str(),
            MergeMode::NotDefined if donor_prefix.is_empty() => receiver_prefix.as_str(),
            MergeMode::NotDefined => "",
        };
        prop_assert_eq!(
            merged.command().to_string(),
            format!("{expected_prefix}{donor_prefix}run")
        );

        let expected_timeout = match timeout_mode {
            MergeMode::Non => donated.timeout(),
            MergeMode::All => receiver_timeout,
            MergeMode::NotDefined => donated.timeout().or(receiver_timeout),
        };
        prop_assert_eq!(merged.timeout(), expected_timeout);
        prop_assert_eq!(donated.command().to_string(), format!("{donor_prefix}run"));
    }
}
