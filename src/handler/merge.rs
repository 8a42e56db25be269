// src/handler/merge.rs

//! Prefix/timeout resolution when one handler's commands are donated to
//! another.
//!
//! Donated commands already carry the donor's prefix and the donor's
//! default timeout (both were applied when they entered the donor). The
//! resolution order for a timeout is therefore:
//!
//! 1. the donor command's stored timeout (its own, or the donor default
//!    backfilled at insertion),
//! 2. the receiver's default timeout,
//!
//! with [`MergeMode`] deciding whether step 2 is never, sometimes or always
//! taken.

use std::time::Duration;

use crate::command::Command;
use crate::types::MergeMode;

use super::CommandHandler;

/// Prefix to prepend to a donated command's text.
pub fn resolve_prefix<'a>(mode: MergeMode, receiver_prefix: &'a str, donor_prefix: &str) -> &'a str {
    match mode {
        MergeMode::Non => "",
        MergeMode::All => receiver_prefix,
        MergeMode::NotDefined if donor_prefix.is_empty() => receiver_prefix,
        MergeMode::NotDefined => "",
    }
}

/// Timeout a donated command ends up with.
pub fn resolve_timeout(
    mode: MergeMode,
    receiver_timeout: Option<Duration>,
    donor_command_timeout: Option<Duration>,
) -> Option<Duration> {
    match mode {
        MergeMode::Non => donor_command_timeout,
        MergeMode::All => receiver_timeout,
        MergeMode::NotDefined => donor_command_timeout.or(receiver_timeout),
    }
}

/// Build the receiver's copy of a donated command.
///
/// The returned command has no queue identity yet; the receiver assigns one
/// when it stores it. `donor_command` itself is never touched.
pub fn merge_command(
    receiver: &CommandHandler,
    donor: &CommandHandler,
    donor_command: &Command,
    prefix_mode: MergeMode,
    timeout_mode: MergeMode,
) -> Command {
    let prefix = resolve_prefix(prefix_mode, receiver.prefix(), donor.prefix());
    let timeout = resolve_timeout(timeout_mode, receiver.timeout(), donor_command.timeout());

    let mut merged = Command::new(format!("{prefix}{}", donor_command.command()))
        .with_required(donor_command.is_required());
    merged.set_timeout(timeout);
    merged
}

/// Append every command of `donor` to `receiver`.
///
/// Convenience over [`CommandHandler::add_handler`]; an empty donor is a
/// no-op.
pub fn merge(
    receiver: &mut CommandHandler,
    donor: &CommandHandler,
    prefix_mode: MergeMode,
    timeout_mode: MergeMode,
) {
    receiver.add_handler(donor, prefix_mode, timeout_mode);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECV: Option<Duration> = Some(Duration::from_secs(10));
    const DONOR: Option<Duration> = Some(Duration::from_secs(2));

    #[test]
    fn prefix_modes() {
        assert_eq!(resolve_prefix(MergeMode::Non, "php ", "sh "), "");
        assert_eq!(resolve_prefix(MergeMode::Non, "php ", ""), "");
        assert_eq!(resolve_prefix(MergeMode::All, "php ", "sh "), "php ");
        assert_eq!(resolve_prefix(MergeMode::NotDefined, "php ", ""), "php ");
        assert_eq!(resolve_prefix(MergeMode::NotDefined, "php ", "sh "), "");
    }

    #[test]
    fn timeout_modes() {
        assert_eq!(resolve_timeout(MergeMode::Non, RECV, DONOR), DONOR);
        assert_eq!(resolve_timeout(MergeMode::Non, RECV, None), None);
        assert_eq!(resolve_timeout(MergeMode::All, RECV, DONOR), RECV);
        assert_eq!(resolve_timeout(MergeMode::All, None, DONOR), None);
        assert_eq!(resolve_timeout(MergeMode::NotDefined, RECV, DONOR), DONOR);
        assert_eq!(resolve_timeout(MergeMode::NotDefined, RECV, None), RECV);
        assert_eq!(resolve_timeout(MergeMode::NotDefined, None, None), None);
    }
}
