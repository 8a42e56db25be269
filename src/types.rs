use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How a single field (prefix or timeout) is resolved when one handler's
/// commands are merged into another.
///
/// - `Non`: keep the donor's value; the receiver never contributes.
/// - `NotDefined`: use the receiver's value only when the donor has none.
/// - `All`: always use the receiver's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    #[default]
    Non,
    NotDefined,
    All,
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "non" | "none" => Ok(MergeMode::Non),
            "not_defined" | "not-defined" => Ok(MergeMode::NotDefined),
            "all" => Ok(MergeMode::All),
            other => Err(format!(
                "invalid merge mode: {other} (expected \"non\", \"not_defined\" or \"all\")"
            )),
        }
    }
}

/// The well-known collections every handler owns.
///
/// The string ids returned by [`CollectionKind::as_str`] are stable; code
/// inspecting a handler from the outside keys off them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionKind {
    /// Every queued command, in insertion order.
    All,
    /// Skippable commands that failed.
    Skipped,
    /// The required command that halted the run.
    Error,
    /// Commands that completed successfully and are skipped by later runs.
    Cached,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::All,
        CollectionKind::Skipped,
        CollectionKind::Error,
        CollectionKind::Cached,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::All => "all",
            CollectionKind::Skipped => "skipped",
            CollectionKind::Error => "error",
            CollectionKind::Cached => "cached",
        }
    }

    /// Label used in `"<LABEL>: <command>"` status lines.
    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::All => "Queued",
            CollectionKind::Skipped => "Skipped",
            CollectionKind::Error => "Error",
            CollectionKind::Cached => "Cached",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("unknown collection: {s}"))
    }
}

/// Lifecycle of a handler's most recent `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Commands queued, nothing run yet.
    #[default]
    Idle,
    /// Iterating the executable set.
    Running,
    /// Ran to the end without a fatal failure.
    Completed,
    /// A required command failed; the rest of the run was abandoned.
    Halted,
}
