//! Shared helpers for cmdchain's integration tests.

pub mod builders;
pub mod scripted_backend;

use std::future::Future;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for a single test's async work. Real shell commands in the
/// tests sleep for at most a few seconds before being killed.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Route `tracing` output into the test harness.
///
/// Captured output is only shown for failing tests (or with
/// `--nocapture`). The filter comes from `CMDCHAIN_LOG`, defaulting to
/// `warn` to keep failures readable. Calling this more than once is fine.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("CMDCHAIN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test future did not finish within {TEST_TIMEOUT:?}"),
    }
}
