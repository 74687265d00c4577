//! Shared helpers for the `assetpipe` integration tests.
//!
//! - [`builders`]: config builder and mock-filesystem project fixtures.
//! - [`fake_compiler`]: an `AssetCompiler` that never spawns a process.
//! - [`logs`]: in-memory log capture for asserting on reported events.

pub mod builders;
pub mod fake_compiler;
pub mod logs;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for any single async test step.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary.
///
/// Output goes through `with_test_writer()`, so it only shows up for failing
/// tests (or with `--nocapture`). The filter comes from `ASSETPIPE_LOG`, then
/// `RUST_LOG`, then defaults to `warn`; pipelines log every file change at
/// `info`, which is noise in test output.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("ASSETPIPE_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
///
/// Pipeline runs resolve only once every build settled; a hang here means a
/// build task never finished.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not settle within {TEST_TIMEOUT:?}"),
    }
}
