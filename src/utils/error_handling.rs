use std::time::Duration;
use tokio::runtime::Runtime;

/// Creates a lightweight single-threaded Tokio runtime
///
/// Background workers each own one of these on their own OS thread, so the
/// multi-threaded scheduler (one worker per CPU core) would only add idle threads.
///
/// Returns `Ok(Runtime)` if successful, or `Err(String)` with error message
pub fn create_runtime() -> Result<Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to create runtime: {}", e))
}

/// Tear a worker runtime down without waiting on stuck blocking tasks
///
/// Dropping a `Runtime` waits for every `spawn_blocking` job, and a DNS lookup
/// parked in `getaddrinfo` cannot be cancelled. Anything still running after
/// `grace` is detached and left to finish on its own.
pub fn shutdown_runtime(rt: Runtime, grace: Duration) {
    rt.shutdown_timeout(grace);
}
