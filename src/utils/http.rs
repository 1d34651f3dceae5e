//! HTTP client construction shared by the counter worker and the resource bootstrap

use std::time::Duration;

const USER_AGENT: &str = concat!("OrbOnTheGo/", env!("CARGO_PKG_VERSION"));

/// Async client for counter calls. The timeout covers the whole request,
/// after which the call is abandoned and reported as `SyncError::Timeout`.
pub fn counter_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}

/// Blocking client for first-run downloads (runs before the window opens)
pub fn download_client(timeout: Duration) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
