//! HTTP client construction for artifact downloads

use reqwest::Client;
use std::time::Duration;

/// Timeout for a whole artifact download (5 minutes for large distributions)
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("tinyrt/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client with the tinyrt user agent
///
/// # Errors
///
/// Returns error if the TLS backend cannot be initialized
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
