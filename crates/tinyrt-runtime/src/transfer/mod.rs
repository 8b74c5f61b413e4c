//! Collaborators used by the install protocol
//!
//! - [`fetch`]: streams a URL to a local file
//! - [`extract`]: unpacks `.tar.gz` and `.zip` archives
//! - [`client`]: HTTP client construction
//!
//! Both collaborators are traits so backends can be driven by stubs in tests.

pub mod client;
pub mod extract;
pub mod fetch;

// Re-exports for convenient access
pub use client::{DOWNLOAD_TIMEOUT, USER_AGENT, build_client};
pub use extract::{ArchiveExtractor, Extractor, extract_tar_gz, extract_zip};
pub use fetch::{FetchError, Fetcher, HttpFetcher, download_to_file};
