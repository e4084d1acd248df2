//! Obtaining archive bytes for an import.
//!
//! An import reads its archive from one of four places:
//!
//! - a local file
//! - standard input
//! - a direct `http://` or `https://` URL
//! - a release channel (`latest` or `nightly`), whose JSON manifest names
//!   the archive URL
//!
//! All network access goes through the [`HttpClient`] trait so tests can
//! substitute a mock.

mod error;
mod fetcher;
pub mod http;
mod manifest;
mod source;

pub use error::{FetchError, FetchResult};
pub use fetcher::NetworkFetcher;
pub use http::{HttpClient, ReqwestClient};
pub use manifest::{Channel, Release, ReleaseManifest};
pub use source::ImportSource;
