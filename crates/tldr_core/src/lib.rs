pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fuzzy;
pub mod index;
pub mod language;
pub mod page;
pub mod platform;
pub mod repository;

#[cfg(test)]
mod test_support;

pub use error::{ErrorKind, Result, TldrError};
pub use fetch::{ArchiveFetcher, CancelToken, FetchConfig, FetchError, HttpArchiveFetcher};
pub use index::{CommandIndex, IndexEntry};
pub use page::{Example, Page, PlaceholderStyle};
pub use platform::Platform;
pub use repository::{InitReport, Repository, RepositoryOptions};
