use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, warn};
use zip::ZipArchive;

pub const DEFAULT_USER_AGENT: &str = "tldr-rust/0.2";
const DOWNLOAD_CHUNK_BYTES: usize = 64 * 1024;
const FALLBACK_ARCHIVE_NAME: &str = "tldr.zip";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("failed to download archive")]
    Transport(#[source] reqwest::Error),

    #[error("http response code was {status} for downloading from {url}")]
    Status { status: u16, url: String },

    #[error("failed to read archive response body")]
    Body(#[source] io::Error),

    #[error("no files in archive")]
    EmptyArchive,

    #[error("failed to read archive")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive entry escapes destination: {name}")]
    UnsafeEntry { name: String },

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl FetchError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Cooperative cancellation with an optional deadline. Clones share the
/// cancelled flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::default(),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn check(&self) -> Result<(), FetchError> {
        if self.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        Ok(())
    }
}

/// Downloads a remote archive and extracts it over `dest`.
pub trait ArchiveFetcher {
    fn fetch_and_unpack(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancelToken,
    ) -> Result<(), FetchError>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

pub struct HttpArchiveFetcher {
    client: Client,
}

impl HttpArchiveFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Streams `url` into `path`, checking `cancel` between chunks.
    pub fn download(&self, url: &str, path: &Path, cancel: &CancelToken) -> Result<u64, FetchError> {
        cancel.check()?;
        let mut request = self.client.get(url);
        if let Some(remaining) = cancel.remaining() {
            request = request.timeout(remaining);
        }
        let mut response = request.send().map_err(FetchError::Transport)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = File::create(path).map_err(|source| FetchError::io(path, source))?;
        let mut buffer = vec![0u8; DOWNLOAD_CHUNK_BYTES];
        let mut written = 0u64;
        loop {
            cancel.check()?;
            let read = match response.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(FetchError::Body(error)),
            };
            file.write_all(&buffer[..read])
                .map_err(|source| FetchError::io(path, source))?;
            written = written.saturating_add(read as u64);
        }
        file.flush().map_err(|source| FetchError::io(path, source))?;
        Ok(written)
    }
}

impl ArchiveFetcher for HttpArchiveFetcher {
    fn fetch_and_unpack(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancelToken,
    ) -> Result<(), FetchError> {
        let archive_path = dest.join(archive_file_name(url));
        let result = self
            .download(url, &archive_path, cancel)
            .and_then(|bytes| {
                debug!(url, bytes, "downloaded archive");
                unpack_archive(&archive_path, dest, cancel)
            })
            .map(|entries| debug!(entries, dest = %dest.display(), "unpacked archive"));
        if archive_path.exists()
            && let Err(error) = fs::remove_file(&archive_path)
        {
            warn!(path = %archive_path.display(), %error, "failed to remove downloaded archive");
        }
        result
    }
}

/// Last path segment of `url`, without query or fragment.
pub fn archive_file_name(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    match without_query.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => FALLBACK_ARCHIVE_NAME.to_string(),
    }
}

/// Extracts every entry of the zip at `archive_path` into `dest`,
/// overwriting existing files. Returns the number of entries.
pub fn unpack_archive(
    archive_path: &Path,
    dest: &Path,
    cancel: &CancelToken,
) -> Result<usize, FetchError> {
    let file = File::open(archive_path).map_err(|source| FetchError::io(archive_path, source))?;
    let mut archive = ZipArchive::new(file)?;
    if archive.len() == 0 {
        return Err(FetchError::EmptyArchive);
    }

    for index in 0..archive.len() {
        cancel.check()?;
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(FetchError::UnsafeEntry {
                name: entry.name().to_string(),
            });
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|source| FetchError::io(&target, source))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| FetchError::io(parent, source))?;
        }
        let mut out = File::create(&target).map_err(|source| FetchError::io(&target, source))?;
        io::copy(&mut entry, &mut out).map_err(|source| FetchError::io(&target, source))?;
    }

    Ok(archive.len())
}
