use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::cache::CacheFile;
use crate::error::{Result, TldrError};
use crate::fetch::{ArchiveFetcher, CancelToken};
use crate::index::{self, CommandIndex, INDEX_FILE_NAME};
use crate::language::{language_dir, language_priorities_with_lookup, platform_priorities};
use crate::page::{Page, parse_page};
use crate::platform::Platform;

pub const PAGE_SOURCE_URL: &str = "https://tldr.sh/assets/tldr.zip";
const PAGE_EXTENSION: &str = "md";

#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Probed before `common`.
    pub platform: Option<Platform>,
    /// Exact language choice; `None` derives the order from the locale.
    pub language: Option<String>,
    /// Refresh during `initialize` even when the mirror already exists.
    pub force_update: bool,
    pub source_url: String,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            platform: None,
            language: None,
            force_update: false,
            source_url: PAGE_SOURCE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    pub created_root: bool,
    pub refreshed: bool,
}

/// Local mirror of pages laid out as
/// `<root>/<pages[.lang]>/<platform>/<command>.md` plus `<root>/index.json`.
pub struct Repository<F> {
    root: PathBuf,
    source_url: String,
    platforms: Vec<Platform>,
    languages: Vec<String>,
    force_update: bool,
    fetcher: F,
}

impl<F: ArchiveFetcher> Repository<F> {
    pub fn new(root: impl Into<PathBuf>, options: RepositoryOptions, fetcher: F) -> Self {
        Self::with_env_lookup(root, options, fetcher, |key| env::var(key).ok())
    }

    pub fn with_env_lookup<L>(
        root: impl Into<PathBuf>,
        options: RepositoryOptions,
        fetcher: F,
        lookup_env: L,
    ) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        Self {
            root: root.into(),
            source_url: options.source_url,
            platforms: platform_priorities(options.platform),
            languages: language_priorities_with_lookup(options.language.as_deref(), lookup_env),
            force_update: options.force_update,
            fetcher,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    /// Creates the mirror directory if needed and refreshes it when it was
    /// just created or a refresh was requested. The index file must exist
    /// afterwards.
    pub fn initialize(&self, cancel: &CancelToken) -> Result<InitReport> {
        let mut created_root = false;
        if !self.root.exists() {
            fs::create_dir_all(&self.root)
                .map_err(|source| TldrError::io("create mirror directory", &self.root, source))?;
            info!(root = %self.root.display(), "created mirror directory");
            created_root = true;
        }

        let refreshed = self.force_update || created_root;
        if refreshed {
            self.update(cancel)?;
        }

        let index_path = self.index_path();
        if !index_path.exists() {
            return Err(TldrError::MirrorCorrupt { index_path });
        }

        Ok(InitReport {
            created_root,
            refreshed,
        })
    }

    /// Full refresh: fetch the archive and extract it over the mirror.
    pub fn update(&self, cancel: &CancelToken) -> Result<()> {
        let started = Instant::now();
        info!(url = %self.source_url, root = %self.root.display(), "updating mirror");
        self.fetcher
            .fetch_and_unpack(&self.source_url, &self.root, cancel)
            .map_err(|source| TldrError::Fetch {
                url: self.source_url.clone(),
                source,
            })?;
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "mirror updated");
        Ok(())
    }

    /// Resolves `tokens` to the first existing page in platform-major,
    /// language-minor order.
    /// Tokens that could leave the pages tree resolve to nothing.
    pub fn find_page(&self, tokens: &[String]) -> Result<Page> {
        let file_name = page_file_name(tokens);
        if !tokens.iter().all(|token| is_page_token(token)) {
            debug!(page = %file_name, "query escapes the pages tree");
            return Err(TldrError::NotFound { page: file_name });
        }
        for path in self.candidate_paths(&file_name) {
            if !path.exists() {
                trace!(path = %path.display(), "page candidate missing");
                continue;
            }

            debug!(path = %path.display(), "found page");
            let file =
                File::open(&path).map_err(|source| TldrError::io("open page", &path, source))?;
            return parse_page(BufReader::new(file))
                .map_err(|source| TldrError::io("read page", &path, source));
        }

        Err(TldrError::NotFound { page: file_name })
    }

    /// Every path `find_page` would probe, in probe order.
    pub fn candidate_paths(&self, file_name: &str) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(self.platforms.len() * self.languages.len());
        for platform in &self.platforms {
            for language in &self.languages {
                paths.push(
                    self.root
                        .join(language_dir(language))
                        .join(platform.as_str())
                        .join(file_name),
                );
            }
        }
        paths
    }

    pub fn expired(&self, max_age: Duration) -> bool {
        CacheFile::new(&self.root, INDEX_FILE_NAME).expired(max_age)
    }

    pub fn load_index(&self) -> Result<CommandIndex> {
        index::load_index(&self.index_path())
    }
}

/// `["git", "checkout"]` -> `git-checkout.md`.
pub fn page_file_name(tokens: &[String]) -> String {
    format!("{}.{PAGE_EXTENSION}", index::normalize_query(tokens))
}

fn is_page_token(token: &str) -> bool {
    !token.contains(['/', '\\']) && !token.contains("..")
}
