use std::time::Duration;

use anyhow::{Context, Result};
use tldr_core::index::normalize_query;
use tldr_core::{ArchiveFetcher, IndexEntry, Page, Platform, Repository};
use tracing::debug;

/// What a single invocation produced, independent of the output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    MissingQuery,
    Page(Page),
    /// Ranked index entries for a query with no page.
    Suggestions(Vec<IndexEntry>),
    NotFound { query: String },
    NotFoundInLanguage { language: String },
    Updated,
    UpdateFailed { reason: String },
    UnsupportedPlatform { reason: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::UpdateFailed { .. } | Self::UnsupportedPlatform { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Set to the configured max age when the mirror is older than it.
    pub stale_after: Option<Duration>,
    pub outcome: Outcome,
}

impl Report {
    pub fn plain(outcome: Outcome) -> Self {
        Self {
            stale_after: None,
            outcome,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupRequest<'a> {
    pub tokens: &'a [String],
    pub fuzzy: bool,
    /// Explicit language choice; a miss then reports the language instead of
    /// suggesting other pages.
    pub language: Option<&'a str>,
    pub recommend_update: bool,
    pub max_age: Duration,
}

pub fn lookup<F: ArchiveFetcher>(
    repo: &Repository<F>,
    request: &LookupRequest<'_>,
) -> Result<Report> {
    let stale_after = (request.recommend_update && repo.expired(request.max_age))
        .then_some(request.max_age);

    if request.tokens.is_empty() {
        return Ok(Report {
            stale_after,
            outcome: Outcome::MissingQuery,
        });
    }

    let outcome = match repo.find_page(request.tokens) {
        Ok(page) => Outcome::Page(page),
        Err(error) if error.is_not_found() => {
            debug!(%error, "page lookup missed");
            if let Some(language) = request.language {
                Outcome::NotFoundInLanguage {
                    language: language.to_string(),
                }
            } else if request.fuzzy {
                let index = repo
                    .load_index()
                    .context("failed to load command index for suggestions")?;
                Outcome::Suggestions(index.search(request.tokens))
            } else {
                Outcome::NotFound {
                    query: normalize_query(request.tokens),
                }
            }
        }
        Err(error) => {
            return Err(error).with_context(|| {
                format!("failed to look up {}", request.tokens.join(" "))
            });
        }
    };

    Ok(Report {
        stale_after,
        outcome,
    })
}

/// Text to type back to reach a suggested page. Adds a platform flag when the
/// entry is only found under a platform the current selection would not probe.
pub fn completion(entry: &IndexEntry, selected: Platform) -> String {
    let platform = entry.preferred_platform(selected);
    if platform == Platform::Common || platform == selected {
        entry.name.clone()
    } else {
        format!("-p {platform} {}", entry.name)
    }
}

pub fn platforms_label(entry: &IndexEntry) -> String {
    format!("Platforms: {}", entry.platforms.join(","))
}
