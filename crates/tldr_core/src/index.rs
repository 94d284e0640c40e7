use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TldrError};
use crate::fuzzy;
use crate::platform::Platform;

pub const INDEX_FILE_NAME: &str = "index.json";

/// Layout of `index.json` at the mirror root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandIndex {
    #[serde(default)]
    pub commands: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    /// Kept as raw tags: the index lists platforms this client cannot select.
    #[serde(default, rename = "platform")]
    pub platforms: Vec<String>,
    #[serde(default, rename = "language")]
    pub languages: Vec<String>,
}

pub fn load_index(path: &Path) -> Result<CommandIndex> {
    let file = File::open(path).map_err(|source| TldrError::io("open index file", path, source))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        if source.is_io() {
            TldrError::io("read index file", path, io::Error::other(source))
        } else {
            TldrError::Decode {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Joins query tokens the way page files are named, without doubling a
/// hyphen a token already ends with (`["apt-", "get"]` -> `apt-get`).
pub fn normalize_query(tokens: &[String]) -> String {
    let mut query = String::new();
    for token in tokens {
        if !query.is_empty() && !query.ends_with('-') {
            query.push('-');
        }
        query.push_str(token);
    }
    query
}

impl CommandIndex {
    /// Fuzzy suggestions for `tokens`, best first.
    ///
    /// When the full query matches nothing, trailing tokens are dropped one
    /// at a time so an unknown subcommand still suggests its siblings
    /// (`git rebase` -> `git checkout`, ...).
    ///
    /// Unless a token already contains a hyphen, returned names have their
    /// hyphens replaced by spaces (`git-checkout` -> `git checkout`) so they
    /// can be typed back as separate tokens. The rename is applied to the
    /// returned copies only; entries in the index keep their hyphenated names,
    /// so repeated searches see the same data.
    pub fn search(&self, tokens: &[String]) -> Vec<IndexEntry> {
        let names: Vec<&str> = self
            .commands
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        let keep_hyphens = tokens.iter().any(|token| token.contains('-'));

        let mut found = Vec::new();
        for used in (1..=tokens.len()).rev() {
            found = fuzzy::find(&normalize_query(&tokens[..used]), &names);
            if !found.is_empty() {
                break;
            }
        }

        found
            .into_iter()
            .map(|found| {
                let mut entry = self.commands[found.index].clone();
                if !keep_hyphens {
                    entry.name = entry.name.replace('-', " ");
                }
                entry
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl IndexEntry {
    pub fn known_platforms(&self) -> Vec<Platform> {
        self.platforms
            .iter()
            .filter_map(|tag| Platform::parse(tag))
            .collect()
    }

    /// Platform to suggest for this entry: the selected one if listed, then
    /// `common`, then the first listed. Entries without a known platform
    /// fall back to `common`.
    pub fn preferred_platform(&self, selected: Platform) -> Platform {
        let platforms = self.known_platforms();
        if platforms.len() >= 2 {
            if platforms.contains(&selected) {
                return selected;
            }
            if platforms.contains(&Platform::Common) {
                return Platform::Common;
            }
        }
        platforms.first().copied().unwrap_or(Platform::Common)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn entry(name: &str, platforms: &[&str]) -> IndexEntry {
        IndexEntry {
            name: name.to_string(),
            platforms: tokens(platforms),
            languages: vec!["en".to_string()],
        }
    }

    fn sample_index() -> CommandIndex {
        CommandIndex {
            commands: vec![
                entry("apt", &["linux"]),
                entry("apt-get", &["linux"]),
                entry("apt-key", &["linux"]),
                entry("git-checkout", &["common"]),
                entry("git-commit", &["common"]),
                entry("lsof", &["common"]),
            ],
        }
    }

    #[test]
    fn loads_index_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join(INDEX_FILE_NAME);
        fs::write(
            &path,
            r#"{"commands":[{"name":"tar","platform":["common"],"language":["en","de"]},
               {"name":"pacman","platform":["linux","android"],"language":["en"]}]}"#,
        )
        .expect("write index");

        let index = load_index(&path).expect("load");
        assert_eq!(index.len(), 2);
        assert_eq!(index.commands[0].languages, vec!["en", "de"]);
        assert_eq!(index.commands[1].known_platforms(), vec![Platform::Linux]);
    }

    #[test]
    fn malformed_index_is_decode_failure() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join(INDEX_FILE_NAME);
        fs::write(&path, "{\"commands\": [").expect("write index");

        let error = load_index(&path).expect_err("must fail");
        assert_eq!(error.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn missing_index_is_io_failure() {
        let temp = tempdir().expect("tempdir");
        let error = load_index(&temp.path().join(INDEX_FILE_NAME)).expect_err("must fail");
        assert_eq!(error.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn normalize_query_collapses_trailing_hyphen() {
        assert_eq!(normalize_query(&tokens(&["apt-", "get"])), "apt-get");
        assert_eq!(normalize_query(&tokens(&["git", "checkout"])), "git-checkout");
        assert_eq!(normalize_query(&tokens(&["lsof"])), "lsof");
        assert_eq!(normalize_query(&[]), "");
    }

    #[test]
    fn hyphenated_query_keeps_names() {
        let results = sample_index().search(&tokens(&["apt-", "get"]));
        assert_eq!(results[0].name, "apt-get");
        assert!(results.iter().all(|entry| entry.name != "apt--get"));
    }

    #[test]
    fn hyphenated_token_keeps_hyphens_in_results() {
        let results = sample_index().search(&tokens(&["apt-key"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "apt-key");
    }

    #[test]
    fn multi_token_query_presents_spaced_names() {
        let index = sample_index();
        let results = index.search(&tokens(&["git", "checkout"]));
        assert_eq!(results[0].name, "git checkout");
        assert_eq!(index.commands[3].name, "git-checkout");
    }

    #[test]
    fn repeated_search_sees_unchanged_index() {
        let index = sample_index();
        let query = tokens(&["git", "checkout"]);
        let first = index.search(&query);
        let second = index.search(&query);
        assert_eq!(first, second);
        assert!(index.commands.iter().any(|entry| entry.name == "git-checkout"));
        assert!(index.commands.iter().all(|entry| entry.name != "git checkout"));
    }

    #[test]
    fn unknown_subcommand_still_suggests_siblings() {
        let results = sample_index().search(&tokens(&["git", "co"]));
        let names: Vec<&str> = results.iter().map(|entry| entry.name.as_str()).collect();
        assert!(names.contains(&"git checkout"));
        assert!(names.contains(&"git commit"));
    }

    #[test]
    fn exact_name_is_always_included() {
        let index = sample_index();
        for command in &index.commands {
            let results = index.search(&[command.name.clone()]);
            assert!(
                results.iter().any(|entry| entry.name == command.name),
                "{} missing from its own search",
                command.name
            );
        }
    }

    #[test]
    fn unknown_subcommand_falls_back_to_command_prefix() {
        let results = sample_index().search(&tokens(&["git", "rebase"]));
        let names: Vec<&str> = results.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"git checkout"));
        assert!(names.contains(&"git commit"));
    }

    #[test]
    fn no_match_is_empty() {
        assert!(sample_index().search(&tokens(&["zzz"])).is_empty());
        assert!(CommandIndex::default().search(&tokens(&["git"])).is_empty());
    }

    #[test]
    fn preferred_platform_order() {
        assert_eq!(
            entry("ls", &["linux", "osx", "common"]).preferred_platform(Platform::Osx),
            Platform::Osx
        );
        assert_eq!(
            entry("ls", &["linux", "common"]).preferred_platform(Platform::Windows),
            Platform::Common
        );
        assert_eq!(
            entry("pacman", &["linux"]).preferred_platform(Platform::Osx),
            Platform::Linux
        );
        assert_eq!(
            entry("odd", &["android"]).preferred_platform(Platform::Osx),
            Platform::Common
        );
    }
}
