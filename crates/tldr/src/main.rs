mod launcher;
mod lookup;
mod render;

use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use tldr_core::config::{CONFIG_FILE_NAME, Settings, load_config};
use tldr_core::{
    CancelToken, FetchConfig, HttpArchiveFetcher, Platform, Repository, RepositoryOptions,
};
use tracing::{debug, warn};

use crate::launcher::ScriptFilter;
use crate::lookup::{LookupRequest, Outcome, Report, lookup};

const APP_NAME: &str = "tldr";
const MIRROR_DIR: &str = "data";

#[derive(Debug, Parser)]
#[command(name = "tldr", version, about = "Show example command lines from tldr pages")]
struct Cli {
    /// Command to look up; several tokens name a subcommand page.
    #[arg(value_name = "COMMAND")]
    command: Vec<String>,
    #[arg(short = 'p', long, value_name = "PLATFORM", help = "select from common/linux/osx/windows/sunos")]
    platform: Option<String>,
    #[arg(short = 'L', long, value_name = "CODE", help = "select language e.g.) en")]
    language: Option<String>,
    #[arg(short = 'u', long, help = "update the local tldr database")]
    update: bool,
    #[arg(long, help = "suggest similar commands when no page matches")]
    fuzzy: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(short = 'v', long, help = "log lookup and update details to stderr")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), |key| env::var(key).ok())?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
    let settings = load_config(&config_path)?
        .settings()
        .with_context(|| format!("failed to resolve settings from {}", config_path.display()))?;
    debug!(data_dir = %data_dir.display(), config = %config_path.display(), "resolved paths");

    let (report, selected) = run(&cli, &settings, &data_dir)?;
    emit(&cli, &settings, &report, selected)?;

    Ok(if report.outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run(cli: &Cli, settings: &Settings, data_dir: &Path) -> Result<(Report, Platform)> {
    let selected = match cli.platform.as_deref() {
        Some(value) => match value.parse::<Platform>() {
            Ok(platform) => platform,
            Err(error) => {
                let report = Report::plain(Outcome::UnsupportedPlatform {
                    reason: error.to_string(),
                });
                return Ok((report, settings.platform));
            }
        },
        None => settings.platform,
    };
    let language = cli
        .language
        .clone()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| settings.language.clone());

    let fetcher = HttpArchiveFetcher::new(FetchConfig {
        timeout: Some(settings.update_timeout),
        ..FetchConfig::default()
    })
    .context("failed to build HTTP client")?;
    let options = RepositoryOptions {
        platform: Some(selected),
        language: language.clone(),
        force_update: cli.update,
        source_url: settings.source_url.clone(),
    };
    let repo = Repository::new(data_dir.join(MIRROR_DIR), options, fetcher);
    debug!(
        source = repo.source_url(),
        platforms = ?repo.platforms(),
        languages = ?repo.languages(),
        "repository configured"
    );

    let cancel = CancelToken::with_timeout(settings.update_timeout);
    let initialized = repo.initialize(&cancel);

    if cli.update {
        let outcome = match initialized {
            Ok(_) => Outcome::Updated,
            Err(error) => {
                warn!(%error, "update failed");
                Outcome::UpdateFailed {
                    reason: format!("{:#}", anyhow::Error::new(error)),
                }
            }
        };
        return Ok((Report::plain(outcome), selected));
    }

    initialized
        .with_context(|| format!("failed to initialize tldr mirror at {}", repo.root().display()))?;
    let request = LookupRequest {
        tokens: &cli.command,
        fuzzy: cli.fuzzy,
        language: language.as_deref(),
        recommend_update: settings.recommend_update,
        max_age: settings.max_age,
    };
    Ok((lookup(&repo, &request)?, selected))
}

fn emit(cli: &Cli, settings: &Settings, report: &Report, selected: Platform) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => {
            render::write_report(&mut out, report, settings.placeholders, selected)
                .context("failed to write output")?;
        }
        OutputFormat::Json => {
            let filter = ScriptFilter::from_report(report, settings.placeholders, selected);
            let json = filter.to_json().context("failed to encode launcher output")?;
            writeln!(out, "{json}").context("failed to write output")?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .init();
}

/// `--data-dir`, then `$TLDR_DATA_DIR`, then the platform data directory.
fn resolve_data_dir<F>(flag: Option<&Path>, lookup_env: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = lookup_env("TLDR_DATA_DIR")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    {
        return Ok(PathBuf::from(value));
    }
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("failed to determine a data directory; pass --data-dir"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tldr_core::config::TldrConfig;
    use tempfile::tempdir;

    fn settings() -> Settings {
        TldrConfig::default()
            .settings_with_lookup(|_| None)
            .expect("settings")
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tldr").chain(args.iter().copied())).expect("parse")
    }

    #[test]
    fn parses_flags_and_command_tokens() {
        let cli = cli(&["-p", "linux", "-L", "de", "--fuzzy", "--format", "json", "git", "checkout"]);
        assert_eq!(cli.platform.as_deref(), Some("linux"));
        assert_eq!(cli.language.as_deref(), Some("de"));
        assert!(cli.fuzzy);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.command, vec!["git", "checkout"]);
    }

    #[test]
    fn data_dir_prefers_flag_then_env() {
        let from_flag = resolve_data_dir(Some(Path::new("/tmp/flag")), |_| {
            Some("/tmp/env".to_string())
        })
        .expect("resolve");
        assert_eq!(from_flag, PathBuf::from("/tmp/flag"));

        let from_env = resolve_data_dir(None, |key| {
            (key == "TLDR_DATA_DIR").then(|| "/tmp/env".to_string())
        })
        .expect("resolve");
        assert_eq!(from_env, PathBuf::from("/tmp/env"));
    }

    #[test]
    fn unsupported_platform_is_reported_without_touching_mirror() {
        let temp = tempdir().expect("tempdir");
        let (report, _) = run(&cli(&["-p", "android", "ls"]), &settings(), temp.path()).expect("run");
        let Outcome::UnsupportedPlatform { reason } = &report.outcome else {
            panic!("expected unsupported platform");
        };
        assert!(reason.contains("android is unsupported platform"));
        assert!(report.outcome.is_failure());
        assert!(!temp.path().join(MIRROR_DIR).exists());
    }

    #[test]
    fn looks_up_page_from_existing_mirror() {
        let temp = tempdir().expect("tempdir");
        let mirror = temp.path().join(MIRROR_DIR);
        fs::create_dir_all(mirror.join("pages/common")).expect("mkdir");
        fs::write(mirror.join("index.json"), r#"{"commands":[]}"#).expect("write index");
        fs::write(
            mirror.join("pages/common/tar.md"),
            "# tar\n\n> Archiving utility.\n\n- Extract:\n\n`tar xf {{file}}`\n",
        )
        .expect("write page");

        let (report, selected) =
            run(&cli(&["-p", "windows", "-L", "en", "tar"]), &settings(), temp.path()).expect("run");
        assert_eq!(selected, Platform::Windows);
        let Outcome::Page(page) = report.outcome else {
            panic!("expected a page");
        };
        assert_eq!(page.name, "tar");
    }
}
