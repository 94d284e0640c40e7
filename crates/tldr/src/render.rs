use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;
use tldr_core::{Page, PlaceholderStyle, Platform};

use crate::lookup::{Outcome, Report, completion, platforms_label};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

pub fn write_report<W: Write>(
    out: &mut W,
    report: &Report,
    placeholders: PlaceholderStyle,
    selected: Platform,
) -> io::Result<()> {
    if let Some(max_age) = report.stale_after {
        writeln!(out, "{}", stale_notice(max_age).yellow())?;
        writeln!(out)?;
    }

    match &report.outcome {
        Outcome::MissingQuery => {
            writeln!(out, "Please input a command, e.g. `tldr tar`")?;
        }
        Outcome::Page(page) => write_page(out, page, placeholders)?,
        Outcome::Suggestions(entries) if entries.is_empty() => {
            writeln!(out, "No matching query")?;
        }
        Outcome::Suggestions(entries) => {
            writeln!(out, "Did you mean:")?;
            for entry in entries {
                writeln!(
                    out,
                    "  {}  {}",
                    completion(entry, selected).bold(),
                    platforms_label(entry).dimmed()
                )?;
            }
        }
        Outcome::NotFound { query } => {
            writeln!(out, "No page found for {query}")?;
            writeln!(out, "{}", "Try `tldr --fuzzy` for suggestions".dimmed())?;
        }
        Outcome::NotFoundInLanguage { language } => {
            writeln!(out, "Not found the command in selected language ({language})")?;
            writeln!(out, "{}", "Try not to specify language option".dimmed())?;
        }
        Outcome::Updated => writeln!(out, "update succeeded")?,
        Outcome::UpdateFailed { reason } => {
            writeln!(out, "{} {reason}", "update failed due to".red())?;
        }
        Outcome::UnsupportedPlatform { reason } => writeln!(out, "{}", reason.red())?,
    }
    Ok(())
}

fn write_page<W: Write>(out: &mut W, page: &Page, placeholders: PlaceholderStyle) -> io::Result<()> {
    writeln!(out, "{}", page.name.bold())?;
    writeln!(out)?;
    for description in &page.descriptions {
        writeln!(out, "  {}", description.dimmed())?;
    }
    for example in &page.examples {
        writeln!(out)?;
        writeln!(out, "{}", format!("- {}", example.description).green())?;
        writeln!(out, "    {}", example.render_command(placeholders).cyan())?;
    }
    Ok(())
}

pub fn stale_notice(max_age: Duration) -> String {
    let days = max_age.as_secs() / SECONDS_PER_DAY;
    format!("tldr database is older than {days} days; run `tldr --update` to refresh it")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tldr_core::{Example, IndexEntry};

    fn render(report: &Report, placeholders: PlaceholderStyle) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        write_report(&mut out, report, placeholders, Platform::Osx).expect("render");
        String::from_utf8(out).expect("utf8")
    }

    fn tar_page() -> Page {
        Page {
            name: "tar".to_string(),
            descriptions: vec![
                "Archiving utility.".to_string(),
                "More information: <https://www.gnu.org/software/tar>.".to_string(),
            ],
            examples: vec![Example {
                description: "Extract an archive:".to_string(),
                command: "tar xf {{source.tar}}".to_string(),
            }],
        }
    }

    #[test]
    fn page_lists_descriptions_then_examples() {
        let text = render(&Report::plain(Outcome::Page(tar_page())), PlaceholderStyle::Keep);
        let expected = "tar\n\n  Archiving utility.\n  More information: <https://www.gnu.org/software/tar>.\n\n- Extract an archive:\n    tar xf {{source.tar}}\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn stripped_placeholders_drop_braces() {
        let text = render(&Report::plain(Outcome::Page(tar_page())), PlaceholderStyle::Strip);
        assert!(text.contains("    tar xf source.tar\n"));
    }

    #[test]
    fn stale_notice_comes_first() {
        let report = Report {
            stale_after: Some(Duration::from_secs(14 * SECONDS_PER_DAY)),
            outcome: Outcome::MissingQuery,
        };
        let text = render(&report, PlaceholderStyle::Keep);
        assert!(text.starts_with("tldr database is older than 14 days"));
        assert!(text.ends_with("Please input a command, e.g. `tldr tar`\n"));
    }

    #[test]
    fn suggestions_show_completion_and_platforms() {
        let report = Report::plain(Outcome::Suggestions(vec![IndexEntry {
            name: "pacman".to_string(),
            platforms: vec!["linux".to_string()],
            languages: vec!["en".to_string()],
        }]));
        let text = render(&report, PlaceholderStyle::Keep);
        assert_eq!(text, "Did you mean:\n  -p linux pacman  Platforms: linux\n");

        let empty = render(&Report::plain(Outcome::Suggestions(Vec::new())), PlaceholderStyle::Keep);
        assert_eq!(empty, "No matching query\n");
    }

    #[test]
    fn language_miss_hints_at_dropping_the_option() {
        let report = Report::plain(Outcome::NotFoundInLanguage {
            language: "ja".to_string(),
        });
        let text = render(&report, PlaceholderStyle::Keep);
        assert!(text.contains("selected language (ja)"));
        assert!(text.contains("Try not to specify language option"));
    }
}
