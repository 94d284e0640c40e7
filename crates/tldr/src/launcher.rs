//! Script-filter JSON for launcher integrations: `{"items": [...]}`.

use serde::Serialize;
use tldr_core::{Page, PlaceholderStyle, Platform};

use crate::lookup::{Outcome, Report, completion, platforms_label};
use crate::render::stale_notice;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Item {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    pub valid: bool,
}

impl Item {
    fn warning(title: &str, subtitle: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptFilter {
    pub items: Vec<Item>,
}

impl ScriptFilter {
    pub fn from_report(report: &Report, placeholders: PlaceholderStyle, selected: Platform) -> Self {
        let mut items = Vec::new();
        if let Some(max_age) = report.stale_after {
            items.push(Item {
                title: stale_notice(max_age),
                subtitle: "Please Enter!".to_string(),
                arg: Some("--update".to_string()),
                autocomplete: None,
                valid: true,
            });
        }

        match &report.outcome {
            Outcome::MissingQuery => items.push(Item::warning(
                "Please input a command",
                "e.g.) tldr tar e.g.) tldr --help",
            )),
            Outcome::Page(page) => items.extend(page_items(page, placeholders)),
            Outcome::Suggestions(entries) => {
                items.extend(entries.iter().map(|entry| Item {
                    title: entry.name.clone(),
                    subtitle: platforms_label(entry),
                    arg: None,
                    autocomplete: Some(completion(entry, selected)),
                    valid: false,
                }));
            }
            Outcome::NotFound { .. } => {}
            Outcome::NotFoundInLanguage { .. } => {
                // The language warning replaces everything else.
                return Self {
                    items: vec![Item::warning(
                        "Not found the command in selected language",
                        "Try not to specify language option",
                    )],
                };
            }
            Outcome::Updated => items.push(Item::warning("update succeeded", "")),
            Outcome::UpdateFailed { reason } => {
                items.push(Item::warning(&format!("update failed due to {reason}"), ""));
            }
            Outcome::UnsupportedPlatform { reason } => items.push(Item::warning(
                reason,
                &format!("supported are {}", Platform::supported_list()),
            )),
        }

        if items.is_empty() {
            items.push(Item::warning("No matching query", "Try a different query"));
        }
        Self { items }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn page_items(page: &Page, placeholders: PlaceholderStyle) -> Vec<Item> {
    let mut items = Vec::with_capacity(page.examples.len() + 1);
    if let Some(summary) = page.summary() {
        items.push(Item {
            title: summary.to_string(),
            subtitle: page.descriptions.get(1).cloned().unwrap_or_default(),
            arg: page.detail_url(),
            autocomplete: None,
            valid: false,
        });
    }
    for example in &page.examples {
        let command = example.render_command(placeholders);
        items.push(Item {
            title: command.clone(),
            subtitle: example.description.clone(),
            arg: Some(command),
            autocomplete: None,
            valid: true,
        });
    }
    items
}
