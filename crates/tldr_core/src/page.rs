use std::io::{self, BufRead};

use reqwest::Url;
use serde::Serialize;

// Pages never carry more than eight examples.
const EXPECTED_EXAMPLES: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub name: String,
    pub descriptions: Vec<String>,
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Example {
    pub description: String,
    pub command: String,
}

/// Read from `[render].placeholders` through [`PlaceholderStyle::parse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `{{path/to/file}}` stays as written.
    #[default]
    Keep,
    /// `{{path/to/file}}` becomes `path/to/file`.
    Strip,
}

impl PlaceholderStyle {
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("keep") {
            return Some(Self::Keep);
        }
        if value.eq_ignore_ascii_case("strip") {
            return Some(Self::Strip);
        }
        None
    }
}

/// Parses the line-oriented page markup in a single pass.
///
/// Malformed documents yield whatever could be collected; only a read
/// failure is an error.
pub fn parse_page<R: BufRead>(reader: R) -> io::Result<Page> {
    let mut name = String::new();
    let mut descriptions = Vec::new();
    let mut examples = Vec::with_capacity(EXPECTED_EXAMPLES);
    let mut pending_description = String::new();

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            name = rest.trim_start_matches('#').trim().to_string();
        } else if let Some(rest) = line.strip_prefix('>') {
            descriptions.push(rest.trim_start_matches('>').trim().to_string());
        } else if let Some(rest) = line.strip_prefix('-') {
            pending_description = rest.trim_start_matches('-').trim().to_string();
        } else if line.starts_with('`') {
            examples.push(Example {
                description: pending_description.clone(),
                command: line.trim_matches('`').trim().to_string(),
            });
        }
    }

    Ok(Page {
        name,
        descriptions,
        examples,
    })
}

impl Page {
    pub fn summary(&self) -> Option<&str> {
        self.descriptions.first().map(String::as_str)
    }

    /// The `More information: <URL>.` link on the last description line.
    pub fn detail_url(&self) -> Option<String> {
        let line = self.descriptions.last()?;
        let end = line.rfind(">.")?;
        for scheme in ["https://", "http://"] {
            let Some(start) = line.find(&format!("<{scheme}")) else {
                continue;
            };
            if end < start {
                return None;
            }
            return Url::parse(&line[start + 1..end])
                .ok()
                .map(|url| url.to_string());
        }
        None
    }
}

impl Example {
    pub fn render_command(&self, style: PlaceholderStyle) -> String {
        match style {
            PlaceholderStyle::Keep => self.command.clone(),
            PlaceholderStyle::Strip => self.command.replace("{{", "").replace("}}", ""),
        }
    }
}
