use crate::platform::Platform;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const PAGES_DIR: &str = "pages";

const PRIMARY_LOCALE_ENV: &str = "LANG";
const PRIORITY_LOCALE_ENV: &str = "LANGUAGE";
const REGION_QUALIFIED_CODES: [&str; 3] = ["pt_PT", "pt_BR", "zh_TW"];

/// Language codes to probe, most preferred first. Without an explicit
/// choice they come from `LANGUAGE` and `LANG` as read by `lookup_env`.
pub fn language_priorities_with_lookup<F>(explicit: Option<&str>, lookup_env: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(language) = explicit.map(str::trim).filter(|value| !value.is_empty()) {
        return vec![language.to_string()];
    }

    let primary = lookup_env(PRIMARY_LOCALE_ENV).unwrap_or_default();
    let Some(primary_code) = language_code(&primary) else {
        return vec![DEFAULT_LANGUAGE.to_string()];
    };

    let mut priorities: Vec<String> = Vec::new();
    if let Some(list) = lookup_env(PRIORITY_LOCALE_ENV) {
        for code in list.split(':').filter_map(language_code) {
            push_unique(&mut priorities, code);
        }
    }
    push_unique(&mut priorities, primary_code);
    push_unique(&mut priorities, DEFAULT_LANGUAGE.to_string());
    priorities
}

/// Extracts the pages language code from a locale string such as
/// `ja_JP.UTF-8`. `C` and `POSIX` mean no locale.
pub fn language_code(locale: &str) -> Option<String> {
    let code = locale.split('.').next().unwrap_or_default().trim();
    if code.is_empty() || code == "C" || code == "POSIX" {
        return None;
    }
    if REGION_QUALIFIED_CODES.contains(&code) {
        return Some(code.to_string());
    }
    if code == "pt" {
        return Some("pt_PT".to_string());
    }
    code.split('_')
        .next()
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
}

/// Directory holding the pages of `language`: bare `pages` for the default
/// language, `pages.<code>` otherwise.
pub fn language_dir(language: &str) -> String {
    if language == DEFAULT_LANGUAGE {
        PAGES_DIR.to_string()
    } else {
        format!("{PAGES_DIR}.{language}")
    }
}

/// Platforms to probe: the selected one first, `common` always last.
pub fn platform_priorities(selected: Option<Platform>) -> Vec<Platform> {
    let mut platforms = Vec::with_capacity(2);
    if let Some(platform) = selected {
        platforms.push(platform);
    }
    if !platforms.contains(&Platform::Common) {
        platforms.push(Platform::Common);
    }
    platforms
}

fn push_unique(list: &mut Vec<String>, code: String) {
    if !list.contains(&code) {
        list.push(code);
    }
}
