use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating-system tag a page is filed under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Common,
    Linux,
    Osx,
    Windows,
    Sunos,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Self::Common,
        Self::Linux,
        Self::Osx,
        Self::Windows,
        Self::Sunos,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Linux => "linux",
            Self::Osx => "osx",
            Self::Windows => "windows",
            Self::Sunos => "sunos",
        }
    }

    /// Case-sensitive, matching the directory names inside the mirror.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str() == value)
    }

    /// Platform of the running host, used when nothing else is selected.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Osx
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(any(target_os = "solaris", target_os = "illumos")) {
            Self::Sunos
        } else {
            Self::Linux
        }
    }

    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|platform| platform.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value} is unsupported platform (supported: {supported})", supported = Platform::supported_list())]
pub struct UnsupportedPlatform {
    pub value: String,
}

impl FromStr for Platform {
    type Err = UnsupportedPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnsupportedPlatform {
            value: value.to_string(),
        })
    }
}
