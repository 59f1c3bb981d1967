//! Timeouts and heuristics for a single bootstrap run

use std::time::Duration;

/// Timeout for creating the virtual environment (5 minutes)
pub const DEFAULT_VENV_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for the editable install (10 minutes)
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for each git command
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Substrings (lowercase) that identify a uv failure caused by hardlinking.
///
/// This is a heuristic over uv's error text and can miss new wordings.
/// Windows reports OneDrive/Dropbox links as os error 396 and privilege problems as 1314;
/// Linux reports cross-device links as os error 18 (EXDEV).
pub const DEFAULT_LINK_FAILURE_SIGNATURES: &[&str] = &[
    "hardlink",
    "hard link",
    "link mode",
    "link-mode",
    "os error 396",
    "os error 1314",
    "os error 18",
    "cross-device",
];

const VENV_TIMEOUT_ENV: &str = "PYINIT_VENV_TIMEOUT";
const INSTALL_TIMEOUT_ENV: &str = "PYINIT_INSTALL_TIMEOUT";
const GIT_TIMEOUT_ENV: &str = "PYINIT_GIT_TIMEOUT";
const LINK_PATTERNS_ENV: &str = "PYINIT_LINK_ERROR_PATTERNS";

/// Table of error-text signatures that trigger the copy-mode retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailureSignatures {
    patterns: Vec<String>,
}

impl LinkFailureSignatures {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.into().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated list, e.g. `"hardlink,os error 18"`
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Check whether command output looks like a hardlink failure.
    ///
    /// A pattern ending in a digit must not be followed by another digit, so
    /// `os error 18` does not match `os error 183`.
    pub fn matches(&self, output: &str) -> bool {
        let output = output.to_lowercase();
        self.patterns
            .iter()
            .any(|p| contains_pattern(&output, p))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for LinkFailureSignatures {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_FAILURE_SIGNATURES.iter().copied())
    }
}

/// Settings for one run, computed once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub venv_timeout: Duration,
    pub install_timeout: Duration,
    pub git_timeout: Duration,
    pub link_failure_signatures: LinkFailureSignatures,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            venv_timeout: DEFAULT_VENV_TIMEOUT,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            git_timeout: DEFAULT_GIT_TIMEOUT,
            link_failure_signatures: LinkFailureSignatures::default(),
        }
    }
}

impl Settings {
    /// Build settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout = |key: &str, default: Duration| match lookup(key) {
            Some(raw) => parse_timeout(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "Ignoring {}={:?}: expected a positive number of seconds",
                    key,
                    raw
                );
                default
            }),
            None => default,
        };

        let link_failure_signatures = match lookup(LINK_PATTERNS_ENV) {
            Some(raw) => {
                let parsed = LinkFailureSignatures::parse(&raw);
                if parsed.patterns().is_empty() {
                    tracing::warn!("Ignoring empty {}", LINK_PATTERNS_ENV);
                    defaults.link_failure_signatures.clone()
                } else {
                    parsed
                }
            }
            None => defaults.link_failure_signatures.clone(),
        };

        Self {
            venv_timeout: timeout(VENV_TIMEOUT_ENV, defaults.venv_timeout),
            install_timeout: timeout(INSTALL_TIMEOUT_ENV, defaults.install_timeout),
            git_timeout: timeout(GIT_TIMEOUT_ENV, defaults.git_timeout),
            link_failure_signatures,
        }
    }
}

fn contains_pattern(haystack: &str, pattern: &str) -> bool {
    if !pattern.ends_with(|c: char| c.is_ascii_digit()) {
        return haystack.contains(pattern);
    }
    haystack.match_indices(pattern).any(|(start, matched)| {
        !haystack[start + matched.len()..].starts_with(|c: char| c.is_ascii_digit())
    })
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}
