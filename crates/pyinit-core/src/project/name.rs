//! Package name sanitizing

use crate::error::BootstrapError;
use std::fmt;

/// Python reserved keywords (`keyword.kwlist`)
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// A lowercase Python identifier usable as import name, project name and script name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

impl PackageName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turn a folder name into a package name.
///
/// Spaces and hyphens become underscores and the result is lowercased. The result must
/// be an ASCII Python identifier that is not a keyword.
pub fn sanitize(raw: &str) -> Result<PackageName, BootstrapError> {
    let clean = raw.replace([' ', '-'], "_").to_lowercase();

    if !is_identifier(&clean) || is_keyword(&clean) {
        return Err(BootstrapError::InvalidName { name: clean });
    }

    Ok(PackageName(clean))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

fn is_keyword(s: &str) -> bool {
    PYTHON_KEYWORDS.contains(&s)
}
