//! Build backends supported in the generated `pyproject.toml`

use clap::ValueEnum;
use std::fmt;

/// Build system written to `[build-system]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Backend {
    #[default]
    Setuptools,
    Hatch,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Setuptools => "setuptools",
            Backend::Hatch => "hatch",
        }
    }

    /// TOML array for `build-system.requires`
    pub fn requires(&self) -> &'static str {
        match self {
            Backend::Setuptools => r#"["setuptools>=61.0"]"#,
            Backend::Hatch => r#"["hatchling"]"#,
        }
    }

    /// Value for `build-system.build-backend`
    pub fn build_backend(&self) -> &'static str {
        match self {
            Backend::Setuptools => "setuptools.build_meta",
            Backend::Hatch => "hatchling.build",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
