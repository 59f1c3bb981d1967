//! Virtual environment creation and editable install
//!
//! Both prefer uv when it is installed and fall back to the interpreter's own
//! `venv` and `pip` modules.

pub mod environment;
pub mod installer;

pub use environment::{build, BuiltEnvironment, LinkMode, UV_LINK_MODE_ENV, VENV_DIR};
pub use installer::{install, venv_python, InstallOutcome};

/// Shell command that activates the project's environment, relative to the project root
pub fn activate_command() -> String {
    if cfg!(windows) {
        format!("{}\\Scripts\\activate", VENV_DIR)
    } else {
        format!("source {}/bin/activate", VENV_DIR)
    }
}

