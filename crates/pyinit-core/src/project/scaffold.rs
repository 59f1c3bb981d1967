//! src-layout file generation
//!
//! Every file is overwritten unconditionally. Partial writes are cleaned up by the
//! orchestrator's rollback, not here.

use super::backend::Backend;
use super::marker::COMPLETION_MARKER;
use super::name::PackageName;
use crate::error::BootstrapError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Version written to `__init__.py` and `pyproject.toml`
pub const INITIAL_VERSION: &str = "0.1.0";

/// Minimum Python declared in `requires-python`
pub const REQUIRES_PYTHON: &str = ">=3.8";

/// Write the project tree under `root` and return the written paths, relative to `root`
pub async fn generate(
    root: &Path,
    package: &PackageName,
    backend: Backend,
) -> Result<Vec<PathBuf>, BootstrapError> {
    let package_dir = Path::new("src").join(package.as_str());
    fs::create_dir_all(root.join(&package_dir))
        .await
        .map_err(|e| {
            BootstrapError::io(
                format!("Failed to create directory: {}", package_dir.display()),
                e,
            )
        })?;

    let files = [
        (package_dir.join("__init__.py"), init_py()),
        (package_dir.join("main.py"), main_py(package)),
        (PathBuf::from("pyproject.toml"), pyproject_toml(package, backend)),
        (PathBuf::from("README.md"), readme_md(package)),
        (PathBuf::from(".gitignore"), gitignore()),
        (PathBuf::from(".editorconfig"), editorconfig()),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (relative, content) in files {
        let target = root.join(&relative);
        fs::write(&target, content).await.map_err(|e| {
            BootstrapError::io(format!("Failed to write file: {}", target.display()), e)
        })?;
        tracing::debug!(file = %relative.display(), "Wrote file");
        written.push(relative);
    }

    Ok(written)
}

fn init_py() -> String {
    format!("__version__ = \"{}\"\n", INITIAL_VERSION)
}

fn main_py(package: &PackageName) -> String {
    format!(
        "def main():\n\
         \x20   print('Hello from {package}!')\n\
         \n\
         \n\
         if __name__ == '__main__':\n\
         \x20   main()\n"
    )
}

fn pyproject_toml(package: &PackageName, backend: Backend) -> String {
    format!(
        "[project]\n\
         name = \"{package}\"\n\
         version = \"{version}\"\n\
         readme = \"README.md\"\n\
         requires-python = \"{requires_python}\"\n\
         dependencies = []\n\
         \n\
         [project.scripts]\n\
         {package} = \"{package}.main:main\"\n\
         \n\
         [build-system]\n\
         requires = {requires}\n\
         build-backend = \"{build_backend}\"\n",
        version = INITIAL_VERSION,
        requires_python = REQUIRES_PYTHON,
        requires = backend.requires(),
        build_backend = backend.build_backend(),
    )
}

fn readme_md(package: &PackageName) -> String {
    format!(
        "# {package}\n\
         \n\
         Generated with pyinit.\n\
         \n\
         ## Installation\n\
         \n\
         ```bash\n\
         # Activate the virtual environment\n\
         source .venv/bin/activate  # Linux/macOS\n\
         .venv\\Scripts\\activate     # Windows\n\
         \n\
         # Install the project in editable mode\n\
         pip install -e .\n\
         ```\n\
         \n\
         ## Usage\n\
         \n\
         ```bash\n\
         {package}\n\
         ```\n"
    )
}

fn gitignore() -> String {
    format!(
        "# Python\n\
         __pycache__/\n\
         *.py[cod]\n\
         *.egg-info/\n\
         \n\
         # Virtual environment\n\
         .venv/\n\
         venv/\n\
         \n\
         # Build\n\
         dist/\n\
         build/\n\
         \n\
         # IDEs\n\
         .vscode/\n\
         .idea/\n\
         *.swp\n\
         \n\
         # OS\n\
         .DS_Store\n\
         Thumbs.db\n\
         \n\
         # pyinit\n\
         {COMPLETION_MARKER}\n"
    )
}

fn editorconfig() -> String {
    "root = true\n\
     \n\
     [*]\n\
     charset = utf-8\n\
     end_of_line = lf\n\
     insert_final_newline = true\n\
     trim_trailing_whitespace = true\n\
     \n\
     [*.py]\n\
     indent_style = space\n\
     indent_size = 4\n\
     \n\
     [*.{toml,md}]\n\
     indent_style = space\n\
     indent_size = 2\n"
        .to_string()
}
