//! pyinit CLI - Bootstrap a src-layout Python project with its own virtual environment

use anyhow::Result;
use clap::Parser;
use pyinit_core::tui::CreateArgs;
use pyinit_core::{Backend, BootstrapError, CancelToken};
use std::path::PathBuf;

/// Exit code after Ctrl+C
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(name = "pyinit")]
#[command(about = "Bootstrap a Python project: src layout, virtual environment, pyproject.toml")]
#[command(version)]
#[command(after_help = "Examples:\n  \
    pyinit my_project\n  \
    pyinit my_api --backend hatch --python 3.11\n  \
    pyinit test --force --git --run")]
pub struct Args {
    /// Project folder to create (its name becomes the package name)
    pub folder: PathBuf,

    /// Build backend written to pyproject.toml
    #[arg(long, value_enum, default_value_t = Backend::Setuptools)]
    pub backend: Backend,

    /// Python version for the environment, e.g. 3.12 (requires uv)
    #[arg(long)]
    pub python: Option<String>,

    /// Overwrite a non-empty folder and regenerate a completed project
    #[arg(long)]
    pub force: bool,

    /// Initialize a git repository with an initial commit
    #[arg(long)]
    pub git: bool,

    /// Install the project in editable mode after generating it
    #[arg(long)]
    pub run: bool,

    /// Show output of external commands and debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<Args> for CreateArgs {
    fn from(args: Args) -> Self {
        CreateArgs {
            folder: args.folder,
            backend: args.backend,
            python: args.python,
            force: args.force,
            git: args.git,
            run: args.run,
            verbose: args.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // First Ctrl+C cancels the run so it can roll back; a second one exits immediately
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        if handler_token.is_cancelled() {
            std::process::exit(EXIT_INTERRUPTED);
        }
        handler_token.cancel();
    })
    .ok();

    let args = Args::parse();
    let result = pyinit_core::run(args.into(), cancel).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Err(err)
            if err
                .downcast_ref::<BootstrapError>()
                .is_some_and(BootstrapError::is_interrupted) =>
        {
            std::process::exit(EXIT_INTERRUPTED);
        }
        // Already reported by the front end
        Err(_) => std::process::exit(1),
        Ok(()) => Ok(()),
    }
}
