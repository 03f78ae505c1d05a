//! gitmirror: keep a destination remote in step with one branch of a source
//! repository.
//!
//! Each run is a single sync pass. A root directory holds one local workspace
//! per source repository; an absent workspace is bootstrapped with a clone,
//! an existing one is pulled from `origin` and pushed to the `dest` remote.
//! Note the consequences: the first run against a fresh root never pushes,
//! and once a workspace carries the `dest` remote its URL is never updated,
//! even if `--dest` changes on a later run (delete the workspace to rebind).

mod mirror;
mod runner;
mod workspace;

use std::path::PathBuf;

use clap::Parser;

use crate::mirror::{Mirror, MirrorConfig};
use crate::runner::{CommandRunner, SystemRunner};

#[derive(Parser)]
#[command(
    name = "gitmirror",
    version,
    about = "Mirror a git branch from a source remote to a destination remote"
)]
struct Cli {
    /// Source repository to mirror from
    #[arg(long = "src", env = "GIT_SRC_REPO")]
    src: String,

    /// Branch to mirror, used verbatim against both remotes
    #[arg(long = "branch", env = "GIT_SRC_BRANCH", default_value = "master")]
    branch: String,

    /// Destination repository to push to
    #[arg(long = "dest", env = "GIT_DEST_REPO")]
    dest: String,

    /// Directory holding one workspace per source repository; a fresh
    /// temporary directory is used when omitted
    #[arg(long = "root", env = "GIT_ROOT_PATH")]
    root: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let runner = SystemRunner::new();

    // git must be reachable before any sync begins.
    runner
        .run(None, "git", &["--version"])
        .map_err(|e| format!("git executable not usable: {}", e))?;

    let root = match cli.root {
        Some(root) => root,
        None => {
            // Kept on disk so the clone survives for later runs.
            let dir = tempfile::TempDir::new()?.keep();
            log::info!("no root configured, using {}", dir.display());
            dir
        }
    };

    let config = MirrorConfig {
        source: cli.src,
        dest: cli.dest,
        branch: cli.branch,
        root,
    };

    Mirror::new(runner).sync(&config)?;
    Ok(())
}
