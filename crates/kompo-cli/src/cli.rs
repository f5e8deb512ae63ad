//! CLI argument definitions for Kompo.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "kompo",
    version,
    about = "Composite Maven builds: substitute local projects for published coordinates",
    long_about = "Kompo resolves the dependencies of a composite build. Coordinates claimed by an \
                  included build are redirected to that local project; everything else comes from \
                  the first declared repository that serves it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to Kompo.toml (defaults to the nearest one above the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve every declared dependency
    Resolve {
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
        /// Only search file repositories
        #[arg(long)]
        offline: bool,
    },

    /// Show local builds and fetched artifacts as a tree
    Tree {
        /// Print the order local builds run in
        #[arg(long)]
        order: bool,
        /// Only search file repositories
        #[arg(long)]
        offline: bool,
    },

    /// Validate manifests, substitution rules and repositories without network access
    Check,

    /// Publish the project's publication to a Maven repository
    Publish {
        /// Repository declared in Kompo.toml (default: the local Maven repository)
        #[arg(short, long)]
        repository: Option<String>,
        /// List the files that would be published
        #[arg(long)]
        dry_run: bool,
        /// Overwrite an existing release version
        #[arg(long)]
        force: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
