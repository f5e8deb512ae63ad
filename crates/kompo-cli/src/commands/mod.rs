//! Command dispatch and handler modules.

mod check;
mod publish;
mod resolve;
mod tree;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let manifest_path = kompo_ops::ops_setup::find_manifest(cli.manifest_path.as_deref())?;
    match cli.command {
        Command::Resolve { json, offline } => resolve::exec(&manifest_path, json, offline).await,
        Command::Tree { order, offline } => tree::exec(&manifest_path, order, offline).await,
        Command::Check => check::exec(&manifest_path, cli.verbose),
        Command::Publish {
            repository,
            dry_run,
            force,
        } => publish::exec(&manifest_path, repository, dry_run, force).await,
    }
}
