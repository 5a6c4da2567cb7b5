//! Command dispatch and handler modules.

mod build;
mod clean_cache;
mod detect;
mod publish;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build(args) => build::exec(args, cli.verbose).await,
        Command::Detect { path } => detect::exec(&path),
        Command::Publish(args) => publish::exec(args).await,
        Command::CleanCache => clean_cache::exec(),
    }
}
