//! kiroku-cli: command-line client for the kiroku blog API.

mod args;
mod client;
mod handlers;
mod io;
mod print;
#[cfg(test)]
mod tests;

use clap::Parser;

use args::{Cli, Commands};
use client::{CliError, build_ctx_from_cli};
use handlers::{auth, categories, posts, public, thumbnail};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::SignIn(args) => auth::sign_in(args).await?,
        Commands::SignUp(args) => auth::sign_up(args).await?,
        Commands::Thumbnail(args) => thumbnail::handle(cli.site.as_deref(), args).await?,
        Commands::Categories(cmd) => {
            let ctx = build_ctx_from_cli(&cli)?;
            categories::handle(&ctx, &cmd.action).await?;
        }
        Commands::Posts(cmd) => {
            let ctx = build_ctx_from_cli(&cli)?;
            posts::handle(&ctx, &cmd.action).await?;
        }
        Commands::Public(cmd) => {
            let ctx = build_ctx_from_cli(&cli)?;
            public::handle(&ctx, &cmd.action).await?;
        }
    }

    Ok(())
}
