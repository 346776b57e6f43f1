//! ProjectDaedalus Database Tool CLI
//!
//! Adds, removes and lists the repository, modinfo and toolinfo URLs and the
//! mod records stored in the ProjectDaedalus database.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use pdt_core::ListKind;
use tracing_subscriber::EnvFilter;

use cli::{AddTarget, Cli, Commands, DelTarget};
use context::Context;
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose, !cli.no_color);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over `-v`
fn init_tracing(verbose: u8, ansi: bool) {
    let level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 3)
        .with_ansi(ansi)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut ctx = Context::load(&cli)?;
    tracing::debug!(command = ?cli.command, "running");

    let result = execute_command(&mut ctx, cli.command).await;
    let closed = ctx.orchestrator.close().await;
    result?;
    closed?;
    Ok(())
}

async fn execute_command(ctx: &mut Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Add { target } => match target {
            AddTarget::Repo { urls } => commands::run_add_urls(ctx, ListKind::Repositories, &urls).await,
            AddTarget::Modinfo { urls } => commands::run_add_urls(ctx, ListKind::ModInfo, &urls).await,
            AddTarget::Toolinfo { urls } => commands::run_add_urls(ctx, ListKind::ToolInfo, &urls).await,
            AddTarget::Mod(args) => commands::run_add_mod(ctx, args.into_record()).await,
        },
        Commands::Del { target } => match target {
            DelTarget::Repo { urls } => commands::run_del_urls(ctx, ListKind::Repositories, &urls).await,
            DelTarget::Modinfo { urls } => commands::run_del_urls(ctx, ListKind::ModInfo, &urls).await,
            DelTarget::Toolinfo { urls } => commands::run_del_urls(ctx, ListKind::ToolInfo, &urls).await,
            DelTarget::Mod { name, author } => commands::run_del_mod(ctx, &name, &author).await,
        },
        Commands::List { target, json } => commands::run_list(ctx, target.into(), json).await,
        Commands::Sync => commands::run_sync(ctx).await,
    }
}
