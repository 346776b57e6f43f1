//! Sync command
//!
//! Reloads every modinfo document listed in the database and commits the
//! resulting mod changes.

use colored::Colorize;

use crate::commands::report::{commit_and_report, show_mods};
use crate::context::Context;
use crate::error::Result;

/// Run `pdt sync`
pub async fn run_sync(ctx: &mut Context) -> Result<()> {
    println!("{} Syncing mods from modinfo documents", "=>".blue().bold());

    let web = ctx.web.clone();
    let report = ctx.orchestrator.sync_modinfo(web.as_ref()).await?;

    for (url, error) in &report.failures {
        eprintln!("{} {}: {}", "warning:".yellow().bold(), url, error);
    }
    println!(
        "{} {} document(s) read, {} mod(s) added or updated",
        "OK".green().bold(),
        report.documents,
        report.applied
    );

    commit_and_report(ctx).await?;
    show_mods(ctx);
    Ok(())
}
