//! Add commands
//!
//! Adds identifiers to one of the URL lists, or a single mod record, then
//! commits. Adding a modinfo URL also loads the mods that document lists.

use colored::Colorize;
use pdt_core::{Collection, CollectionName, ListKind, ModInfoSource, ModRecord, Orchestrator};

use crate::commands::report::{commit_and_report, show_list, show_mods};
use crate::context::Context;
use crate::error::Result;

/// Run `pdt add repo|modinfo|toolinfo <URL>...`
///
/// Duplicates are reported and skipped; any other failure stops the command.
pub async fn run_add_urls(ctx: &mut Context, kind: ListKind, urls: &[String]) -> Result<()> {
    println!(
        "{} Adding {} URL(s) to {}",
        "=>".blue().bold(),
        urls.len(),
        kind.name().cyan()
    );

    let web = ctx.web.clone();
    add_urls(&mut ctx.orchestrator, web.as_ref(), kind, urls).await?;

    commit_and_report(ctx).await?;
    show_list(ctx, kind);
    if kind == ListKind::ModInfo {
        show_mods(ctx);
    }
    Ok(())
}

/// Add each URL to the `kind` list without committing
async fn add_urls(
    orchestrator: &mut Orchestrator,
    source: &dyn ModInfoSource,
    kind: ListKind,
    urls: &[String],
) -> Result<()> {
    orchestrator.fetch_one(kind.into()).await?;
    if kind == ListKind::ModInfo {
        orchestrator.fetch_one(CollectionName::Mods).await?;
    }

    for url in urls {
        let url = url.trim();
        match orchestrator.list_mut(kind).add(url.to_string()).await {
            Ok(()) => println!("{} {}", "OK".green().bold(), url),
            Err(e) if e.is_duplicate() => {
                eprintln!("{} {}", "warning:".yellow().bold(), e);
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        if kind == ListKind::ModInfo {
            let applied = orchestrator.mods_mut().load_modinfo(source, url).await?;
            println!("   {} mod(s) added or updated from {}", applied, url.cyan());
        }
    }
    Ok(())
}

/// Run `pdt add mod --name ... --author ...`
pub async fn run_add_mod(ctx: &mut Context, record: ModRecord) -> Result<()> {
    println!("{} Adding mod: {}", "=>".blue().bold(), record.to_string().cyan());

    ctx.orchestrator.fetch_one(CollectionName::Mods).await?;
    ctx.orchestrator.mods_mut().add(record).await?;

    commit_and_report(ctx).await?;
    show_mods(ctx);
    Ok(())
}
