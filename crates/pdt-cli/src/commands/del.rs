//! Delete commands

use colored::Colorize;
use pdt_core::{Collection, CollectionName, ListKind, ModRecord};

use crate::commands::report::{commit_and_report, show_list, show_mods};
use crate::context::Context;
use crate::error::Result;

/// Run `pdt del repo|modinfo|toolinfo <URL>...`
pub async fn run_del_urls(ctx: &mut Context, kind: ListKind, urls: &[String]) -> Result<()> {
    println!(
        "{} Removing {} URL(s) from {}",
        "=>".blue().bold(),
        urls.len(),
        kind.name().cyan()
    );

    ctx.orchestrator.fetch_one(kind.into()).await?;

    let list = ctx.orchestrator.list_mut(kind);
    for url in urls {
        if !list.contains(url.trim()) {
            eprintln!("{} {} is not in {}", "warning:".yellow().bold(), url, kind.name());
            continue;
        }
        list.remove(url)?;
        println!("{} {} removed", "OK".green().bold(), url);
    }

    commit_and_report(ctx).await?;
    show_list(ctx, kind);
    Ok(())
}

/// Run `pdt del mod --name ... --author ...`
pub async fn run_del_mod(ctx: &mut Context, name: &str, author: &str) -> Result<()> {
    let key = ModRecord::new(name, author);
    println!("{} Removing mod {} by {}", "=>".blue().bold(), name.cyan(), author.cyan());

    ctx.orchestrator.fetch_one(CollectionName::Mods).await?;

    let mods = ctx.orchestrator.mods_mut();
    if mods.find(name, author).is_none() {
        eprintln!("{} no mod {} by {}", "warning:".yellow().bold(), name, author);
        return Ok(());
    }
    mods.remove(&key)?;

    commit_and_report(ctx).await?;
    show_mods(ctx);
    Ok(())
}
