//! Commit and listing output shared by the mutating commands

use colored::Colorize;
use pdt_core::{Collection, CollectionName, CommitReport, ListKind};

use crate::context::Context;
use crate::error::Result;

/// One line per collection that was written
pub fn summarize(reports: &[(CollectionName, CommitReport)]) -> Vec<String> {
    reports
        .iter()
        .filter(|(_, report)| !report.is_empty())
        .map(|(name, report)| {
            let mut parts = Vec::new();
            if report.created > 0 {
                parts.push(format!("{} created", report.created));
            }
            if report.updated > 0 {
                parts.push(format!("{} updated", report.updated));
            }
            if report.deleted > 0 {
                parts.push(format!("{} deleted", report.deleted));
            }
            format!("{}: {}", name, parts.join(", "))
        })
        .collect()
}

/// Commit every collection and print what was written
pub async fn commit_and_report(ctx: &mut Context) -> Result<()> {
    let reports = ctx.orchestrator.commit_all().await?;
    let lines = summarize(&reports);

    if lines.is_empty() {
        println!("{} Nothing to commit.", "OK".green().bold());
        return Ok(());
    }
    for line in lines {
        println!("{} {}", "OK".green().bold(), line);
    }
    Ok(())
}

/// Print the listing of `kind` when running verbosely
pub fn show_list(ctx: &Context, kind: ListKind) {
    if !ctx.show_listing {
        return;
    }
    let list = ctx.orchestrator.list(kind);
    println!("{} {} ({})", "=>".blue().bold(), kind.name().cyan(), list.count());
    if list.count() > 0 {
        println!("{list}");
    }
}

/// Print the mod listing when running verbosely
pub fn show_mods(ctx: &Context) {
    if !ctx.show_listing {
        return;
    }
    let mods = ctx.orchestrator.mods();
    println!("{} {} ({})", "=>".blue().bold(), "mods".cyan(), mods.count());
    if mods.count() > 0 {
        println!("{mods}");
    }
}
