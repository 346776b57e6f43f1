//! List command

use std::io::{self, Write};

use colored::Colorize;
use pdt_core::{Collection, CollectionName};

use crate::context::Context;
use crate::error::Result;

/// Run `pdt list <collection> [--json]`
pub async fn run_list(ctx: &mut Context, name: CollectionName, json: bool) -> Result<()> {
    ctx.orchestrator.fetch_one(name).await?;

    let (count, listing, rendered) = match name.list_kind() {
        Some(kind) => {
            let list = ctx.orchestrator.list(kind);
            (list.count(), list.to_string(), list.to_json()?)
        }
        None => {
            let mods = ctx.orchestrator.mods();
            (mods.count(), mods.to_string(), mods.to_json()?)
        }
    };

    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{rendered}")?;
        return Ok(());
    }

    writeln!(out, "{} ({})", name.as_str().bold(), count)?;
    if count == 0 {
        writeln!(out, "  {}", "(empty)".dimmed())?;
    } else {
        writeln!(out, "{listing}")?;
    }
    Ok(())
}
