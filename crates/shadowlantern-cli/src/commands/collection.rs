use clap::Subcommand;
use shadowlantern_core::progression::variant_by_id;
use serde_json::json;

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum CollectionAction {
    /// List archived monsters
    List,
    /// Aggregate statistics over the archive
    Stats,
}

pub fn run(action: CollectionAction) -> CliResult {
    let ws = Workspace::open()?;
    match action {
        CollectionAction::List => {
            let entries: Vec<_> = ws
                .app
                .collection
                .entries()
                .iter()
                .map(|e| {
                    let variant = variant_by_id(&e.variant_id);
                    let stage = variant.stages.stage_for(e.total_completions);
                    json!({
                        "entry": e,
                        "variant": variant.name,
                        "stage": stage.name,
                        "glyph": stage.glyph,
                    })
                })
                .collect();
            print_json(&entries)?;
        }
        CollectionAction::Stats => print_json(&ws.app.collection.stats())?,
    }
    Ok(())
}
