use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use shadowlantern_core::progression::MessageKind;

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum SpiritAction {
    /// Show the value spirit's stage and a greeting
    Status,
    /// Acknowledge a pending evolution
    Ack,
}

pub fn run(action: SpiritAction) -> CliResult {
    let mut rng = rand::thread_rng();
    match action {
        SpiritAction::Status => {
            let ws = Workspace::open()?;
            let spirit = &ws.app.spirit;
            let kind = if spirit.needs_evolution() {
                MessageKind::Evolve
            } else {
                MessageKind::Greeting
            };
            print_json(&json!({
                "spirit": spirit,
                "progression": spirit.snapshot(),
                "needsEvolution": spirit.needs_evolution(),
                "message": spirit.message(kind, &mut rng),
            }))?;
        }
        SpiritAction::Ack => {
            let mut ws = Workspace::open()?;
            let evolved = ws.app.spirit.needs_evolution();
            if evolved {
                ws.app.spirit.acknowledge_evolution(Utc::now());
                ws.save()?;
            }
            print_json(&json!({
                "acknowledged": evolved,
                "stage": ws.app.spirit.current_stage(),
                "message": ws.app.spirit.message(MessageKind::Celebrate, &mut rng),
            }))?;
        }
    }
    Ok(())
}
