use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use shadowlantern_core::lantern::Flame;
use shadowlantern_core::FlowKind;
use std::io::BufRead;

use super::diagnose::run_session;
use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum LanternAction {
    /// Show the saved lantern and any draft in progress
    Show,
    /// Save a lantern from flags
    Create {
        /// Primary value; defaults to the latest diagnosis result
        #[arg(long)]
        value: Option<String>,
        /// What the value means to you
        #[arg(long, default_value = "")]
        definition: String,
        #[arg(long)]
        secondary: Option<String>,
        #[arg(long, default_value = "")]
        ideal_day: String,
    },
    /// Answer the lantern questions interactively
    Guide {
        /// Primary value; defaults to the saved lantern, then the latest diagnosis result
        #[arg(long)]
        value: Option<String>,
    },
    /// Discard the lantern and draft
    Reset,
}

pub fn run(action: LanternAction) -> CliResult {
    let mut ws = Workspace::open()?;
    match action {
        LanternAction::Show => {
            print_json(&json!({
                "lantern": ws.app.lantern.lantern,
                "step": ws.app.lantern.step,
                "draft": ws.app.lantern.draft,
            }))?;
            return Ok(());
        }
        LanternAction::Create {
            value,
            definition,
            secondary,
            ideal_day,
        } => {
            let value = primary_value(&mut ws, value)?;
            ws.app.lantern.update_flame(Flame {
                primary_value: value,
                secondary_value: secondary,
                personal_definition: definition,
                ideal_day,
            });
        }
        LanternAction::Guide { value } => {
            // Re-guiding starts from the saved lantern so untouched fields survive.
            ws.app.lantern.edit();
            let saved = ws.app.lantern.lantern.as_ref().map(|l| l.flame.primary_value.clone());
            let value = match (value, saved) {
                (None, Some(saved)) => saved,
                (value, _) => primary_value(&mut ws, value)?,
            };
            ws.app.lantern.seed_from_value(&value);
            let stdin = std::io::stdin();
            let responses = run_session(
                FlowKind::Lantern,
                ws.config.diagnosis.chat_quota as usize,
                &mut stdin.lock().lines(),
            )?;
            ws.app.lantern.apply_flow_responses(&responses);
        }
        LanternAction::Reset => {
            ws.app.lantern.reset();
            ws.save()?;
            println!("lantern reset");
            return Ok(());
        }
    }

    let lantern = ws.app.lantern.save(Utc::now())?.clone();
    ws.save()?;
    print_json(&lantern)
}

fn primary_value(
    ws: &mut Workspace,
    value: Option<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    match value {
        Some(v) => Ok(v),
        None => ws
            .app
            .seed_lantern_from_diagnosis()
            .ok_or_else(|| "no --value given and no diagnosis result to seed from".into()),
    }
}
