use clap::{Args, Subcommand};
use serde_json::json;
use shadowlantern_core::reflection::{IfPerspective, Meaning, DIRECTION_LABELS};
use shadowlantern_core::{Clock, ReflectionInput, SystemClock};

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum ReflectAction {
    /// Record today's reflection
    Daily(EntryArgs),
    /// Record this week's reflection
    Weekly {
        #[command(flatten)]
        entry: EntryArgs,
        /// How should the world be?
        #[arg(long)]
        world_ideal: Option<String>,
        /// What can you contribute to that?
        #[arg(long)]
        contribution: Option<String>,
        /// Your ideal life, for the "what if" perspective
        #[arg(long)]
        ideal_life: Option<String>,
        /// Condition the ideal life needs (repeatable)
        #[arg(long = "condition")]
        conditions: Vec<String>,
        /// One action for this week toward it
        #[arg(long)]
        week_action: Option<String>,
    },
    /// Latest entries, newest first
    List {
        #[arg(long, default_value_t = 7)]
        count: usize,
    },
    /// Whether today's and this week's reflections are done
    Status,
}

#[derive(Args)]
pub struct EntryArgs {
    /// Are your actions leading where you want to go? (1-5)
    #[arg(long)]
    direction: u8,
    /// The concrete next step
    #[arg(long)]
    next_step: String,
    #[arg(long, default_value = "")]
    comment: String,
    /// A creative alternative to what you did
    #[arg(long)]
    alternative: Option<String>,
}

impl EntryArgs {
    fn into_input(self) -> ReflectionInput {
        ReflectionInput {
            direction: self.direction,
            comment: self.comment,
            creative_alternative: self.alternative,
            next_step: self.next_step,
            meaning: None,
            if_perspective: None,
        }
    }
}

pub fn run(action: ReflectAction) -> CliResult {
    let today = SystemClock.today();
    let mut ws = Workspace::open()?;
    match action {
        ReflectAction::Daily(entry) => {
            let entry = ws.app.reflection.add_daily(entry.into_input(), today)?.clone();
            ws.save()?;
            print_json(&entry)?;
        }
        ReflectAction::Weekly {
            entry,
            world_ideal,
            contribution,
            ideal_life,
            conditions,
            week_action,
        } => {
            let mut input = entry.into_input();
            if world_ideal.is_some() || contribution.is_some() {
                input.meaning = Some(Meaning {
                    world_ideal: world_ideal.unwrap_or_default(),
                    my_contribution: contribution.unwrap_or_default(),
                });
            }
            if ideal_life.is_some() || !conditions.is_empty() || week_action.is_some() {
                input.if_perspective = Some(IfPerspective {
                    ideal_life: ideal_life.unwrap_or_default(),
                    required_conditions: conditions,
                    this_week_action: week_action.unwrap_or_default(),
                });
            }
            let entry = ws.app.reflection.add_weekly(input, today)?.clone();
            ws.save()?;
            print_json(&entry)?;
        }
        ReflectAction::List { count } => {
            let entries: Vec<_> = ws
                .app
                .reflection
                .latest(count)
                .into_iter()
                .map(|e| {
                    let label = DIRECTION_LABELS[usize::from(e.direction.clamp(1, 5)) - 1];
                    json!({ "entry": e, "directionLabel": label })
                })
                .collect();
            print_json(&entries)?;
        }
        ReflectAction::Status => {
            let log = &ws.app.reflection;
            print_json(&json!({
                "reflectedToday": log.has_reflected_today(today),
                "reflectedThisWeek": log.has_reflected_this_week(today),
                "weeklyAverageDirection": log.weekly_average_direction(today),
            }))?;
        }
    }
    Ok(())
}
