use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use shadowlantern_core::interpret::{GeminiClient, Interpreter};
use shadowlantern_core::{Clock, LifeArea, SystemClock};

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Set today's goal
    Set {
        /// What you will do (e.g. "meditate 10 minutes")
        text: String,
        /// work, play, relationship, growth, money or spiritual
        #[arg(long, default_value = "growth")]
        area: LifeArea,
    },
    /// Mark today's goal as started
    Start,
    /// Mark today's goal as completed
    Complete,
    /// Skip today's goal
    Skip {
        #[arg(long)]
        reason: Option<String>,
    },
    /// Record what got in the way and get an if-then plan
    Obstacle {
        obstacle: String,
    },
    /// Today's goal, streak and the last week
    Show,
    /// Drop today's goal
    Clear,
}

pub fn run(action: GoalAction) -> CliResult {
    let today = SystemClock.today();
    let mut ws = Workspace::open()?;
    match action {
        GoalAction::Set { text, area } => {
            ws.app.action_log.set_today_goal(&text, area, today)?;
        }
        GoalAction::Start => ws.app.action_log.start()?,
        GoalAction::Complete => ws.app.action_log.complete(Utc::now())?,
        GoalAction::Skip { reason } => ws.app.action_log.skip(reason.as_deref())?,
        GoalAction::Obstacle { obstacle } => {
            let goal = ws
                .app
                .action_log
                .today_goal
                .as_ref()
                .map(|g| g.text.clone())
                .ok_or("no goal set for today")?;
            let value = ws
                .app
                .lantern
                .lantern
                .as_ref()
                .map(|l| l.flame.primary_value.clone());
            let interpreter = Interpreter::with_config(
                GeminiClient::from_env(&ws.config.interpret),
                &ws.config.interpret,
            );
            let rt = tokio::runtime::Runtime::new()?;
            let plan = rt.block_on(interpreter.obstacle_plan(&goal, &obstacle, value.as_deref()));
            ws.app
                .action_log
                .set_obstacle(&obstacle, Some(plan.result.if_then_plan.clone()))?;
            ws.save()?;
            return print_json(&plan);
        }
        GoalAction::Show => {
            let log = &ws.app.action_log;
            return print_json(&json!({
                "today": log.today_goal,
                "streak": log.streak(today),
                "week": log.weekly_logs(today),
            }));
        }
        GoalAction::Clear => ws.app.action_log.clear(),
    }
    ws.save()?;
    print_json(&ws.app.action_log.today_goal)
}
