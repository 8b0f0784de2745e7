use clap::Subcommand;
use serde_json::json;
use shadowlantern_core::habit::REWARD_EXAMPLES;
use shadowlantern_core::{Clock, SystemClock};

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Start a new habit
    Set {
        /// Habit name (e.g. "stretch 5 minutes")
        name: String,
        /// Reward after each completion
        #[arg(long, default_value = "")]
        reward: String,
    },
    /// Mark today's habit as done
    Complete,
    /// Show the habit, streak and monster
    Status,
    /// Record a reward-habituation test
    Test {
        /// The habit happened without the reward
        #[arg(long, conflicts_with = "failed", required_unless_present = "failed")]
        passed: bool,
        /// The reward was still needed
        #[arg(long)]
        failed: bool,
        #[arg(long)]
        note: Option<String>,
    },
    /// Archive the current monster and clear the habit
    Reset,
    /// Suggested rewards
    Rewards,
}

pub fn run(action: HabitAction) -> CliResult {
    let clock = SystemClock;
    match action {
        HabitAction::Set { name, reward } => {
            let mut ws = Workspace::open()?;
            ws.app
                .set_habit(&name, &reward, &clock, &mut rand::thread_rng())?;
            ws.save()?;
            print_json(&ws.app.habit)?;
        }
        HabitAction::Complete => {
            let mut ws = Workspace::open()?;
            let outcome = ws.app.complete_habit_today(&clock)?;
            ws.save()?;
            print_json(&json!({
                "outcome": outcome,
                "monster": ws.app.habit.monster(),
                "spiritEvolved": ws.app.spirit.needs_evolution(),
                "needsHabituationTest": ws.app.needs_habituation_test(&clock),
            }))?;
        }
        HabitAction::Status => {
            let ws = Workspace::open()?;
            let habit = &ws.app.habit;
            print_json(&json!({
                "habit": habit,
                "completedToday": habit.is_completed_today(clock.today()),
                "monster": habit.monster(),
                "needsHabituationTest": ws.app.needs_habituation_test(&clock),
            }))?;
        }
        HabitAction::Test {
            passed,
            failed: _,
            note,
        } => {
            let mut ws = Workspace::open()?;
            let achieved = ws.app.run_habituation_test(&clock, passed, note)?;
            ws.save()?;
            print_json(&json!({
                "passed": passed,
                "habituationAchieved": achieved,
                "history": ws.app.habit.habituation_test_history,
            }))?;
        }
        HabitAction::Reset => {
            let mut ws = Workspace::open()?;
            let archived = ws.app.retire_habit(&clock);
            ws.save()?;
            print_json(&json!({ "archived": archived }))?;
        }
        HabitAction::Rewards => print_json(&REWARD_EXAMPLES)?,
    }
    Ok(())
}
