//! Habit tracking.

mod tracker;

pub use tracker::{
    CompletionOutcome, HabitSettings, HabitTracker, HabituationMode, HabituationTest,
    REWARD_EXAMPLES,
};
