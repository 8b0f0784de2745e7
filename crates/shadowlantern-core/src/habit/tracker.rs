//! Single-habit tracker with daily streaks and reward-habituation tests.
//!
//! One habit at a time. A completion counts at most once per calendar day;
//! a gap of two or more days restarts the streak at 1. Once the streak is
//! long enough, a weekly test asks whether the habit holds without its
//! reward; enough consecutive passes mark the habit as formed.

use chrono::Weekday;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collection::NewCollectionEntry;
use crate::date_key::DateKey;
use crate::error::ValidationError;
use crate::progression::{random_variant, variant_by_id, ProgressionSnapshot};

/// Suggested rewards shown when setting up a habit.
pub const REWARD_EXAMPLES: &[&str] = &[
    "Listen to one favorite song",
    "Have a coffee",
    "Take a 5-minute walk",
    "Eat something sweet",
    "Check social media for 5 minutes",
    "Stretch",
    "Take three deep breaths",
];

/// How the "habit formed" flag reacts to tests after it is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabituationMode {
    /// Re-evaluated from the latest results on every test; a later failure
    /// revokes the flag.
    #[default]
    Recompute,
    /// Once formed, stays formed until the habit is reset.
    Monotonic,
}

/// Cadence and thresholds for habituation testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitSettings {
    pub test_weekday: Weekday,
    pub min_streak_for_test: u32,
    pub passes_required: usize,
    pub habituation_mode: HabituationMode,
}

impl Default for HabitSettings {
    fn default() -> Self {
        Self {
            test_weekday: Weekday::Sun,
            min_streak_for_test: 7,
            passes_required: 3,
            habituation_mode: HabituationMode::Recompute,
        }
    }
}

/// One reward-habituation test result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabituationTest {
    pub day: DateKey,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Result of a daily completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub streak_increased: bool,
    pub new_streak: u32,
    pub is_new_record: bool,
}

/// Persisted tracker state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitTracker {
    pub habit_name: Option<String>,
    pub reward_text: String,
    pub streak: u32,
    pub last_completed_day: Option<DateKey>,
    pub total_completions: u32,
    pub longest_streak: u32,
    pub variant_id: Option<String>,
    pub started_on: Option<DateKey>,
    pub habituation_test_history: Vec<HabituationTest>,
    pub habituation_achieved: bool,
}

impl HabitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.habit_name.is_some()
    }

    /// Start tracking a habit with its reward.
    ///
    /// Resets the streak and test history and rolls a new monster variant.
    /// Lifetime totals are kept; call [`reset_habit`](Self::reset_habit)
    /// first to start from zero.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] if `name` is blank. Nothing is
    /// changed in that case.
    pub fn set_habit<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        reward: &str,
        today: DateKey,
        rng: &mut R,
    ) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty("habit name"));
        }
        let variant = random_variant(rng);

        self.habit_name = Some(name.to_string());
        self.reward_text = reward.trim().to_string();
        self.streak = 0;
        self.last_completed_day = None;
        self.variant_id = Some(variant.id.clone());
        self.started_on = Some(today);
        self.habituation_test_history.clear();
        self.habituation_achieved = false;

        info!(habit = name, variant = %variant.id, "habit set");
        Ok(())
    }

    /// Record today's completion. Idempotent within a calendar day.
    ///
    /// # Errors
    /// Returns [`ValidationError::NoActiveHabit`] when no habit is set.
    pub fn complete_today(&mut self, today: DateKey) -> Result<CompletionOutcome, ValidationError> {
        if !self.is_active() {
            return Err(ValidationError::NoActiveHabit);
        }
        if self.last_completed_day == Some(today) {
            return Ok(CompletionOutcome {
                streak_increased: false,
                new_streak: self.streak,
                is_new_record: false,
            });
        }

        self.streak = if self.last_completed_day == Some(today.pred()) {
            self.streak + 1
        } else {
            1
        };
        self.total_completions += 1;
        let is_new_record = self.streak > self.longest_streak;
        if is_new_record {
            self.longest_streak = self.streak;
        }
        self.last_completed_day = Some(today);

        debug!(
            streak = self.streak,
            total = self.total_completions,
            is_new_record,
            "habit completed"
        );
        Ok(CompletionOutcome {
            streak_increased: true,
            new_streak: self.streak,
            is_new_record,
        })
    }

    pub fn is_completed_today(&self, today: DateKey) -> bool {
        self.last_completed_day == Some(today)
    }

    /// Whether today calls for a reward-habituation test.
    pub fn needs_habituation_test(&self, today: DateKey, settings: &HabitSettings) -> bool {
        if !self.is_active() || self.habituation_achieved {
            return false;
        }
        if today.weekday() != settings.test_weekday {
            return false;
        }
        if self.tested_on(today) {
            return false;
        }
        self.streak >= settings.min_streak_for_test
    }

    fn tested_on(&self, day: DateKey) -> bool {
        self.habituation_test_history
            .last()
            .is_some_and(|t| t.day == day)
    }

    /// Record a habituation test result and re-evaluate the formed flag.
    ///
    /// # Errors
    /// Fails without recording when no habit is active or a test was already
    /// recorded today.
    pub fn run_habituation_test(
        &mut self,
        today: DateKey,
        passed: bool,
        note: Option<String>,
        settings: &HabitSettings,
    ) -> Result<bool, ValidationError> {
        if !self.is_active() {
            return Err(ValidationError::NoActiveHabit);
        }
        if self.tested_on(today) {
            return Err(ValidationError::invalid_state(format!(
                "habituation test already recorded for {today}"
            )));
        }

        self.habituation_test_history.push(HabituationTest {
            day: today,
            passed,
            note: note.filter(|n| !n.trim().is_empty()),
        });

        let recent_all_passed = recent_all_passed(
            &self.habituation_test_history,
            settings.passes_required,
        );
        self.habituation_achieved = match settings.habituation_mode {
            HabituationMode::Recompute => recent_all_passed,
            HabituationMode::Monotonic => self.habituation_achieved || recent_all_passed,
        };

        info!(passed, achieved = self.habituation_achieved, "habituation test recorded");
        Ok(self.habituation_achieved)
    }

    /// Archive candidate for the current cycle.
    ///
    /// `None` unless a habit and variant are set and at least one completion
    /// was recorded.
    pub fn terminal_entry(&self, today: DateKey) -> Option<NewCollectionEntry> {
        let habit_name = self.habit_name.clone()?;
        let variant_id = self.variant_id.clone()?;
        if self.total_completions == 0 {
            return None;
        }
        let final_level = variant_by_id(&variant_id)
            .stages
            .stage_for(self.total_completions)
            .level;
        Some(NewCollectionEntry {
            variant_id,
            habit_name,
            final_level,
            total_completions: self.total_completions,
            start_day: self.started_on.unwrap_or(today),
            longest_streak: self.longest_streak,
        })
    }

    /// Clear the current habit and its cycle statistics.
    ///
    /// Archive [`terminal_entry`](Self::terminal_entry) before calling this;
    /// the fields it needs are gone afterwards.
    pub fn reset_habit(&mut self) {
        if let Some(name) = &self.habit_name {
            info!(habit = %name, "habit reset");
        }
        *self = Self::default();
    }

    /// Monster progression for the active cycle.
    pub fn monster(&self) -> Option<ProgressionSnapshot> {
        let variant = variant_by_id(self.variant_id.as_deref()?);
        Some(ProgressionSnapshot::of(&variant.stages, self.total_completions))
    }
}

fn recent_all_passed(history: &[HabituationTest], required: usize) -> bool {
    let required = required.max(1);
    history.len() >= required && history[history.len() - required..].iter().all(|t| t.passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn rng() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(99)
    }

    fn day(n: i64) -> DateKey {
        // 2024-06-02 is a Sunday
        DateKey::from_ymd(2024, 6, 2).unwrap().add_days(n)
    }

    fn active() -> HabitTracker {
        let mut t = HabitTracker::new();
        t.set_habit("stretch", "coffee", day(0), &mut rng()).unwrap();
        t
    }

    #[test]
    fn empty_name_is_rejected_without_mutation() {
        let mut t = HabitTracker::new();
        let before = t.clone();
        let err = t.set_habit("   ", "coffee", day(0), &mut rng()).unwrap_err();
        assert_eq!(err, ValidationError::empty("habit name"));
        assert_eq!(t, before);
    }

    #[test]
    fn set_habit_assigns_variant_and_resets_cycle() {
        let mut t = active();
        t.complete_today(day(0)).unwrap();
        t.set_habit("read", "tea", day(1), &mut rng()).unwrap();
        assert_eq!(t.habit_name.as_deref(), Some("read"));
        assert_eq!(t.streak, 0);
        assert!(t.last_completed_day.is_none());
        assert!(t.variant_id.is_some());
        assert_eq!(t.started_on, Some(day(1)));
        // lifetime totals survive a rename
        assert_eq!(t.total_completions, 1);
        assert_eq!(t.longest_streak, 1);
    }

    #[test]
    fn completion_is_idempotent_per_day() {
        let mut t = active();
        let first = t.complete_today(day(0)).unwrap();
        assert!(first.streak_increased);
        assert!(first.is_new_record);
        let snapshot = t.clone();
        let second = t.complete_today(day(0)).unwrap();
        assert_eq!(
            second,
            CompletionOutcome {
                streak_increased: false,
                new_streak: 1,
                is_new_record: false
            }
        );
        assert_eq!(t, snapshot);
        assert!(t.is_completed_today(day(0)));
        assert!(!t.is_completed_today(day(1)));
    }

    #[test]
    fn streak_continues_and_breaks() {
        let mut t = active();
        t.complete_today(day(0)).unwrap();
        assert_eq!(t.complete_today(day(1)).unwrap().new_streak, 2);
        let after_gap = t.complete_today(day(3)).unwrap();
        assert_eq!(after_gap.new_streak, 1);
        assert!(!after_gap.is_new_record);
        assert_eq!(t.total_completions, 3);
        assert_eq!(t.longest_streak, 2);
    }

    #[test]
    fn completing_without_habit_fails() {
        let mut t = HabitTracker::new();
        assert_eq!(t.complete_today(day(0)), Err(ValidationError::NoActiveHabit));
    }

    #[test]
    fn test_due_only_on_weekday_with_long_streak() {
        let settings = HabitSettings::default();
        let mut t = active();
        for n in 0..7 {
            t.complete_today(day(n)).unwrap();
        }
        // day(7) is the next Sunday, streak is 7
        assert_eq!(day(7).weekday(), Weekday::Sun);
        assert!(t.needs_habituation_test(day(7), &settings));
        assert!(!t.needs_habituation_test(day(8), &settings));

        t.run_habituation_test(day(7), true, None, &settings).unwrap();
        assert!(!t.needs_habituation_test(day(7), &settings));
    }

    #[test]
    fn short_streak_never_triggers_test() {
        let settings = HabitSettings::default();
        let mut t = active();
        for n in 1..7 {
            t.complete_today(day(n)).unwrap();
        }
        assert_eq!(t.streak, 6);
        assert!(!t.needs_habituation_test(day(7), &settings));
    }

    #[test]
    fn three_passes_form_the_habit() {
        let settings = HabitSettings::default();
        let mut t = active();
        assert!(!t.run_habituation_test(day(0), true, None, &settings).unwrap());
        assert!(!t.run_habituation_test(day(7), true, None, &settings).unwrap());
        assert!(t.run_habituation_test(day(14), true, None, &settings).unwrap());
        assert!(t.habituation_achieved);
        assert!(!t.needs_habituation_test(day(21), &settings));
    }

    #[test]
    fn recompute_mode_revokes_on_failure() {
        let settings = HabitSettings::default();
        let mut t = active();
        for n in 0..3 {
            t.run_habituation_test(day(n * 7), true, None, &settings).unwrap();
        }
        assert!(t.habituation_achieved);
        t.run_habituation_test(day(21), false, Some("skipped it".into()), &settings)
            .unwrap();
        assert!(!t.habituation_achieved);
        assert_eq!(
            t.habituation_test_history.last().unwrap().note.as_deref(),
            Some("skipped it")
        );
    }

    #[test]
    fn monotonic_mode_keeps_achievement() {
        let settings = HabitSettings {
            habituation_mode: HabituationMode::Monotonic,
            ..Default::default()
        };
        let mut t = active();
        for n in 0..3 {
            t.run_habituation_test(day(n * 7), true, None, &settings).unwrap();
        }
        t.run_habituation_test(day(21), false, None, &settings).unwrap();
        assert!(t.habituation_achieved);
    }

    #[test]
    fn one_test_per_day() {
        let settings = HabitSettings::default();
        let mut t = active();
        t.run_habituation_test(day(0), true, None, &settings).unwrap();
        assert!(t.run_habituation_test(day(0), false, None, &settings).is_err());
        assert_eq!(t.habituation_test_history.len(), 1);
    }

    #[test]
    fn terminal_entry_requires_completions() {
        let mut t = active();
        assert!(t.terminal_entry(day(0)).is_none());
        for n in 0..12 {
            t.complete_today(day(n)).unwrap();
        }
        let entry = t.terminal_entry(day(12)).unwrap();
        assert_eq!(entry.habit_name, "stretch");
        assert_eq!(entry.final_level, 2);
        assert_eq!(entry.total_completions, 12);
        assert_eq!(entry.start_day, day(0));
        assert_eq!(entry.longest_streak, 12);
    }

    #[test]
    fn reset_clears_everything() {
        let mut t = active();
        t.complete_today(day(0)).unwrap();
        t.reset_habit();
        assert_eq!(t, HabitTracker::default());
        assert!(t.monster().is_none());
    }

    #[test]
    fn monster_follows_total_completions() {
        let mut t = active();
        for n in 0..5 {
            t.complete_today(day(n)).unwrap();
        }
        let monster = t.monster().unwrap();
        assert_eq!(monster.level, 1);
        assert_eq!(monster.progress_percent, 50.0);
    }

    #[test]
    fn persisted_document_roundtrip() {
        let mut t = active();
        t.complete_today(day(0)).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: HabitTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        // older documents without newer fields still load
        let minimal: HabitTracker = serde_json::from_str(r#"{"streak":2}"#).unwrap();
        assert_eq!(minimal.streak, 2);
        assert!(minimal.habit_name.is_none());
    }
}
