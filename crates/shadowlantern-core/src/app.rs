//! Application context: every persisted store, loaded together.
//!
//! Stores are independent JSON documents in a [`KvStore`]. Operations that
//! touch more than one store (completing a habit feeds the spirit, retiring
//! a habit archives it) live here so the ordering is fixed in one place.

use rand::Rng;
use tracing::info;

use crate::action_log::ActionLog;
use crate::collection::{CollectionArchive, CollectionEntry};
use crate::date_key::Clock;
use crate::diagnosis::DiagnosisHistory;
use crate::error::CoreError;
use crate::habit::{CompletionOutcome, HabitSettings, HabitTracker};
use crate::lantern::LanternStore;
use crate::progression::ValueSpirit;
use crate::reflection::ReflectionLog;
use crate::storage::{keys, load_json, save_json, Config, KvStore};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppContext {
    pub habit: HabitTracker,
    pub collection: CollectionArchive,
    pub spirit: ValueSpirit,
    pub lantern: LanternStore,
    pub reflection: ReflectionLog,
    pub action_log: ActionLog,
    pub diagnosis: DiagnosisHistory,
    pub settings: HabitSettings,
}

impl AppContext {
    /// Load every store, falling back to defaults for missing documents.
    ///
    /// # Errors
    /// Fails on storage errors, corrupt documents or invalid habit settings.
    pub fn load<S: KvStore + ?Sized>(store: &S, config: &Config) -> Result<Self, CoreError> {
        Ok(Self {
            habit: load_json(store, keys::HABIT)?,
            collection: load_json(store, keys::COLLECTION)?,
            spirit: load_json(store, keys::SPIRIT)?,
            lantern: load_json(store, keys::LANTERN)?,
            reflection: load_json(store, keys::REFLECTION)?,
            action_log: load_json(store, keys::ACTION_LOG)?,
            diagnosis: load_json(store, keys::DIAGNOSIS)?,
            settings: config.habit.settings()?,
        })
    }

    /// Write every store back. Each document is replaced whole.
    ///
    /// # Errors
    /// Fails on the first storage or serialization error.
    pub fn save<S: KvStore + ?Sized>(&self, store: &mut S) -> Result<(), CoreError> {
        save_json(store, keys::HABIT, &self.habit)?;
        save_json(store, keys::COLLECTION, &self.collection)?;
        save_json(store, keys::SPIRIT, &self.spirit)?;
        save_json(store, keys::LANTERN, &self.lantern)?;
        save_json(store, keys::REFLECTION, &self.reflection)?;
        save_json(store, keys::ACTION_LOG, &self.action_log)?;
        save_json(store, keys::DIAGNOSIS, &self.diagnosis)?;
        Ok(())
    }

    /// Start a habit.
    ///
    /// # Errors
    /// Returns a validation error for a blank name.
    pub fn set_habit<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        reward: &str,
        clock: &dyn Clock,
        rng: &mut R,
    ) -> Result<(), CoreError> {
        Ok(self.habit.set_habit(name, reward, clock.today(), rng)?)
    }

    /// Complete today's habit; a counted completion also feeds the spirit.
    ///
    /// # Errors
    /// Returns [`ValidationError::NoActiveHabit`](crate::ValidationError::NoActiveHabit)
    /// without a habit.
    pub fn complete_habit_today(
        &mut self,
        clock: &dyn Clock,
    ) -> Result<CompletionOutcome, CoreError> {
        let outcome = self.habit.complete_today(clock.today())?;
        if outcome.streak_increased {
            self.spirit.increment();
        }
        Ok(outcome)
    }

    pub fn needs_habituation_test(&self, clock: &dyn Clock) -> bool {
        self.habit
            .needs_habituation_test(clock.today(), &self.settings)
    }

    /// Record a habituation test; returns the formed flag.
    ///
    /// # Errors
    /// See [`HabitTracker::run_habituation_test`].
    pub fn run_habituation_test(
        &mut self,
        clock: &dyn Clock,
        passed: bool,
        note: Option<String>,
    ) -> Result<bool, CoreError> {
        Ok(self
            .habit
            .run_habituation_test(clock.today(), passed, note, &self.settings)?)
    }

    /// Archive the current cycle (when it produced anything) and reset.
    ///
    /// Returns the archived entry, if any.
    pub fn retire_habit(&mut self, clock: &dyn Clock) -> Option<CollectionEntry> {
        let today = clock.today();
        let archived = self
            .habit
            .terminal_entry(today)
            .map(|entry| self.collection.archive(entry, today).clone());
        self.habit.reset_habit();
        if archived.is_none() {
            info!("habit reset without archiving");
        }
        archived
    }

    /// Seed the lantern draft with the latest diagnosed primary value.
    ///
    /// Returns the value used, if any.
    pub fn seed_lantern_from_diagnosis(&mut self) -> Option<String> {
        let value = self.diagnosis.latest_primary_value()?.to_string();
        self.lantern.seed_from_value(&value);
        Some(value)
    }
}
