//! Daily and weekly reflection log.
//!
//! Entries rate whether recent actions lead in the wanted direction and
//! always end with a concrete next step.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::date_key::DateKey;
use crate::error::ValidationError;

/// Labels for direction ratings 1..=5.
pub const DIRECTION_LABELS: [&str; 5] = [
    "Completely off course",
    "Slightly off",
    "Hard to say",
    "Mostly on course",
    "Exactly on course",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionKind {
    Daily,
    Weekly,
}

/// Weekly meaning questions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Meaning {
    pub world_ideal: String,
    pub my_contribution: String,
}

/// Weekly "what if" perspective.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IfPerspective {
    pub ideal_life: String,
    pub required_conditions: Vec<String>,
    pub this_week_action: String,
}

/// Fields supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionInput {
    pub direction: u8,
    pub comment: String,
    pub creative_alternative: Option<String>,
    pub next_step: String,
    pub meaning: Option<Meaning>,
    pub if_perspective: Option<IfPerspective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionEntry {
    pub id: String,
    pub day: DateKey,
    pub kind: ReflectionKind,
    pub direction: u8,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_alternative: Option<String>,
    pub next_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<Meaning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_perspective: Option<IfPerspective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionLog {
    pub entries: Vec<ReflectionEntry>,
    pub last_daily: Option<DateKey>,
    pub last_weekly: Option<DateKey>,
}

impl ReflectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Rejects a direction outside 1..=5 or an empty next step.
    pub fn add_daily(
        &mut self,
        input: ReflectionInput,
        today: DateKey,
    ) -> Result<&ReflectionEntry, ValidationError> {
        self.add(input, today, ReflectionKind::Daily)
    }

    /// # Errors
    /// Rejects a direction outside 1..=5 or an empty next step.
    pub fn add_weekly(
        &mut self,
        input: ReflectionInput,
        today: DateKey,
    ) -> Result<&ReflectionEntry, ValidationError> {
        self.add(input, today, ReflectionKind::Weekly)
    }

    fn add(
        &mut self,
        input: ReflectionInput,
        today: DateKey,
        kind: ReflectionKind,
    ) -> Result<&ReflectionEntry, ValidationError> {
        if !(1..=5).contains(&input.direction) {
            return Err(ValidationError::OutOfRange {
                field: "direction".into(),
                value: i64::from(input.direction),
                min: 1,
                max: 5,
            });
        }
        let next_step = input.next_step.trim();
        if next_step.is_empty() {
            return Err(ValidationError::empty("next step"));
        }

        match kind {
            ReflectionKind::Daily => self.last_daily = Some(today),
            ReflectionKind::Weekly => self.last_weekly = Some(today),
        }
        info!(?kind, day = %today, direction = input.direction, "reflection recorded");
        self.entries.push(ReflectionEntry {
            id: Uuid::new_v4().to_string(),
            day: today,
            kind,
            direction: input.direction,
            comment: input.comment.trim().to_string(),
            creative_alternative: input
                .creative_alternative
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            next_step: next_step.to_string(),
            meaning: input.meaning,
            if_perspective: input.if_perspective,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn has_reflected_today(&self, today: DateKey) -> bool {
        self.last_daily == Some(today)
    }

    /// Weeks start on Sunday.
    pub fn has_reflected_this_week(&self, today: DateKey) -> bool {
        self.last_weekly
            .is_some_and(|day| day >= today.week_start() && day <= today)
    }

    /// Up to `n` entries, newest first.
    pub fn latest(&self, n: usize) -> Vec<&ReflectionEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    /// Mean direction over entries since the start of this week; 0 when none.
    pub fn weekly_average_direction(&self, today: DateKey) -> f64 {
        let start = today.week_start();
        let week: Vec<u8> = self
            .entries
            .iter()
            .filter(|e| e.day >= start)
            .map(|e| e.direction)
            .collect();
        if week.is_empty() {
            return 0.0;
        }
        week.iter().map(|&d| f64::from(d)).sum::<f64>() / week.len() as f64
    }
}
