//! The value spirit: a companion that grows with every value-aligned habit.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stage::{ProgressionSnapshot, Stage};
use super::variants::SPIRIT_STAGES;

/// Kind of line the spirit says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Greeting,
    Encourage,
    Celebrate,
    Evolve,
}

type MessageGroup = (MessageKind, &'static [&'static str]);

const STAGE_1: &[MessageGroup] = &[
    (
        MessageKind::Greeting,
        &["Hi, I'm with you again today", "I'm guarding your values", "I'm small, but I'm trying"],
    ),
    (
        MessageKind::Encourage,
        &["You can act on your values today", "One step at a time", "You've got this"],
    ),
];

const STAGE_2: &[MessageGroup] = &[
    (
        MessageKind::Greeting,
        &["I'm growing!", "Let's get stronger together", "A sprout has appeared"],
    ),
    (MessageKind::Encourage, &["Keep it up!", "This feels good", "Let's keep going"]),
    (MessageKind::Evolve, &["I did it! A new form!", "Evolution!"]),
];

const STAGE_3: &[MessageGroup] = &[
    (
        MessageKind::Greeting,
        &["The flame is rising!", "I can feel the power", "Let's shine together"],
    ),
    (
        MessageKind::Encourage,
        &["That's the spirit!", "Make the flame bigger", "I believe in you"],
    ),
    (
        MessageKind::Celebrate,
        &["Amazing!", "The best!", "You're living your values"],
    ),
];

const STAGE_4: &[MessageGroup] = &[
    (
        MessageKind::Greeting,
        &["I feel a guardian's strength", "I'll guide you", "Let's walk together"],
    ),
    (
        MessageKind::Encourage,
        &["No hardship can stop you", "You've grown strong", "Trust yourself and go"],
    ),
    (
        MessageKind::Celebrate,
        &["Wonderful!", "That's your strength", "I'm proud of you"],
    ),
];

const STAGE_5: &[MessageGroup] = &[
    (
        MessageKind::Greeting,
        &["I have awakened as a spirit", "Your values have taken form", "We are one"],
    ),
    (
        MessageKind::Encourage,
        &["Together we can do anything", "Your values are shining", "The best partner"],
    ),
    (
        MessageKind::Celebrate,
        &["I'm moved!", "I'm happy to be with you", "Simply wonderful"],
    ),
];

const STAGE_6: &[MessageGroup] = &[
    (
        MessageKind::Greeting,
        &["I stand with you as your guardian", "The strongest partner", "Together forever"],
    ),
    (
        MessageKind::Encourage,
        &["Every challenge is welcome", "Let's make a legend", "Invincible"],
    ),
    (
        MessageKind::Celebrate,
        &["Legendary!", "The greatest achievement!", "A proud guardian"],
    ),
];

fn groups_for_level(level: u8) -> &'static [MessageGroup] {
    match level {
        2 => STAGE_2,
        3 => STAGE_3,
        4 => STAGE_4,
        5 => STAGE_5,
        6 => STAGE_6,
        _ => STAGE_1,
    }
}

/// Persisted state of the value spirit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueSpirit {
    pub habit_count: u32,
    /// Last stage level whose evolution the user has seen.
    pub last_evolved_stage: u8,
    pub last_evolved_at: Option<DateTime<Utc>>,
}

impl Default for ValueSpirit {
    fn default() -> Self {
        Self {
            habit_count: 0,
            last_evolved_stage: 1,
            last_evolved_at: None,
        }
    }
}

impl ValueSpirit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self) {
        self.habit_count += 1;
        debug!(habit_count = self.habit_count, "value spirit fed");
    }

    pub fn current_stage(&self) -> &'static Stage {
        SPIRIT_STAGES.stage_for(self.habit_count)
    }

    /// Progress toward the next stage (0-100).
    pub fn progress(&self) -> f64 {
        SPIRIT_STAGES.progress_for(self.habit_count)
    }

    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot::of(&SPIRIT_STAGES, self.habit_count)
    }

    /// True when the current stage has not yet been shown to the user.
    pub fn needs_evolution(&self) -> bool {
        self.current_stage().level > self.last_evolved_stage
    }

    pub fn acknowledge_evolution(&mut self, now: DateTime<Utc>) {
        self.last_evolved_stage = self.current_stage().level;
        self.last_evolved_at = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// A line for the current stage.
    ///
    /// Falls back to the stage's first group when it has no line of `kind`.
    pub fn message<R: Rng + ?Sized>(&self, kind: MessageKind, rng: &mut R) -> &'static str {
        message_for(self.current_stage().level, kind, rng)
    }
}

/// A random line of `kind` for the given stage level.
pub fn message_for<R: Rng + ?Sized>(level: u8, kind: MessageKind, rng: &mut R) -> &'static str {
    let groups = groups_for_level(level);
    let lines = groups
        .iter()
        .find(|(k, _)| *k == kind)
        .or_else(|| groups.first())
        .map(|(_, lines)| *lines)
        .unwrap_or(&[]);
    lines.choose(rng).copied().unwrap_or("")
}
