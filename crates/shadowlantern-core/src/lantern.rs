//! Value lantern: a personal statement of one core value built in four steps.
//!
//! Flame names and defines the value, Protection lists what shields it,
//! Handle lists warning signs, Light describes its effect on others.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::diagnosis::{PhaseResponses, LANTERN_SECTIONS};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanternStep {
    #[default]
    Flame,
    Protection,
    Handle,
    Light,
    Complete,
}

impl LanternStep {
    pub fn next(self) -> Self {
        match self {
            Self::Flame => Self::Protection,
            Self::Protection => Self::Handle,
            Self::Handle => Self::Light,
            Self::Light | Self::Complete => Self::Complete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Flame {
    pub primary_value: String,
    pub secondary_value: Option<String>,
    pub personal_definition: String,
    pub ideal_day: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Protection {
    pub habits: Vec<String>,
    pub relationships: Vec<String>,
    pub boundaries: Vec<String>,
    pub supporters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Handle {
    pub body_signs: Vec<String>,
    pub mind_signs: Vec<String>,
    pub behavior_signs: Vec<String>,
    pub self_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    pub ideal_state: String,
    pub impact_on_others: String,
    pub impact_on_society: String,
}

/// A saved lantern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueLantern {
    pub id: String,
    pub flame: Flame,
    pub protection: Protection,
    pub handle: Handle,
    pub light: Light,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
}

/// Sections filled in so far.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanternDraft {
    pub flame: Option<Flame>,
    pub protection: Option<Protection>,
    pub handle: Option<Handle>,
    pub light: Option<Light>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanternStore {
    pub lantern: Option<ValueLantern>,
    pub step: LanternStep,
    pub draft: LanternDraft,
}

impl LanternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_flame(&mut self, flame: Flame) {
        self.draft.flame = Some(flame);
        self.step = LanternStep::Protection;
    }

    pub fn update_protection(&mut self, protection: Protection) {
        self.draft.protection = Some(protection);
        self.step = LanternStep::Handle;
    }

    pub fn update_handle(&mut self, handle: Handle) {
        self.draft.handle = Some(handle);
        self.step = LanternStep::Light;
    }

    pub fn update_light(&mut self, light: Light) {
        self.draft.light = Some(light);
        self.step = LanternStep::Complete;
    }

    /// Pre-fill the flame's primary value, e.g. from an analysis result.
    pub fn seed_from_value(&mut self, value: &str) {
        let flame = self.draft.flame.get_or_insert_with(Flame::default);
        flame.primary_value = value.trim().to_string();
    }

    /// Turn the draft into the saved lantern.
    ///
    /// Missing sections become empty. Re-saving keeps the id and creation
    /// time and bumps the version.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] without a primary value.
    pub fn save(&mut self, now: DateTime<Utc>) -> Result<&ValueLantern, ValidationError> {
        let flame = match &self.draft.flame {
            Some(f) if !f.primary_value.trim().is_empty() => f.clone(),
            _ => return Err(ValidationError::empty("primary value")),
        };

        let (id, created_at, version) = match &self.lantern {
            Some(prev) => (prev.id.clone(), prev.created_at, prev.version + 1),
            None => (Uuid::new_v4().to_string(), now, 1),
        };

        info!(value = %flame.primary_value, version, "lantern saved");
        let lantern = ValueLantern {
            id,
            flame,
            protection: self.draft.protection.clone().unwrap_or_default(),
            handle: self.draft.handle.clone().unwrap_or_default(),
            light: self.draft.light.clone().unwrap_or_default(),
            created_at,
            updated_at: now,
            version,
        };
        self.step = LanternStep::Complete;
        Ok(self.lantern.insert(lantern))
    }

    /// Start a fresh draft from the saved lantern, for editing.
    pub fn edit(&mut self) {
        if let Some(l) = &self.lantern {
            self.draft = LanternDraft {
                flame: Some(l.flame.clone()),
                protection: Some(l.protection.clone()),
                handle: Some(l.handle.clone()),
                light: Some(l.light.clone()),
            };
            self.step = LanternStep::Flame;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fill the draft from a completed lantern diagnosis flow.
    ///
    /// List answers are split on `;`.
    pub fn apply_flow_responses(&mut self, responses: &[PhaseResponses]) {
        let answers = |phase: &str| -> Vec<String> {
            responses
                .iter()
                .find(|r| r.phase == phase)
                .map(|r| r.responses.clone())
                .unwrap_or_default()
        };
        let nth = |v: &[String], i: usize| {
            v.get(i).map(|s| s.trim().to_string()).unwrap_or_default()
        };
        let list = |v: &[String], i: usize| split_list(v.get(i).map(String::as_str).unwrap_or(""));

        let [flame, protection, handle, light] = LANTERN_SECTIONS.map(|(id, _, _)| answers(id));

        let mut seeded = self.draft.flame.clone().unwrap_or_default();
        if !nth(&flame, 0).is_empty() {
            seeded.personal_definition = nth(&flame, 0);
        }
        seeded.ideal_day = nth(&flame, 1);
        self.update_flame(seeded);
        self.update_protection(Protection {
            habits: list(&protection, 0),
            boundaries: list(&protection, 1),
            ..Protection::default()
        });
        self.update_handle(Handle {
            body_signs: list(&handle, 0),
            mind_signs: list(&handle, 1),
            behavior_signs: Vec::new(),
            self_message: nth(&handle, 2),
        });
        self.update_light(Light {
            ideal_state: nth(&light, 0),
            impact_on_others: nth(&light, 1),
            impact_on_society: String::new(),
        });
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn save_requires_primary_value() {
        let mut store = LanternStore::new();
        assert!(store.save(at(9)).is_err());
        store.update_flame(Flame::default());
        assert_eq!(
            store.save(at(9)).unwrap_err(),
            ValidationError::empty("primary value")
        );
        assert!(store.lantern.is_none());
    }

    #[test]
    fn steps_advance_with_each_section() {
        let mut store = LanternStore::new();
        assert_eq!(store.step, LanternStep::Flame);
        store.seed_from_value("Freedom");
        store.update_flame(store.draft.flame.clone().unwrap());
        assert_eq!(store.step, LanternStep::Protection);
        store.update_protection(Protection::default());
        store.update_handle(Handle::default());
        assert_eq!(store.step, LanternStep::Light);
        store.update_light(Light::default());
        assert_eq!(store.step, LanternStep::Complete);
    }

    #[test]
    fn save_fills_defaults_and_versions() {
        let mut store = LanternStore::new();
        store.seed_from_value("  Honesty ");
        let first = store.save(at(9)).unwrap().clone();
        assert_eq!(first.flame.primary_value, "Honesty");
        assert_eq!(first.version, 1);
        assert!(first.protection.habits.is_empty());

        store.edit();
        store.update_light(Light {
            ideal_state: "calm".into(),
            ..Light::default()
        });
        let second = store.save(at(10)).unwrap().clone();
        assert_eq!(second.id, first.id);
        assert_eq!(second.version, 2);
        assert_eq!(second.created_at, at(9));
        assert_eq!(second.updated_at, at(10));
        assert_eq!(second.light.ideal_state, "calm");
    }

    #[test]
    fn flow_responses_fill_every_section() {
        let phase = |id: &str, answers: &[&str]| PhaseResponses {
            phase: id.into(),
            label: id.into(),
            responses: answers.iter().map(|s| s.to_string()).collect(),
        };
        let mut store = LanternStore::new();
        store.seed_from_value("Growth");
        store.apply_flow_responses(&[
            phase("flame", &["learning every day", "reading all morning"]),
            phase("protection", &["journal; walk", "late meetings"]),
            phase("handle", &["tight chest", "racing thoughts;", "slow down"]),
            phase("light", &["curious", "others learn too"]),
        ]);
        let lantern = store.save(at(8)).unwrap();
        assert_eq!(lantern.flame.primary_value, "Growth");
        assert_eq!(lantern.flame.personal_definition, "learning every day");
        assert_eq!(lantern.protection.habits, ["journal", "walk"]);
        assert_eq!(lantern.handle.mind_signs, ["racing thoughts"]);
        assert_eq!(lantern.handle.self_message, "slow down");
        assert_eq!(lantern.light.impact_on_others, "others learn too");
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = LanternStore::new();
        store.seed_from_value("Love");
        store.save(at(9)).unwrap();
        store.reset();
        assert_eq!(store, LanternStore::default());
    }
}
