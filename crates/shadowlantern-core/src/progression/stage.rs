//! Staged leveling from a cumulative count.
//!
//! A [`StageTable`] is validated once at construction; lookups on a valid
//! table cannot fail.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One level of a stage table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// 1-based level.
    pub level: u8,
    /// Cumulative count needed to reach this stage.
    pub min_count: u32,
    pub name: String,
    pub glyph: String,
    #[serde(default)]
    pub description: String,
}

impl Stage {
    pub fn new(level: u8, min_count: u32, name: &str, glyph: &str, description: &str) -> Self {
        Self {
            level,
            min_count,
            name: name.to_string(),
            glyph: glyph.to_string(),
            description: description.to_string(),
        }
    }
}

/// Ordered, non-empty list of stages with strictly increasing thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTable {
    stages: Vec<Stage>,
}

impl StageTable {
    /// Validate and build a table.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the table is empty, the first stage does
    /// not start at 0, levels do not run 1..=n, or thresholds are not
    /// strictly increasing.
    pub fn new(stages: Vec<Stage>) -> Result<Self, ConfigError> {
        let first = stages.first().ok_or(ConfigError::EmptyStageTable)?;
        if first.min_count != 0 {
            return Err(ConfigError::FirstStageNotZero);
        }
        for (index, stage) in stages.iter().enumerate() {
            if usize::from(stage.level) != index + 1 {
                return Err(ConfigError::NonConsecutiveLevels {
                    index,
                    level: stage.level,
                });
            }
        }
        for (index, pair) in stages.windows(2).enumerate() {
            if pair[1].min_count <= pair[0].min_count {
                return Err(ConfigError::NonMonotonicStages { index: index + 1 });
            }
        }
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn first(&self) -> &Stage {
        &self.stages[0]
    }

    pub fn last(&self) -> &Stage {
        &self.stages[self.stages.len() - 1]
    }

    /// Highest level in the table.
    pub fn max_level(&self) -> u8 {
        self.last().level
    }

    /// Index of the highest stage whose threshold is reached.
    fn index_for(&self, count: u32) -> usize {
        self.stages
            .iter()
            .rposition(|s| s.min_count <= count)
            .unwrap_or(0)
    }

    /// Highest stage whose `min_count <= count`.
    pub fn stage_for(&self, count: u32) -> &Stage {
        &self.stages[self.index_for(count)]
    }

    /// Progress within the current stage toward the next, in `[0, 100]`.
    ///
    /// Pinned at 100 on the final stage.
    pub fn progress_for(&self, count: u32) -> f64 {
        let index = self.index_for(count);
        let Some(next) = self.stages.get(index + 1) else {
            return 100.0;
        };
        let current = &self.stages[index];
        let in_stage = count.saturating_sub(current.min_count) as f64;
        let needed = (next.min_count - current.min_count) as f64;
        (in_stage / needed * 100.0).clamp(0.0, 100.0)
    }

    /// Counts still needed to reach the next stage, `None` at the final stage.
    pub fn remaining_to_next(&self, count: u32) -> Option<u32> {
        let index = self.index_for(count);
        self.stages
            .get(index + 1)
            .map(|next| next.min_count.saturating_sub(count))
    }
}

impl<'de> Deserialize<'de> for StageTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stages = Vec::<Stage>::deserialize(deserializer)?;
        StageTable::new(stages).map_err(serde::de::Error::custom)
    }
}

/// Stage for `count` in `table`.
pub fn stage_for(table: &StageTable, count: u32) -> &Stage {
    table.stage_for(count)
}

/// Progress percent for `count` in `table`.
pub fn progress_for(table: &StageTable, count: u32) -> f64 {
    table.progress_for(count)
}

/// Derived view of a cumulative count against a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionSnapshot {
    pub count: u32,
    pub level: u8,
    pub stage_name: String,
    pub glyph: String,
    pub progress_percent: f64,
    pub remaining_to_next: Option<u32>,
    pub is_final_stage: bool,
}

impl ProgressionSnapshot {
    pub fn of(table: &StageTable, count: u32) -> Self {
        let stage = table.stage_for(count);
        Self {
            count,
            level: stage.level,
            stage_name: stage.name.clone(),
            glyph: stage.glyph.clone(),
            progress_percent: table.progress_for(count),
            remaining_to_next: table.remaining_to_next(count),
            is_final_stage: stage.level == table.max_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> StageTable {
        StageTable::new(vec![
            Stage::new(1, 0, "one", "1", ""),
            Stage::new(2, 10, "two", "2", ""),
            Stage::new(3, 20, "three", "3", ""),
            Stage::new(4, 30, "four", "4", ""),
            Stage::new(5, 40, "five", "5", ""),
            Stage::new(6, 50, "six", "6", ""),
        ])
        .unwrap()
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            StageTable::new(vec![]),
            Err(ConfigError::EmptyStageTable)
        ));
    }

    #[test]
    fn first_stage_must_start_at_zero() {
        let result = StageTable::new(vec![Stage::new(1, 5, "a", "a", "")]);
        assert!(matches!(result, Err(ConfigError::FirstStageNotZero)));
    }

    #[test]
    fn thresholds_must_strictly_increase() {
        let result = StageTable::new(vec![
            Stage::new(1, 0, "a", "a", ""),
            Stage::new(2, 10, "b", "b", ""),
            Stage::new(3, 10, "c", "c", ""),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::NonMonotonicStages { index: 2 })
        ));
    }

    #[test]
    fn levels_must_run_from_one() {
        let gap = StageTable::new(vec![
            Stage::new(1, 0, "a", "a", ""),
            Stage::new(2, 10, "b", "b", ""),
            Stage::new(7, 20, "c", "c", ""),
        ]);
        assert!(matches!(
            gap,
            Err(ConfigError::NonConsecutiveLevels { index: 2, level: 7 })
        ));

        let zero = StageTable::new(vec![Stage::new(0, 0, "a", "a", "")]);
        assert!(matches!(
            zero,
            Err(ConfigError::NonConsecutiveLevels { index: 0, level: 0 })
        ));

        let skewed = r#"[
            {"level":1,"min_count":0,"name":"a","glyph":"a"},
            {"level":2,"min_count":10,"name":"b","glyph":"b"},
            {"level":7,"min_count":20,"name":"c","glyph":"c"}
        ]"#;
        assert!(serde_json::from_str::<StageTable>(skewed).is_err());
    }

    #[test]
    fn stage_boundaries() {
        let t = table();
        assert_eq!(t.stage_for(0).level, 1);
        assert_eq!(t.stage_for(9).level, 1);
        assert_eq!(t.stage_for(10).level, 2);
        assert_eq!(t.stage_for(49).level, 5);
        assert_eq!(t.stage_for(50).level, 6);
        assert_eq!(t.stage_for(5000).level, 6);
    }

    #[test]
    fn progress_interpolates_and_pins_at_final_stage() {
        let t = table();
        assert_eq!(t.progress_for(0), 0.0);
        assert_eq!(t.progress_for(5), 50.0);
        assert_eq!(t.progress_for(10), 0.0);
        assert_eq!(t.progress_for(19), 90.0);
        assert_eq!(t.progress_for(50), 100.0);
        assert_eq!(t.progress_for(75), 100.0);
    }

    #[test]
    fn remaining_to_next() {
        let t = table();
        assert_eq!(t.remaining_to_next(3), Some(7));
        assert_eq!(t.remaining_to_next(50), None);
    }

    #[test]
    fn deserialize_validates() {
        let bad = r#"[{"level":1,"min_count":3,"name":"a","glyph":"a"}]"#;
        assert!(serde_json::from_str::<StageTable>(bad).is_err());
        let good = r#"[{"level":1,"min_count":0,"name":"a","glyph":"a"}]"#;
        let t: StageTable = serde_json::from_str(good).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.progress_for(7), 100.0);
    }

    #[test]
    fn snapshot_reports_final_stage() {
        let snap = ProgressionSnapshot::of(&table(), 52);
        assert_eq!(snap.level, 6);
        assert!(snap.is_final_stage);
        assert_eq!(snap.remaining_to_next, None);
    }

    proptest! {
        #[test]
        fn stage_is_maximal(count in 0u32..200) {
            let t = table();
            let stage = t.stage_for(count);
            prop_assert!(stage.min_count <= count);
            let later_match = t
                .stages()
                .iter()
                .filter(|s| s.level > stage.level)
                .any(|s| s.min_count <= count);
            prop_assert!(!later_match);
        }

        #[test]
        fn progress_is_bounded(count in 0u32..200) {
            let p = table().progress_for(count);
            prop_assert!((0.0..=100.0).contains(&p));
        }

        #[test]
        fn progress_monotonic_within_band(count in 0u32..199) {
            let t = table();
            if t.stage_for(count).level == t.stage_for(count + 1).level {
                prop_assert!(t.progress_for(count + 1) >= t.progress_for(count));
            } else if t.stage_for(count + 1).level < t.max_level() {
                prop_assert_eq!(t.progress_for(count + 1), 0.0);
            } else {
                prop_assert_eq!(t.progress_for(count + 1), 100.0);
            }
        }
    }
}
