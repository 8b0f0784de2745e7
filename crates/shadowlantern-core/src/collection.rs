//! Append-only archive of retired habit monsters.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::date_key::DateKey;
use crate::progression::variant_by_id;

/// Archive candidate produced by the habit tracker before a reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollectionEntry {
    pub variant_id: String,
    pub habit_name: String,
    pub final_level: u8,
    pub total_completions: u32,
    pub start_day: DateKey,
    pub longest_streak: u32,
}

/// An archived cycle. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub variant_id: String,
    pub habit_name: String,
    pub final_level: u8,
    pub total_completions: u32,
    pub start_day: DateKey,
    pub end_day: DateKey,
    pub longest_streak: u32,
}

/// Aggregates over the whole archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total_monsters: usize,
    pub max_level_monsters: usize,
    pub total_habits_across_all: u64,
    pub best_streak: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionArchive {
    entries: Vec<CollectionEntry>,
}

impl CollectionArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `entry`, stamping a fresh id and `end_day = today`.
    pub fn archive(&mut self, entry: NewCollectionEntry, today: DateKey) -> &CollectionEntry {
        let id = Uuid::new_v4().to_string();
        self.archive_with_id(entry, today, id)
    }

    /// Append with a caller-chosen id.
    pub fn archive_with_id(
        &mut self,
        entry: NewCollectionEntry,
        today: DateKey,
        id: String,
    ) -> &CollectionEntry {
        info!(
            id = %id,
            habit = %entry.habit_name,
            final_level = entry.final_level,
            "monster archived"
        );
        let index = self.entries.len();
        self.entries.push(CollectionEntry {
            id,
            variant_id: entry.variant_id,
            habit_name: entry.habit_name,
            final_level: entry.final_level,
            total_completions: entry.total_completions,
            start_day: entry.start_day,
            end_day: today,
            longest_streak: entry.longest_streak,
        });
        &self.entries[index]
    }

    pub fn get(&self, id: &str) -> Option<&CollectionEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            total_monsters: self.entries.len(),
            max_level_monsters: self
                .entries
                .iter()
                .filter(|e| e.final_level >= variant_by_id(&e.variant_id).stages.max_level())
                .count(),
            total_habits_across_all: self
                .entries
                .iter()
                .map(|e| u64::from(e.total_completions))
                .sum(),
            best_streak: self
                .entries
                .iter()
                .map(|e| e.longest_streak)
                .max()
                .unwrap_or(0),
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> DateKey {
        DateKey::from_ymd(2024, 1, 1).unwrap().add_days(n)
    }

    fn candidate(level: u8, total: u32, longest: u32) -> NewCollectionEntry {
        NewCollectionEntry {
            variant_id: "water".into(),
            habit_name: format!("habit-{level}"),
            final_level: level,
            total_completions: total,
            start_day: day(0),
            longest_streak: longest,
        }
    }

    #[test]
    fn empty_archive_has_zero_stats() {
        assert_eq!(CollectionArchive::new().stats(), CollectionStats::default());
    }

    #[test]
    fn stats_aggregate_entries() {
        let mut archive = CollectionArchive::new();
        archive.archive(candidate(3, 25, 4), day(30));
        archive.archive(candidate(6, 55, 21), day(60));
        archive.archive(candidate(6, 70, 9), day(90));

        let stats = archive.stats();
        assert_eq!(stats.total_monsters, 3);
        assert_eq!(stats.max_level_monsters, 2);
        assert_eq!(stats.total_habits_across_all, 150);
        assert_eq!(stats.best_streak, 21);
    }

    #[test]
    fn archive_stamps_id_and_end_day() {
        let mut archive = CollectionArchive::new();
        let first = archive.archive(candidate(2, 12, 5), day(12)).clone();
        let second = archive.archive(candidate(2, 12, 5), day(13)).clone();
        assert_ne!(first.id, second.id);
        assert_eq!(first.end_day, day(12));
        assert_eq!(first.start_day, day(0));
        assert_eq!(archive.get(&second.id), Some(&second));
    }

    #[test]
    fn explicit_ids_are_kept() {
        let mut archive = CollectionArchive::new();
        archive.archive_with_id(candidate(1, 3, 2), day(3), "fixed".into());
        assert_eq!(archive.entries()[0].id, "fixed");
        archive.clear();
        assert!(archive.is_empty());
    }
}
