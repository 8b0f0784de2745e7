//! Habit lifecycle through the application context.
//!
//! Covers the stretch/coffee scenario, archive statistics, persistence to
//! an on-disk database, and property tests for streak arithmetic.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use shadowlantern_core::{
    AppContext, Clock, CollectionArchive, Config, DateKey, Database, FixedClock, HabitSettings,
    HabitTracker, NewCollectionEntry,
};

fn day(n: i64) -> DateKey {
    DateKey::from_ymd(2024, 1, 1).unwrap().add_days(n - 1)
}

fn rng() -> Mcg128Xsl64 {
    Mcg128Xsl64::seed_from_u64(42)
}

#[test]
fn stretch_coffee_scenario() {
    let clock = FixedClock::at_day(day(1));
    let mut app = AppContext::default();
    app.set_habit("stretch", "coffee", &clock, &mut rng()).unwrap();

    let first = app.complete_habit_today(&clock).unwrap();
    assert_eq!(first.new_streak, 1);
    assert_eq!(app.habit.total_completions, 1);

    clock.set_day(day(2));
    assert_eq!(app.complete_habit_today(&clock).unwrap().new_streak, 2);

    // day 3 skipped
    clock.set_day(day(4));
    let after_gap = app.complete_habit_today(&clock).unwrap();
    assert_eq!(after_gap.new_streak, 1);
    assert!(!after_gap.is_new_record);
    assert_eq!(app.habit.total_completions, 3);
    assert_eq!(app.habit.longest_streak, 2);

    let entry = app.retire_habit(&clock).unwrap();
    assert_eq!(entry.habit_name, "stretch");
    assert_eq!(entry.total_completions, 3);
    assert_eq!(entry.longest_streak, 2);
    assert_eq!(entry.start_day, day(1));
    assert_eq!(entry.end_day, day(4));
    assert_eq!(app.collection.len(), 1);
    assert_eq!(app.spirit.habit_count, 3);
    assert!(!app.habit.is_active());
}

#[test]
fn archive_stats_count_max_level_monsters() {
    let mut archive = CollectionArchive::new();
    let stats = archive.stats();
    assert_eq!(stats.total_monsters, 0);
    assert_eq!(stats.max_level_monsters, 0);
    assert_eq!(stats.total_habits_across_all, 0);
    assert_eq!(stats.best_streak, 0);

    for (level, streak) in [(3, 4), (6, 12), (6, 9)] {
        archive.archive(
            NewCollectionEntry {
                variant_id: "fire".into(),
                habit_name: "h".into(),
                final_level: level,
                total_completions: 10,
                start_day: day(1),
                longest_streak: streak,
            },
            day(30),
        );
    }
    let stats = archive.stats();
    assert_eq!(stats.total_monsters, 3);
    assert_eq!(stats.max_level_monsters, 2);
    assert_eq!(stats.total_habits_across_all, 30);
    assert_eq!(stats.best_streak, 12);
}

#[test]
fn state_survives_database_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shadowlantern.db");
    let clock = FixedClock::at_day(day(5));

    {
        let mut db = Database::open_at(&path).unwrap();
        let mut app = AppContext::load(&db, &Config::default()).unwrap();
        app.set_habit("journal", "tea", &clock, &mut rng()).unwrap();
        app.complete_habit_today(&clock).unwrap();
        app.save(&mut db).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let app = AppContext::load(&db, &Config::default()).unwrap();
    assert_eq!(app.habit.habit_name.as_deref(), Some("journal"));
    assert!(app.habit.is_completed_today(clock.today()));
    assert_eq!(app.spirit.habit_count, 1);
}

#[test]
fn habituation_needs_weekday_and_streak() {
    let settings = HabitSettings::default();
    let mut tracker = HabitTracker::new();
    tracker.set_habit("floss", "", day(1), &mut rng()).unwrap();
    // 2024-01-07 is a Sunday
    for n in 1..=7 {
        tracker.complete_today(day(n)).unwrap();
    }
    assert!(tracker.needs_habituation_test(day(7), &settings));
    assert!(!tracker.needs_habituation_test(day(6), &settings));

    tracker.run_habituation_test(day(7), true, None, &settings).unwrap();
    assert!(!tracker.needs_habituation_test(day(7), &settings));
}

proptest! {
    #[test]
    fn second_completion_same_day_changes_nothing(gaps in prop::collection::vec(1i64..4, 1..20)) {
        let mut tracker = HabitTracker::new();
        tracker.set_habit("walk", "", day(1), &mut rng()).unwrap();
        let mut today = day(1);
        for gap in gaps {
            today = today.add_days(gap);
            tracker.complete_today(today).unwrap();
            let before = tracker.clone();
            let again = tracker.complete_today(today).unwrap();
            prop_assert!(!again.streak_increased);
            prop_assert_eq!(again.new_streak, before.streak);
            prop_assert_eq!(&tracker, &before);
        }
    }

    #[test]
    fn streak_follows_gaps_and_record_never_drops(gaps in prop::collection::vec(1i64..4, 1..30)) {
        let mut tracker = HabitTracker::new();
        tracker.set_habit("walk", "", day(1), &mut rng()).unwrap();
        let mut today = day(1);
        tracker.complete_today(today).unwrap();
        let mut longest = tracker.longest_streak;
        for gap in gaps {
            let prev_streak = tracker.streak;
            today = today.add_days(gap);
            let outcome = tracker.complete_today(today).unwrap();
            let expected = if gap == 1 { prev_streak + 1 } else { 1 };
            prop_assert_eq!(outcome.new_streak, expected);
            prop_assert!(tracker.longest_streak >= longest);
            prop_assert!(tracker.longest_streak >= tracker.streak);
            longest = tracker.longest_streak;
        }
    }

    #[test]
    fn habituation_flag_is_last_three_passed(
        results in prop::collection::vec(any::<bool>(), 1..15)
    ) {
        let settings = HabitSettings::default();
        let mut tracker = HabitTracker::new();
        tracker.set_habit("walk", "", day(1), &mut rng()).unwrap();
        for (i, passed) in results.iter().enumerate() {
            let achieved = tracker
                .run_habituation_test(day(1 + 7 * i as i64), *passed, None, &settings)
                .unwrap();
            let history = &results[..=i];
            let expected = history.len() >= 3 && history[history.len() - 3..].iter().all(|p| *p);
            prop_assert_eq!(achieved, expected);
        }
    }
}
