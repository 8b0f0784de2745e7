//! One concrete value-aligned goal per day, plus its history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::date_key::DateKey;
use crate::error::ValidationError;

/// Most goals kept in history.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeArea {
    Work,
    Play,
    Relationship,
    Growth,
    Money,
    Spiritual,
}

impl LifeArea {
    pub const ALL: [LifeArea; 6] = [
        Self::Work,
        Self::Play,
        Self::Relationship,
        Self::Growth,
        Self::Money,
        Self::Spiritual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Play => "play",
            Self::Relationship => "relationship",
            Self::Growth => "growth",
            Self::Money => "money",
            Self::Spiritual => "spiritual",
        }
    }
}

impl fmt::Display for LifeArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifeArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown life area: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Planned,
    Started,
    Completed,
    Skipped,
}

impl GoalStatus {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayGoal {
    pub id: String,
    pub text: String,
    pub area: LifeArea,
    pub status: GoalStatus,
    pub created_on: DateKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_then_plan: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLog {
    pub today_goal: Option<TodayGoal>,
    pub history: Vec<TodayGoal>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set today's goal.
    ///
    /// A goal set on the same day is replaced. An open goal from an earlier
    /// day moves into history first; closed goals are already there.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] for a blank goal.
    pub fn set_today_goal(
        &mut self,
        text: &str,
        area: LifeArea,
        today: DateKey,
    ) -> Result<&TodayGoal, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::empty("goal"));
        }
        if let Some(prev) = self.today_goal.take() {
            if prev.created_on != today && !prev.status.is_closed() {
                self.push_history(prev);
            }
        }
        info!(goal = text, %area, "today's goal set");
        Ok(self.today_goal.insert(TodayGoal {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            area,
            status: GoalStatus::Planned,
            created_on: today,
            completed_at: None,
            obstacle: None,
            if_then_plan: None,
        }))
    }

    fn open_goal(&mut self) -> Result<&mut TodayGoal, ValidationError> {
        match self.today_goal.as_mut() {
            None => Err(ValidationError::invalid_state("no goal set for today")),
            Some(g) if g.status.is_closed() => Err(ValidationError::invalid_state(format!(
                "today's goal is already {:?}",
                g.status
            ).to_lowercase())),
            Some(g) => Ok(g),
        }
    }

    fn push_history(&mut self, goal: TodayGoal) {
        self.history.push(goal);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    /// # Errors
    /// Fails without an open goal.
    pub fn start(&mut self) -> Result<(), ValidationError> {
        self.open_goal()?.status = GoalStatus::Started;
        Ok(())
    }

    /// Close the goal as completed and record it in history.
    ///
    /// # Errors
    /// Fails without an open goal.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let goal = self.open_goal()?;
        goal.status = GoalStatus::Completed;
        goal.completed_at = Some(now);
        let done = goal.clone();
        info!(goal = %done.text, "goal completed");
        self.push_history(done);
        Ok(())
    }

    /// Close the goal as skipped, keeping the reason as its obstacle.
    ///
    /// # Errors
    /// Fails without an open goal.
    pub fn skip(&mut self, reason: Option<&str>) -> Result<(), ValidationError> {
        let goal = self.open_goal()?;
        goal.status = GoalStatus::Skipped;
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            goal.obstacle = Some(reason.to_string());
        }
        let skipped = goal.clone();
        self.push_history(skipped);
        Ok(())
    }

    /// # Errors
    /// Fails when no goal is set.
    pub fn set_obstacle(
        &mut self,
        obstacle: &str,
        if_then_plan: Option<String>,
    ) -> Result<(), ValidationError> {
        let goal = self
            .today_goal
            .as_mut()
            .ok_or_else(|| ValidationError::invalid_state("no goal set for today"))?;
        goal.obstacle = Some(obstacle.trim().to_string());
        goal.if_then_plan = if_then_plan;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.today_goal = None;
    }

    /// Goals from the last seven days plus today's goal if not yet logged.
    pub fn weekly_logs(&self, today: DateKey) -> Vec<&TodayGoal> {
        let mut logs: Vec<&TodayGoal> = self
            .history
            .iter()
            .filter(|g| (0..=7).contains(&g.created_on.days_until(today)))
            .collect();
        if let Some(goal) = &self.today_goal {
            if !logs.iter().any(|g| g.id == goal.id) {
                logs.push(goal);
            }
        }
        logs
    }

    /// Consecutive days with a completed goal, ending today or yesterday.
    pub fn streak(&self, today: DateKey) -> u32 {
        let days: BTreeSet<DateKey> = self
            .history
            .iter()
            .filter(|g| g.status == GoalStatus::Completed)
            .map(|g| g.created_on)
            .collect();

        let mut cursor = if days.contains(&today) {
            today
        } else {
            today.pred()
        };
        let mut streak = 0;
        while days.contains(&cursor) {
            streak += 1;
            cursor = cursor.pred();
        }
        streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateKey {
        DateKey::from_ymd(2024, 7, d).unwrap()
    }

    fn noon(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, d, 12, 0, 0).unwrap()
    }

    fn complete_on(log: &mut ActionLog, d: u32) {
        log.set_today_goal("meditate 10 minutes", LifeArea::Growth, day(d))
            .unwrap();
        log.complete(noon(d)).unwrap();
    }

    #[test]
    fn blank_goal_is_rejected() {
        let mut log = ActionLog::new();
        assert!(log.set_today_goal("  ", LifeArea::Work, day(1)).is_err());
        assert!(log.today_goal.is_none());
    }

    #[test]
    fn lifecycle_moves_closed_goals_into_history() {
        let mut log = ActionLog::new();
        log.set_today_goal("call mom", LifeArea::Relationship, day(1))
            .unwrap();
        log.start().unwrap();
        assert_eq!(log.today_goal.as_ref().unwrap().status, GoalStatus::Started);
        log.complete(noon(1)).unwrap();
        assert_eq!(log.history.len(), 1);
        assert!(log.start().is_err());

        // closed goal is not logged twice on rollover
        log.set_today_goal("budget review", LifeArea::Money, day(2))
            .unwrap();
        assert_eq!(log.history.len(), 1);
    }

    #[test]
    fn open_goal_rolls_into_history_next_day() {
        let mut log = ActionLog::new();
        log.set_today_goal("run", LifeArea::Play, day(1)).unwrap();
        log.set_today_goal("run again", LifeArea::Play, day(1)).unwrap();
        assert!(log.history.is_empty());
        log.set_today_goal("swim", LifeArea::Play, day(2)).unwrap();
        assert_eq!(log.history.len(), 1);
        assert_eq!(log.history[0].text, "run again");
    }

    #[test]
    fn skip_records_reason() {
        let mut log = ActionLog::new();
        log.set_today_goal("write", LifeArea::Work, day(3)).unwrap();
        log.skip(Some("sick")).unwrap();
        let goal = log.today_goal.as_ref().unwrap();
        assert_eq!(goal.status, GoalStatus::Skipped);
        assert_eq!(goal.obstacle.as_deref(), Some("sick"));
        assert_eq!(log.history[0].status, GoalStatus::Skipped);
    }

    #[test]
    fn obstacle_needs_a_goal() {
        let mut log = ActionLog::new();
        assert!(log.set_obstacle("rain", None).is_err());
        log.set_today_goal("run", LifeArea::Play, day(1)).unwrap();
        log.set_obstacle("rain", Some("If it rains, then treadmill".into()))
            .unwrap();
        assert_eq!(
            log.today_goal.as_ref().unwrap().if_then_plan.as_deref(),
            Some("If it rains, then treadmill")
        );
        log.clear();
        assert!(log.today_goal.is_none());
    }

    #[test]
    fn history_is_capped() {
        let mut log = ActionLog::new();
        let start = day(1);
        for i in 0..(HISTORY_LIMIT as i64 + 5) {
            log.set_today_goal("x", LifeArea::Work, start.add_days(i))
                .unwrap();
            log.complete(noon(1)).unwrap();
        }
        assert_eq!(log.history.len(), HISTORY_LIMIT);
        assert_eq!(log.history[0].created_on, start.add_days(5));
    }

    #[test]
    fn streak_counts_back_from_today_or_yesterday() {
        let mut log = ActionLog::new();
        for d in [1, 3, 4, 5] {
            complete_on(&mut log, d);
        }
        assert_eq!(log.streak(day(5)), 3);
        assert_eq!(log.streak(day(6)), 3);
        assert_eq!(log.streak(day(7)), 0);
        assert_eq!(ActionLog::new().streak(day(5)), 0);
    }

    #[test]
    fn weekly_logs_include_open_goal() {
        let mut log = ActionLog::new();
        complete_on(&mut log, 1);
        complete_on(&mut log, 9);
        log.set_today_goal("plan", LifeArea::Growth, day(10)).unwrap();
        let logs = log.weekly_logs(day(10));
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].text, "plan");
    }

    #[test]
    fn weekly_logs_cover_seven_days_back_only() {
        let mut log = ActionLog::new();
        complete_on(&mut log, 1);
        complete_on(&mut log, 2);
        complete_on(&mut log, 12);
        log.clear();
        let days: Vec<_> = log.weekly_logs(day(9)).iter().map(|g| g.created_on).collect();
        assert_eq!(days, [day(2)]);
    }
}
