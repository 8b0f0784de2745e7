//! Value card sort.
//!
//! Every value card is shown once in random order and marked important,
//! neutral or not important. The important cards are narrowed to a
//! shortlist of at most [`SHORTLIST_SIZE`], then to [`FINAL_SIZE`]
//! finalists, which are ranked. The top card is the primary value.
//!
//! Narrowing steps are skipped when the pool is already small enough: with
//! 15 or fewer important cards the shortlist is the whole pool, and with 5
//! or fewer the ranking starts right away.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::flows::FlowKind;
use super::machine::PhaseResponses;
use super::record::DiagnosisRecord;
use crate::error::ValidationError;
use crate::values::{self, ValueCard, ValueCategory};

pub const SHORTLIST_SIZE: usize = 15;
pub const FINAL_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardChoice {
    Important,
    Neutral,
    NotImportant,
}

impl std::str::FromStr for CardChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "i" | "y" | "important" => Ok(Self::Important),
            "" | "-" | "neutral" => Ok(Self::Neutral),
            "n" | "no" | "not" | "not_important" => Ok(Self::NotImportant),
            other => Err(format!("unknown choice: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSortStep {
    Sort,
    Shortlist,
    Finalists,
    Rank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMove {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct CardSort {
    deck: Vec<&'static ValueCard>,
    position: usize,
    important: Vec<&'static ValueCard>,
    shortlist: Vec<&'static ValueCard>,
    finalists: Vec<&'static ValueCard>,
    ranking: Vec<&'static ValueCard>,
    step: CardSortStep,
}

impl CardSort {
    /// Start a sort over the full value deck, shuffled with `rng`.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            deck: values::shuffled(rng),
            position: 0,
            important: Vec::new(),
            shortlist: Vec::new(),
            finalists: Vec::new(),
            ranking: Vec::new(),
            step: CardSortStep::Sort,
        }
    }

    pub fn step(&self) -> CardSortStep {
        self.step
    }

    /// Card awaiting a choice during the sort.
    pub fn current_card(&self) -> Option<&'static ValueCard> {
        match self.step {
            CardSortStep::Sort => self.deck.get(self.position).copied(),
            _ => None,
        }
    }

    /// `(sorted, total)` cards.
    pub fn progress(&self) -> (usize, usize) {
        (self.position, self.deck.len())
    }

    pub fn important(&self) -> &[&'static ValueCard] {
        &self.important
    }

    pub fn shortlist(&self) -> &[&'static ValueCard] {
        &self.shortlist
    }

    pub fn finalists(&self) -> &[&'static ValueCard] {
        &self.finalists
    }

    pub fn ranking(&self) -> &[&'static ValueCard] {
        &self.ranking
    }

    /// Cards that can be picked in the current narrowing step.
    pub fn pool(&self) -> &[&'static ValueCard] {
        match self.step {
            CardSortStep::Shortlist => &self.important,
            CardSortStep::Finalists => &self.shortlist,
            _ => &[],
        }
    }

    fn expect_step(&self, step: CardSortStep) -> Result<(), ValidationError> {
        if self.step == step {
            Ok(())
        } else {
            Err(ValidationError::invalid_state(format!(
                "card sort is in the {:?} step, not {:?}",
                self.step, step
            )))
        }
    }

    /// Mark the current card and move to the next one.
    pub fn choose(&mut self, choice: CardChoice) -> Result<CardSortStep, ValidationError> {
        self.expect_step(CardSortStep::Sort)?;
        let card = self.deck[self.position];
        if choice == CardChoice::Important {
            self.important.push(card);
        }
        self.position += 1;
        if self.position == self.deck.len() {
            self.finish_sorting();
        }
        Ok(self.step)
    }

    fn finish_sorting(&mut self) {
        let count = self.important.len();
        self.step = if count <= FINAL_SIZE {
            self.shortlist = self.important.clone();
            self.finalists = self.important.clone();
            self.ranking = self.important.clone();
            CardSortStep::Rank
        } else if count <= SHORTLIST_SIZE {
            self.shortlist = self.important.clone();
            CardSortStep::Finalists
        } else {
            CardSortStep::Shortlist
        };
        debug!(important = count, step = ?self.step, "card sort finished sorting");
    }

    /// Pick or unpick a card (by id or name) in the current narrowing step.
    ///
    /// Returns whether the card is now picked.
    ///
    /// # Errors
    /// Fails outside a narrowing step, for a card not in [`pool`], or when
    /// picking beyond the step's cap.
    ///
    /// [`pool`]: CardSort::pool
    pub fn toggle(&mut self, key: &str) -> Result<bool, ValidationError> {
        let (phase, cap) = match self.step {
            CardSortStep::Shortlist => ("shortlist", SHORTLIST_SIZE),
            CardSortStep::Finalists => ("finalists", FINAL_SIZE),
            _ => {
                return Err(ValidationError::invalid_state(
                    "cards can only be picked while narrowing",
                ))
            }
        };
        let card = values::find_value(key.trim())
            .filter(|c| self.pool().iter().any(|p| p.id == c.id))
            .ok_or_else(|| {
                let key = key.trim();
                ValidationError::invalid_state(format!("'{key}' is not a card you can pick"))
            })?;

        let picked = match self.step {
            CardSortStep::Shortlist => &mut self.shortlist,
            _ => &mut self.finalists,
        };
        if let Some(index) = picked.iter().position(|c| c.id == card.id) {
            picked.remove(index);
            return Ok(false);
        }
        if picked.len() >= cap {
            return Err(ValidationError::TooManyResponses {
                phase: phase.to_string(),
                max: cap,
            });
        }
        picked.push(card);
        Ok(true)
    }

    /// Close the current narrowing step.
    ///
    /// The shortlist needs at least [`FINAL_SIZE`] cards (exactly that many
    /// go straight to ranking); the finalists need exactly [`FINAL_SIZE`].
    pub fn confirm(&mut self) -> Result<CardSortStep, ValidationError> {
        match self.step {
            CardSortStep::Shortlist => {
                let count = self.shortlist.len();
                if count < FINAL_SIZE {
                    return Err(out_of_range("shortlist", count, FINAL_SIZE, SHORTLIST_SIZE));
                }
                if count == FINAL_SIZE {
                    self.finalists = self.shortlist.clone();
                    self.ranking = self.shortlist.clone();
                    self.step = CardSortStep::Rank;
                } else {
                    self.step = CardSortStep::Finalists;
                }
            }
            CardSortStep::Finalists => {
                let count = self.finalists.len();
                if count != FINAL_SIZE {
                    return Err(out_of_range("finalists", count, FINAL_SIZE, FINAL_SIZE));
                }
                self.ranking = self.finalists.clone();
                self.step = CardSortStep::Rank;
            }
            _ => {
                return Err(ValidationError::invalid_state(
                    "nothing to confirm in this step",
                ))
            }
        }
        Ok(self.step)
    }

    /// Swap a ranked card with its neighbour. Returns `false` when the card
    /// is already at that end.
    pub fn move_rank(
        &mut self,
        index: usize,
        direction: RankMove,
    ) -> Result<bool, ValidationError> {
        self.expect_step(CardSortStep::Rank)?;
        let target = match direction {
            RankMove::Up => index.checked_sub(1),
            RankMove::Down => Some(index + 1),
        };
        match target {
            Some(target) if index < self.ranking.len() && target < self.ranking.len() => {
                self.ranking.swap(index, target);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Reorder the ranking at once. `order` lists current positions, most
    /// important first, each exactly once.
    pub fn reorder(&mut self, order: &[usize]) -> Result<(), ValidationError> {
        self.expect_step(CardSortStep::Rank)?;
        let n = self.ranking.len();
        let mut seen = vec![false; n];
        let valid = order.len() == n
            && order
                .iter()
                .all(|&i| i < n && !std::mem::replace(&mut seen[i], true));
        if !valid {
            return Err(ValidationError::invalid_state(format!(
                "ranking must list each of the {n} positions once"
            )));
        }
        self.ranking = order.iter().map(|&i| self.ranking[i]).collect();
        Ok(())
    }

    /// Final ranking.
    ///
    /// # Errors
    /// Fails before the ranking step, or when no card was marked important.
    pub fn finish(&self) -> Result<CardSortResult, ValidationError> {
        self.expect_step(CardSortStep::Rank)?;
        if self.ranking.is_empty() {
            return Err(ValidationError::invalid_state(
                "no card was marked important",
            ));
        }
        Ok(CardSortResult {
            ranked_values: self
                .ranking
                .iter()
                .enumerate()
                .map(|(i, c)| RankedValue {
                    rank: i + 1,
                    id: c.id.to_string(),
                    name: c.name.to_string(),
                    category: c.category,
                    description: c.description.to_string(),
                })
                .collect(),
            important: names(&self.important),
            shortlist: names(&self.shortlist),
        })
    }
}

fn out_of_range(field: &str, value: usize, min: usize, max: usize) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        value: value as i64,
        min: min as i64,
        max: max as i64,
    }
}

fn names(cards: &[&ValueCard]) -> Vec<String> {
    cards.iter().map(|c| c.name.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedValue {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub category: ValueCategory,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSortResult {
    pub ranked_values: Vec<RankedValue>,
    pub important: Vec<String>,
    pub shortlist: Vec<String>,
}

impl CardSortResult {
    pub fn primary_value(&self) -> Option<&str> {
        self.ranked_values.first().map(|v| v.name.as_str())
    }

    pub fn secondary_value(&self) -> Option<&str> {
        self.ranked_values.get(1).map(|v| v.name.as_str())
    }

    /// History record; the ranking needs no interpretation.
    pub fn to_record(&self, now: DateTime<Utc>) -> Result<DiagnosisRecord, serde_json::Error> {
        let step = |phase: &str, label: &str, responses: Vec<String>| PhaseResponses {
            phase: phase.to_string(),
            label: label.to_string(),
            responses,
        };
        Ok(DiagnosisRecord {
            flow: FlowKind::CardSort,
            completed_at: now,
            responses: vec![
                step("important", "Important", self.important.clone()),
                step("shortlist", "Shortlist", self.shortlist.clone()),
                step(
                    "ranking",
                    "Ranking",
                    self.ranked_values.iter().map(|v| v.name.clone()).collect(),
                ),
            ],
            analysis: serde_json::to_value(self)?,
            primary_value: self.primary_value().map(str::to_string),
            from_fallback: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn sort() -> CardSort {
        CardSort::new(&mut Mcg128Xsl64::seed_from_u64(11))
    }

    /// Mark the first `important` cards of the deck as important.
    fn sorted(important: usize) -> CardSort {
        let mut sort = sort();
        let mut i = 0;
        while sort.step() == CardSortStep::Sort {
            let choice = if i < important {
                CardChoice::Important
            } else if i % 2 == 0 {
                CardChoice::Neutral
            } else {
                CardChoice::NotImportant
            };
            sort.choose(choice).unwrap();
            i += 1;
        }
        sort
    }

    fn ids(cards: &[&ValueCard]) -> Vec<&'static str> {
        cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn every_card_is_shown_once() {
        let mut sort = sort();
        let mut seen = std::collections::HashSet::new();
        while let Some(card) = sort.current_card() {
            assert!(seen.insert(card.id));
            sort.choose(CardChoice::Neutral).unwrap();
        }
        assert_eq!(seen.len(), values::VALUE_CARDS.len());
        assert_eq!(sort.progress(), (88, 88));
    }

    #[test]
    fn fifteen_or_fewer_skip_the_shortlist() {
        let sort = sorted(15);
        assert_eq!(sort.step(), CardSortStep::Finalists);
        assert_eq!(sort.shortlist().len(), 15);
        assert_eq!(ids(sort.pool()), ids(sort.important()));
    }

    #[test]
    fn five_or_fewer_go_straight_to_ranking() {
        let sort = sorted(3);
        assert_eq!(sort.step(), CardSortStep::Rank);
        assert_eq!(sort.ranking().len(), 3);
        let result = sort.finish().unwrap();
        assert_eq!(result.primary_value(), Some(sort.important()[0].name));
    }

    #[test]
    fn no_important_card_cannot_finish() {
        let sort = sorted(0);
        assert_eq!(sort.step(), CardSortStep::Rank);
        assert!(sort.finish().is_err());
    }

    #[test]
    fn shortlist_is_capped_at_fifteen() {
        let mut sort = sorted(20);
        assert_eq!(sort.step(), CardSortStep::Shortlist);
        let pool: Vec<_> = ids(sort.pool());
        for id in &pool[..SHORTLIST_SIZE] {
            assert!(sort.toggle(id).unwrap());
        }
        assert_eq!(
            sort.toggle(pool[SHORTLIST_SIZE]),
            Err(ValidationError::TooManyResponses {
                phase: "shortlist".into(),
                max: SHORTLIST_SIZE
            })
        );
        // unpicking frees a slot
        assert!(!sort.toggle(pool[0]).unwrap());
        assert!(sort.toggle(pool[SHORTLIST_SIZE]).unwrap());
        assert_eq!(sort.shortlist().len(), SHORTLIST_SIZE);

        assert_eq!(sort.confirm().unwrap(), CardSortStep::Finalists);
    }

    #[test]
    fn shortlist_needs_five_and_exactly_five_skips_finalists() {
        let mut sort = sorted(20);
        let pool = ids(sort.pool());
        for id in &pool[..4] {
            sort.toggle(id).unwrap();
        }
        assert!(matches!(
            sort.confirm(),
            Err(ValidationError::OutOfRange { value: 4, .. })
        ));
        sort.toggle(pool[4]).unwrap();
        assert_eq!(sort.confirm().unwrap(), CardSortStep::Rank);
        assert_eq!(ids(sort.ranking()), pool[..5]);
    }

    #[test]
    fn finalists_are_capped_at_five_and_required() {
        let mut sort = sorted(10);
        let pool = ids(sort.pool());
        for id in &pool[..4] {
            sort.toggle(id).unwrap();
        }
        assert!(sort.confirm().is_err());
        sort.toggle(pool[4]).unwrap();
        assert!(matches!(
            sort.toggle(pool[5]),
            Err(ValidationError::TooManyResponses { max: 5, .. })
        ));
        assert_eq!(sort.confirm().unwrap(), CardSortStep::Rank);
        assert_eq!(sort.ranking().len(), FINAL_SIZE);
    }

    #[test]
    fn cards_outside_the_pool_are_rejected() {
        let mut sort = sorted(10);
        let outsider = values::VALUE_CARDS
            .iter()
            .find(|c| !sort.important().iter().any(|p| p.id == c.id))
            .unwrap();
        assert!(sort.toggle(outsider.id).is_err());
        // names work as well as ids
        let name = sort.pool()[0].name;
        assert!(sort.toggle(name).unwrap());
    }

    #[test]
    fn ranking_moves_and_reorders() {
        let mut sort = sorted(10);
        let pool = ids(sort.pool());
        for id in &pool[..5] {
            sort.toggle(id).unwrap();
        }
        sort.confirm().unwrap();

        assert!(!sort.move_rank(0, RankMove::Up).unwrap());
        assert!(!sort.move_rank(4, RankMove::Down).unwrap());
        assert!(sort.move_rank(1, RankMove::Up).unwrap());
        assert_eq!(ids(sort.ranking())[..2], [pool[1], pool[0]]);

        assert!(sort.reorder(&[0, 0, 1, 2, 3]).is_err());
        assert!(sort.reorder(&[0, 1]).is_err());
        sort.reorder(&[4, 3, 2, 1, 0]).unwrap();

        let result = sort.finish().unwrap();
        assert_eq!(result.ranked_values[0].id, pool[4]);
        assert_eq!(result.ranked_values[4].rank, 5);
        assert_eq!(result.shortlist.len(), 10);
    }

    #[test]
    fn steps_are_enforced() {
        let mut sort = sort();
        assert!(sort.toggle("V001").is_err());
        assert!(sort.confirm().is_err());
        assert!(sort.move_rank(0, RankMove::Down).is_err());
        assert!(sort.finish().is_err());

        let mut ranked = sorted(2);
        assert!(ranked.choose(CardChoice::Important).is_err());
    }

    #[test]
    fn result_becomes_a_history_record() {
        let result = sorted(2).finish().unwrap();
        let record = result.to_record(Utc::now()).unwrap();
        assert_eq!(record.flow, FlowKind::CardSort);
        assert_eq!(record.primary_value.as_deref(), result.primary_value());
        assert!(!record.from_fallback);
        assert_eq!(record.responses[2].responses.len(), 2);
        assert_eq!(record.analysis["rankedValues"][0]["rank"], 1);
    }

    #[test]
    fn parse_choices() {
        assert_eq!("I".parse::<CardChoice>(), Ok(CardChoice::Important));
        assert_eq!("".parse::<CardChoice>(), Ok(CardChoice::Neutral));
        assert_eq!("n".parse::<CardChoice>(), Ok(CardChoice::NotImportant));
        assert!("maybe".parse::<CardChoice>().is_err());
    }
}
