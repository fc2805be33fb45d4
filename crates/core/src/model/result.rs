use std::time::Duration;

use crate::model::combo::ComboState;
use crate::model::ids::{AnimalId, LevelId, RoundId};
use crate::model::level::DifficultyTier;
use crate::rules::ScoringRules;
use crate::scoring::{self, RoundFigures, ScoreBreakdown};

//
// ─── ITEM RECORDS ──────────────────────────────────────────────────────────────
//

/// How a single question or cell was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Correct,
    Wrong,
    /// Skipped by the player or by the countdown running out.
    Skipped,
}

/// Log entry for one resolved item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub outcome: ItemOutcome,
    pub elapsed: Duration,
    pub points: u32,
    pub hint_used: bool,
    /// Streak length right after this item.
    pub streak: u32,
}

//
// ─── TALLY ─────────────────────────────────────────────────────────────────────
//

/// In-round accumulator owned by a round machine.
///
/// Feeds each resolved item through the scoring engine and keeps the combo in
/// step; `finish` freezes everything into a `RoundResult`.
#[derive(Debug, Clone, Default)]
pub struct RoundTally {
    items: Vec<ItemRecord>,
    combo: ComboState,
    learned: Vec<AnimalId>,
}

impl RoundTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores and records one item.
    pub fn record(
        &mut self,
        rules: &ScoringRules,
        tier: DifficultyTier,
        outcome: ItemOutcome,
        elapsed: Duration,
        hint_used: bool,
    ) -> &ItemRecord {
        let points = match outcome {
            ItemOutcome::Correct => {
                self.combo.hit(rules);
                scoring::item_score(rules, true, elapsed, self.combo.current, tier, hint_used)
            }
            ItemOutcome::Wrong | ItemOutcome::Skipped => {
                self.combo.miss();
                0
            }
        };
        self.items.push(ItemRecord {
            outcome,
            elapsed,
            points,
            hint_used,
            streak: self.combo.current,
        });
        &self.items[self.items.len() - 1]
    }

    /// Remembers an entity the player answered correctly.
    pub fn learn(&mut self, id: AnimalId) {
        if !self.learned.contains(&id) {
            self.learned.push(id);
        }
    }

    #[must_use]
    pub fn combo(&self) -> &ComboState {
        &self.combo
    }

    #[must_use]
    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    #[must_use]
    pub fn count(&self, outcome: ItemOutcome) -> u32 {
        let n = self.items.iter().filter(|i| i.outcome == outcome).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    /// Item points earned so far, before round bonuses.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |sum, item| sum.saturating_add(item.points))
    }

    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.items.iter().map(|i| i.elapsed).sum()
    }

    #[must_use]
    pub fn figures(&self) -> RoundFigures {
        let attempts = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        let average_time = if attempts == 0 {
            Duration::ZERO
        } else {
            self.total_time() / attempts
        };
        RoundFigures {
            correct: self.count(ItemOutcome::Correct),
            wrong: self.count(ItemOutcome::Wrong),
            skipped: self.count(ItemOutcome::Skipped),
            highest_streak: self.combo.max_reached,
            hints_used: u32::try_from(self.items.iter().filter(|i| i.hint_used).count())
                .unwrap_or(u32::MAX),
            average_time,
        }
    }

    /// Applies the round bonuses and produces the immutable result.
    #[must_use]
    pub fn finish(&self, rules: &ScoringRules, level: LevelId, outcome: RoundOutcome) -> RoundResult {
        let figures = self.figures();
        let points: Vec<u32> = self.items.iter().map(|i| i.points).collect();
        let breakdown = scoring::aggregate(rules, &points, &figures);

        RoundResult {
            round_id: RoundId::generate(),
            level,
            outcome,
            correct: figures.correct,
            wrong: figures.wrong,
            skipped: figures.skipped,
            accuracy: figures.accuracy(),
            total_time: self.total_time(),
            average_time: figures.average_time,
            breakdown,
            highest_streak: figures.highest_streak,
            hints_used: figures.hints_used,
            perfect: outcome == RoundOutcome::Completed && figures.is_perfect(),
            learned: self.learned.clone(),
            items: self.items.clone(),
        }
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Every planned item was resolved.
    Completed,
    /// Ended early after too many mistakes.
    Failed,
}

/// Terminal aggregate of a round. Built once by `RoundTally::finish`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    round_id: RoundId,
    level: LevelId,
    outcome: RoundOutcome,
    correct: u32,
    wrong: u32,
    skipped: u32,
    accuracy: f64,
    total_time: Duration,
    average_time: Duration,
    breakdown: ScoreBreakdown,
    highest_streak: u32,
    hints_used: u32,
    perfect: bool,
    learned: Vec<AnimalId>,
    items: Vec<ItemRecord>,
}

impl RoundResult {
    #[must_use]
    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    #[must_use]
    pub fn level(&self) -> LevelId {
        self.level
    }

    #[must_use]
    pub fn outcome(&self) -> RoundOutcome {
        self.outcome
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.correct + self.wrong + self.skipped
    }

    /// Percent of resolved items answered correctly.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    #[must_use]
    pub fn average_time(&self) -> Duration {
        self.average_time
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.breakdown.total
    }

    #[must_use]
    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    #[must_use]
    pub fn highest_streak(&self) -> u32 {
        self.highest_streak
    }

    #[must_use]
    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.perfect
    }

    /// Entities answered correctly in this round (trivia only).
    #[must_use]
    pub fn learned(&self) -> &[AnimalId] {
        &self.learned
    }

    #[must_use]
    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_outcomes_and_resets_combo() {
        let rules = ScoringRules::trivia();
        let mut tally = RoundTally::new();
        for _ in 0..3 {
            tally.record(&rules, DifficultyTier::Easy, ItemOutcome::Correct, Duration::from_secs(10), false);
        }
        let skipped = tally
            .record(&rules, DifficultyTier::Easy, ItemOutcome::Skipped, Duration::from_secs(15), false)
            .clone();
        assert_eq!(skipped.points, 0);
        assert_eq!(skipped.streak, 0);
        assert_eq!(tally.combo().current, 0);
        assert_eq!(tally.combo().max_reached, 3);

        // 100 + 100 + 150 (third answer reaches the 1.5x tier)
        assert_eq!(tally.points(), 350);
        let figures = tally.figures();
        assert_eq!(figures.correct, 3);
        assert_eq!(figures.skipped, 1);
        assert_eq!(figures.average_time, Duration::from_millis(11_250));
    }

    #[test]
    fn failed_round_is_never_perfect() {
        let rules = ScoringRules::memory();
        let mut tally = RoundTally::new();
        tally.record(&rules, DifficultyTier::Easy, ItemOutcome::Correct, Duration::from_secs(1), false);
        let result = tally.finish(&rules, LevelId::new(1), RoundOutcome::Failed);
        assert!(!result.is_perfect());
        assert_eq!(result.outcome(), RoundOutcome::Failed);
    }

    #[test]
    fn empty_tally_finishes_with_zero_score() {
        let result = RoundTally::new().finish(&ScoringRules::trivia(), LevelId::new(2), RoundOutcome::Completed);
        assert_eq!(result.score(), 0);
        assert_eq!(result.attempts(), 0);
        assert!(result.accuracy().abs() < f64::EPSILON);
        assert!(!result.is_perfect());
    }

    #[test]
    fn learned_ids_are_deduplicated() {
        let mut tally = RoundTally::new();
        tally.learn(AnimalId::new("owl"));
        tally.learn(AnimalId::new("owl"));
        tally.learn(AnimalId::new("bat"));
        let result = tally.finish(&ScoringRules::trivia(), LevelId::new(1), RoundOutcome::Completed);
        assert_eq!(result.learned().len(), 2);
    }
}
