use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::result::RoundResult;
use crate::rules::{ProgressionRules, RankBasis, RankBracket};
use crate::scoring;

//
// ─── LEVEL PROGRESS ────────────────────────────────────────────────────────────
//

/// Persistent per-level record. Every "best" field only ever grows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelProgress {
    pub high_score: u32,
    pub best_accuracy: f64,
    pub best_streak: u32,
    pub plays: u32,
    pub completions: u32,
    pub perfect_rounds: u32,
    pub unlocked: bool,
    pub stars: u8,
    pub last_played_at: Option<DateTime<Utc>>,
}

impl LevelProgress {
    /// Fresh progress for a level that has just been unlocked.
    #[must_use]
    pub fn unlocked() -> Self {
        Self {
            unlocked: true,
            ..Self::default()
        }
    }

    /// Folds a round result into this record and returns the stars gained.
    pub fn absorb(
        &mut self,
        result: &RoundResult,
        rules: &ProgressionRules,
        played_at: DateTime<Utc>,
    ) -> u8 {
        self.high_score = self.high_score.max(result.score());
        self.best_accuracy = self.best_accuracy.max(result.accuracy());
        self.best_streak = self.best_streak.max(result.highest_streak());
        self.plays = self.plays.saturating_add(1);
        if result.accuracy() >= rules.completion_accuracy {
            self.completions = self.completions.saturating_add(1);
        }
        if result.is_perfect() {
            self.perfect_rounds = self.perfect_rounds.saturating_add(1);
        }
        // A level that has been played is reachable, whatever gate it had.
        self.unlocked = true;
        self.last_played_at = Some(played_at);

        let earned = scoring::stars(&rules.star_thresholds, result.accuracy());
        let before = self.stars;
        self.stars = self.stars.max(earned);
        self.stars - before
    }
}

//
// ─── AGGREGATE STATS ───────────────────────────────────────────────────────────
//

/// Persistent totals across every round of one game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateStats {
    pub rounds_played: u32,
    pub total_answered: u32,
    pub total_correct: u32,
    pub total_play_time_ms: u64,
    pub longest_streak: u32,
    pub perfect_rounds: u32,
    pub learned: BTreeSet<String>,
    /// Index into the rank table; never decreases.
    pub rank: usize,
}

impl AggregateStats {
    /// Folds a round into the totals and returns whether the rank advanced.
    pub fn absorb(&mut self, result: &RoundResult, rules: &ProgressionRules) -> bool {
        self.rounds_played = self.rounds_played.saturating_add(1);
        self.total_answered = self.total_answered.saturating_add(result.attempts());
        self.total_correct = self.total_correct.saturating_add(result.correct());
        let elapsed_ms = u64::try_from(result.total_time().as_millis()).unwrap_or(u64::MAX);
        self.total_play_time_ms = self.total_play_time_ms.saturating_add(elapsed_ms);
        self.longest_streak = self.longest_streak.max(result.highest_streak());
        if result.is_perfect() {
            self.perfect_rounds = self.perfect_rounds.saturating_add(1);
        }
        self.learned
            .extend(result.learned().iter().map(|id| id.as_str().to_owned()));

        let computed = rank_index(&rules.ranks, self.rank_count(rules.rank_basis));
        let advanced = computed > self.rank;
        self.rank = self.rank.max(computed);
        advanced
    }

    /// The monotone count the rank is derived from.
    #[must_use]
    pub fn rank_count(&self, basis: RankBasis) -> u32 {
        match basis {
            RankBasis::DistinctLearned => u32::try_from(self.learned.len()).unwrap_or(u32::MAX),
            RankBasis::TotalCorrect => self.total_correct,
        }
    }
}

/// Highest bracket whose minimum the count reaches.
#[must_use]
pub fn rank_index(ranks: &[RankBracket], count: u32) -> usize {
    ranks
        .iter()
        .rposition(|bracket| count >= bracket.min_count)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DifficultyTier, ItemOutcome, LevelId, RoundOutcome, RoundTally};
    use crate::rules::ScoringRules;
    use crate::time::fixed_now;
    use std::time::Duration;

    fn result_with(correct: u32, wrong: u32) -> RoundResult {
        let rules = ScoringRules::trivia();
        let mut tally = RoundTally::new();
        for _ in 0..correct {
            tally.record(&rules, DifficultyTier::Easy, ItemOutcome::Correct, Duration::from_secs(4), false);
        }
        for _ in 0..wrong {
            tally.record(&rules, DifficultyTier::Easy, ItemOutcome::Wrong, Duration::from_secs(4), false);
        }
        tally.finish(&rules, LevelId::new(1), RoundOutcome::Completed)
    }

    #[test]
    fn progress_keeps_best_values() {
        let rules = ProgressionRules::trivia();
        let mut progress = LevelProgress::default();

        let gained = progress.absorb(&result_with(8, 0), &rules, fixed_now());
        assert_eq!(gained, 3);
        let best = progress.high_score;

        let gained = progress.absorb(&result_with(2, 6), &rules, fixed_now());
        assert_eq!(gained, 0);
        assert_eq!(progress.stars, 3);
        assert_eq!(progress.high_score, best);
        assert!((progress.best_accuracy - 100.0).abs() < f64::EPSILON);
        assert_eq!(progress.best_streak, 8);
        assert_eq!(progress.plays, 2);
        assert_eq!(progress.completions, 1);
        assert_eq!(progress.perfect_rounds, 1);
    }

    #[test]
    fn rank_index_picks_highest_reached_bracket() {
        let ranks = ProgressionRules::trivia().ranks;
        assert_eq!(rank_index(&ranks, 0), 0);
        assert_eq!(rank_index(&ranks, 4), 0);
        assert_eq!(rank_index(&ranks, 5), 1);
        assert_eq!(rank_index(&ranks, 28), 4);
        assert_eq!(rank_index(&ranks, 10_000), 4);
    }

    #[test]
    fn stats_rank_follows_total_correct() {
        let rules = ProgressionRules::memory();
        let mut stats = AggregateStats::default();
        let mut advanced = false;
        for _ in 0..7 {
            advanced |= stats.absorb(&result_with(8, 0), &rules);
        }
        assert!(advanced);
        assert_eq!(stats.total_correct, 56);
        assert_eq!(stats.rank, 1);
        assert_eq!(stats.perfect_rounds, 7);
        assert_eq!(stats.rounds_played, 7);
    }

    #[test]
    fn stored_rank_never_regresses() {
        let rules = ProgressionRules::memory();
        let mut stats = AggregateStats {
            rank: 3,
            ..AggregateStats::default()
        };
        let advanced = stats.absorb(&result_with(1, 0), &rules);
        assert!(!advanced);
        assert_eq!(stats.rank, 3);
    }

    #[test]
    fn progress_tolerates_missing_fields() {
        let progress: LevelProgress = serde_json::from_str(r#"{"high_score": 40}"#).unwrap();
        assert_eq!(progress.high_score, 40);
        assert_eq!(progress.stars, 0);
        assert!(!progress.unlocked);
    }
}
