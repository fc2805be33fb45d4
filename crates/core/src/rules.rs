//! Tuning data for both games.
//!
//! Every number that shapes scoring, round pacing or progression lives here so
//! hosts can load an override from JSON instead of recompiling. Each struct has
//! one preset per game and a `validate` step that rejects configurations the
//! engine cannot honour.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multiplier used whenever no combo tier applies.
pub const BASE_MULTIPLIER: f64 = 1.0;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("time bonus window must be > 0")]
    EmptyTimeBonusWindow,

    #[error("combo tiers must ascend in streak and multiplier (tier {index})")]
    UnorderedComboTiers { index: usize },

    #[error("combo multiplier must be finite and >= 1.0, got {provided}")]
    InvalidComboMultiplier { provided: f64 },

    #[error("speed tiers must ascend in time and descend in bonus (tier {index})")]
    UnorderedSpeedTiers { index: usize },

    #[error("tick interval must be > 0")]
    EmptyTick,

    #[error("star thresholds must ascend within 0..=100")]
    InvalidStarThresholds,

    #[error("completion accuracy must be within 0..=100, got {provided}")]
    InvalidCompletionAccuracy { provided: f64 },

    #[error("rank table must start at 0 and ascend")]
    InvalidRankTable,
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Streak length at which a combo multiplier starts to apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboTier {
    pub min_streak: u32,
    pub multiplier: f64,
}

/// Average response time under which a round earns `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedTier {
    #[serde(with = "millis")]
    pub under: Duration,
    pub bonus: u32,
}

/// Point values and bonus tables for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub base_points: u32,
    pub max_time_bonus: u32,
    /// Elapsed time at which the time bonus reaches zero.
    #[serde(with = "millis")]
    pub time_bonus_window: Duration,
    pub combo_tiers: Vec<ComboTier>,
    pub on_fire_streak: u32,
    pub hint_penalty: u32,
    pub streak_bonus_per_step: u32,
    pub speed_tiers: Vec<SpeedTier>,
    pub perfect_bonus: u32,
    pub no_hint_bonus: u32,
}

impl ScoringRules {
    /// Scoring used by the animal trivia game.
    #[must_use]
    pub fn trivia() -> Self {
        Self {
            base_points: 100,
            max_time_bonus: 50,
            time_bonus_window: Duration::from_secs(10),
            combo_tiers: vec![
                ComboTier { min_streak: 3, multiplier: 1.5 },
                ComboTier { min_streak: 5, multiplier: 2.0 },
                ComboTier { min_streak: 10, multiplier: 3.0 },
            ],
            on_fire_streak: 5,
            hint_penalty: 25,
            streak_bonus_per_step: 10,
            speed_tiers: vec![
                SpeedTier { under: Duration::from_secs(3), bonus: 200 },
                SpeedTier { under: Duration::from_secs(5), bonus: 100 },
                SpeedTier { under: Duration::from_secs(8), bonus: 50 },
            ],
            perfect_bonus: 500,
            no_hint_bonus: 100,
        }
    }

    /// Scoring used by the pattern memory game.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            base_points: 50,
            max_time_bonus: 25,
            time_bonus_window: Duration::from_secs(2),
            combo_tiers: vec![
                ComboTier { min_streak: 3, multiplier: 1.5 },
                ComboTier { min_streak: 6, multiplier: 2.0 },
                ComboTier { min_streak: 9, multiplier: 2.5 },
            ],
            on_fire_streak: 6,
            hint_penalty: 20,
            streak_bonus_per_step: 5,
            speed_tiers: vec![
                SpeedTier { under: Duration::from_millis(800), bonus: 150 },
                SpeedTier { under: Duration::from_millis(1500), bonus: 75 },
            ],
            perfect_bonus: 300,
            no_hint_bonus: 50,
        }
    }

    /// Checks the tier tables.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if a table is out of order or the time bonus window is empty.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.time_bonus_window.is_zero() {
            return Err(RulesError::EmptyTimeBonusWindow);
        }

        let mut last: Option<ComboTier> = None;
        for (index, tier) in self.combo_tiers.iter().enumerate() {
            if !tier.multiplier.is_finite() || tier.multiplier < BASE_MULTIPLIER {
                return Err(RulesError::InvalidComboMultiplier {
                    provided: tier.multiplier,
                });
            }
            if let Some(prev) = last {
                if tier.min_streak <= prev.min_streak || tier.multiplier <= prev.multiplier {
                    return Err(RulesError::UnorderedComboTiers { index });
                }
            }
            last = Some(*tier);
        }

        for (index, pair) in self.speed_tiers.windows(2).enumerate() {
            if pair[1].under <= pair[0].under || pair[1].bonus >= pair[0].bonus {
                return Err(RulesError::UnorderedSpeedTiers { index: index + 1 });
            }
        }

        Ok(())
    }
}

//
// ─── ROUND TIMING ──────────────────────────────────────────────────────────────
//

/// Pacing shared by the round state machines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundTiming {
    /// Number of ticks shown before play starts.
    pub countdown_ticks: u32,
    #[serde(with = "millis")]
    pub tick: Duration,
    /// How long an answered trivia question stays on screen before advancing.
    #[serde(with = "millis")]
    pub feedback_delay: Duration,
    /// Wrong taps allowed in a memory round; one more fails the round.
    pub mistake_tolerance: u32,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            countdown_ticks: 3,
            tick: Duration::from_secs(1),
            feedback_delay: Duration::from_millis(1500),
            mistake_tolerance: 2,
        }
    }
}

impl RoundTiming {
    /// # Errors
    ///
    /// Returns `RulesError::EmptyTick` when the tick interval is zero.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.tick.is_zero() {
            return Err(RulesError::EmptyTick);
        }
        Ok(())
    }
}

//
// ─── PROGRESSION ───────────────────────────────────────────────────────────────
//

/// What cumulative count drives the aggregate rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBasis {
    /// Distinct entities ever answered correctly.
    DistinctLearned,
    /// Total correct items across all rounds.
    TotalCorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBracket {
    pub min_count: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRules {
    /// Accuracy (percent) a round needs to count as a completion.
    pub completion_accuracy: f64,
    /// Accuracy thresholds for one, two and three stars.
    pub star_thresholds: [f64; 3],
    pub rank_basis: RankBasis,
    pub ranks: Vec<RankBracket>,
}

fn brackets(table: &[(u32, &str)]) -> Vec<RankBracket> {
    table
        .iter()
        .map(|(min_count, title)| RankBracket {
            min_count: *min_count,
            title: (*title).to_owned(),
        })
        .collect()
}

impl ProgressionRules {
    #[must_use]
    pub fn trivia() -> Self {
        Self {
            completion_accuracy: 70.0,
            star_thresholds: [50.0, 75.0, 90.0],
            rank_basis: RankBasis::DistinctLearned,
            ranks: brackets(&[
                (0, "Hatchling"),
                (5, "Explorer"),
                (12, "Ranger"),
                (20, "Zoologist"),
                (28, "Wildlife Legend"),
            ]),
        }
    }

    #[must_use]
    pub fn memory() -> Self {
        Self {
            completion_accuracy: 70.0,
            star_thresholds: [50.0, 75.0, 90.0],
            rank_basis: RankBasis::TotalCorrect,
            ranks: brackets(&[
                (0, "Novice"),
                (50, "Apprentice"),
                (150, "Adept"),
                (400, "Savant"),
                (1000, "Mastermind"),
            ]),
        }
    }

    /// # Errors
    ///
    /// Returns `RulesError` if thresholds or the rank table are malformed.
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(0.0..=100.0).contains(&self.completion_accuracy) {
            return Err(RulesError::InvalidCompletionAccuracy {
                provided: self.completion_accuracy,
            });
        }
        let [one, two, three] = self.star_thresholds;
        if !(0.0 < one && one < two && two < three && three <= 100.0) {
            return Err(RulesError::InvalidStarThresholds);
        }
        match self.ranks.first() {
            Some(first) if first.min_count == 0 => {}
            _ => return Err(RulesError::InvalidRankTable),
        }
        if self
            .ranks
            .windows(2)
            .any(|pair| pair[1].min_count <= pair[0].min_count)
        {
            return Err(RulesError::InvalidRankTable);
        }
        Ok(())
    }
}

/// Serialises a `Duration` as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        ScoringRules::trivia().validate().unwrap();
        ScoringRules::memory().validate().unwrap();
        RoundTiming::default().validate().unwrap();
        ProgressionRules::trivia().validate().unwrap();
        ProgressionRules::memory().validate().unwrap();
    }

    #[test]
    fn combo_tiers_must_ascend() {
        let mut rules = ScoringRules::trivia();
        rules.combo_tiers.swap(0, 1);
        assert_eq!(
            rules.validate().unwrap_err(),
            RulesError::UnorderedComboTiers { index: 1 }
        );
    }

    #[test]
    fn combo_multiplier_below_base_is_rejected() {
        let mut rules = ScoringRules::memory();
        rules.combo_tiers[0].multiplier = 0.5;
        assert!(matches!(
            rules.validate().unwrap_err(),
            RulesError::InvalidComboMultiplier { .. }
        ));
    }

    #[test]
    fn speed_tiers_must_descend_in_bonus() {
        let mut rules = ScoringRules::trivia();
        rules.speed_tiers[1].bonus = 500;
        assert_eq!(
            rules.validate().unwrap_err(),
            RulesError::UnorderedSpeedTiers { index: 1 }
        );
    }

    #[test]
    fn star_thresholds_must_ascend() {
        let mut rules = ProgressionRules::trivia();
        rules.star_thresholds = [80.0, 75.0, 90.0];
        assert_eq!(
            rules.validate().unwrap_err(),
            RulesError::InvalidStarThresholds
        );
    }

    #[test]
    fn rank_table_must_start_at_zero() {
        let mut rules = ProgressionRules::memory();
        rules.ranks.remove(0);
        assert_eq!(rules.validate().unwrap_err(), RulesError::InvalidRankTable);
    }

    #[test]
    fn scoring_rules_load_from_json_with_millis() {
        let json = serde_json::to_string(&ScoringRules::memory()).unwrap();
        assert!(json.contains("\"time_bonus_window\":2000"));
        let parsed: ScoringRules = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ScoringRules::memory());
    }
}
