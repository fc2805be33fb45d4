//! Pure scoring functions shared by both games.
//!
//! Nothing here holds state: the round machines feed in what happened and get
//! points back. All arithmetic clamps at zero, so a score can never go negative.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::DifficultyTier;
use crate::rules::{BASE_MULTIPLIER, ScoringRules};

/// Linearly decaying bonus: `max_time_bonus` at zero elapsed, nothing at or
/// beyond the window.
#[must_use]
pub fn time_bonus(rules: &ScoringRules, elapsed: Duration) -> f64 {
    let window = rules.time_bonus_window.as_secs_f64();
    if window <= 0.0 {
        return 0.0;
    }
    let remaining = (1.0 - elapsed.as_secs_f64() / window).clamp(0.0, 1.0);
    f64::from(rules.max_time_bonus) * remaining
}

/// Step function over the combo tiers; `BASE_MULTIPLIER` below the first tier.
#[must_use]
pub fn combo_multiplier(rules: &ScoringRules, streak: u32) -> f64 {
    rules
        .combo_tiers
        .iter()
        .rev()
        .find(|tier| streak >= tier.min_streak)
        .map_or(BASE_MULTIPLIER, |tier| tier.multiplier)
}

/// Points for a single answered item.
///
/// `streak` is the streak length including this answer. A wrong answer scores
/// zero; a hint costs a flat penalty, floored at zero.
#[must_use]
pub fn item_score(
    rules: &ScoringRules,
    correct: bool,
    elapsed: Duration,
    streak: u32,
    tier: DifficultyTier,
    hint_used: bool,
) -> u32 {
    if !correct {
        return 0;
    }
    let raw = (f64::from(rules.base_points) + time_bonus(rules, elapsed))
        * combo_multiplier(rules, streak)
        * tier.multiplier();
    let points = to_points(raw);
    if hint_used {
        points.saturating_sub(rules.hint_penalty)
    } else {
        points
    }
}

/// Percentage of correct items, 0 for an empty round.
#[must_use]
pub fn accuracy(correct: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(attempts) * 100.0
}

/// Star rating (0-3) for an accuracy, using inclusive lower bounds.
#[must_use]
pub fn stars(thresholds: &[f64; 3], accuracy: f64) -> u8 {
    let earned = thresholds.iter().filter(|t| accuracy >= **t).count();
    u8::try_from(earned).unwrap_or(3)
}

/// Speed bonus for an average response time; the slowest tier earns nothing.
#[must_use]
pub fn speed_bonus(rules: &ScoringRules, average_time: Duration) -> u32 {
    rules
        .speed_tiers
        .iter()
        .find(|tier| average_time < tier.under)
        .map_or(0, |tier| tier.bonus)
}

/// Counters a finished round hands to `aggregate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundFigures {
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub highest_streak: u32,
    pub hints_used: u32,
    pub average_time: Duration,
}

impl RoundFigures {
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.correct + self.wrong + self.skipped
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        accuracy(self.correct, self.attempts())
    }

    /// Every item correct, nothing wrong, and at least one item played.
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.attempts() > 0 && self.correct == self.attempts() && self.wrong == 0
    }
}

/// Round score split into the parts the results screen lists separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub item_points: u32,
    pub streak_bonus: u32,
    pub speed_bonus: u32,
    pub perfect_bonus: u32,
    pub no_hint_bonus: u32,
    pub total: u32,
}

/// Sums item points and adds the round bonuses.
///
/// Speed and no-hint bonuses need at least one correct item so that skipping
/// through a round earns nothing.
#[must_use]
pub fn aggregate(rules: &ScoringRules, item_points: &[u32], figures: &RoundFigures) -> ScoreBreakdown {
    if figures.attempts() == 0 {
        return ScoreBreakdown::default();
    }

    let item_points = item_points
        .iter()
        .fold(0_u32, |sum, points| sum.saturating_add(*points));
    let streak_bonus = figures
        .highest_streak
        .saturating_mul(rules.streak_bonus_per_step);
    let earned_anything = figures.correct > 0;
    let speed_bonus = if earned_anything {
        speed_bonus(rules, figures.average_time)
    } else {
        0
    };
    let perfect_bonus = if figures.is_perfect() {
        rules.perfect_bonus
    } else {
        0
    };
    let no_hint_bonus = if earned_anything && figures.hints_used == 0 {
        rules.no_hint_bonus
    } else {
        0
    };

    let total = item_points
        .saturating_add(streak_bonus)
        .saturating_add(speed_bonus)
        .saturating_add(perfect_bonus)
        .saturating_add(no_hint_bonus);

    ScoreBreakdown {
        item_points,
        streak_bonus,
        speed_bonus,
        perfect_bonus,
        no_hint_bonus,
        total,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_points(raw: f64) -> u32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    raw.round().min(f64::from(u32::MAX)) as u32
}
