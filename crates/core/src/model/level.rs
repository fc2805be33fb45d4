use std::time::Duration;

use thiserror::Error;

use crate::model::challenge::QuestionKind;
use crate::model::ids::{CategoryId, LevelId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level name cannot be empty")]
    EmptyName,

    #[error("question count must be > 0")]
    InvalidQuestionCount,

    #[error("a trivia level must allow at least one question kind")]
    NoQuestionKinds,

    #[error("option count must be >= 2")]
    InvalidOptionCount,

    #[error("time limit must be > 0")]
    InvalidTimeLimit,

    #[error("grid size must be > 0")]
    InvalidGridSize,

    #[error("pattern length {length} must be within 1..={cells}")]
    InvalidPatternLength { length: u32, cells: u32 },

    #[error("reveal interval must be > 0")]
    InvalidRevealInterval,

    #[error("level {0} cannot require itself")]
    SelfRequirement(LevelId),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tier of a level; scales every item score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            DifficultyTier::Easy => 1.0,
            DifficultyTier::Medium => 1.5,
            DifficultyTier::Hard => 2.0,
        }
    }
}

//
// ─── UNLOCK REQUIREMENT ────────────────────────────────────────────────────────
//

/// Gate on a prerequisite level's best score and accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnlockRequirement {
    pub level: LevelId,
    pub min_score: u32,
    /// Percent, compared with `>=`.
    pub min_accuracy: f64,
}

impl UnlockRequirement {
    #[must_use]
    pub fn score(level: LevelId, min_score: u32) -> Self {
        Self {
            level,
            min_score,
            min_accuracy: 0.0,
        }
    }

    #[must_use]
    pub fn with_min_accuracy(mut self, min_accuracy: f64) -> Self {
        self.min_accuracy = min_accuracy;
        self
    }

    /// Whether a score/accuracy pair satisfies this requirement.
    #[must_use]
    pub fn is_met_by(&self, score: u32, accuracy: f64) -> bool {
        score >= self.min_score && accuracy >= self.min_accuracy
    }
}

//
// ─── PARAMETERS ────────────────────────────────────────────────────────────────
//

/// Generation and pacing parameters for a trivia level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaParams {
    pub question_count: u32,
    pub allowed_kinds: Vec<QuestionKind>,
    /// Per-question countdown.
    pub time_limit: Duration,
    /// Desired options per multi-choice question (true/false always has two).
    pub option_count: u32,
}

impl TriviaParams {
    fn check(&self) -> Result<(), LevelError> {
        if self.question_count == 0 {
            return Err(LevelError::InvalidQuestionCount);
        }
        if self.allowed_kinds.is_empty() {
            return Err(LevelError::NoQuestionKinds);
        }
        if self.option_count < 2 {
            return Err(LevelError::InvalidOptionCount);
        }
        if self.time_limit.is_zero() {
            return Err(LevelError::InvalidTimeLimit);
        }
        Ok(())
    }
}

/// Generation and pacing parameters for a memory level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryParams {
    pub grid_size: u32,
    pub pattern_length: u32,
    /// Time each cell stays lit during the reveal phase.
    pub reveal_interval: Duration,
    /// Countdown restarted after every accepted tap.
    pub time_per_cell: Duration,
    /// When set, cells must be tapped in the order they were revealed.
    pub strict_order: bool,
}

impl MemoryParams {
    #[must_use]
    pub fn cell_count(&self) -> u32 {
        self.grid_size.saturating_mul(self.grid_size)
    }

    fn check(&self) -> Result<(), LevelError> {
        if self.grid_size == 0 {
            return Err(LevelError::InvalidGridSize);
        }
        let cells = self.cell_count();
        if self.pattern_length == 0 || self.pattern_length > cells {
            return Err(LevelError::InvalidPatternLength {
                length: self.pattern_length,
                cells,
            });
        }
        if self.reveal_interval.is_zero() {
            return Err(LevelError::InvalidRevealInterval);
        }
        if self.time_per_cell.is_zero() {
            return Err(LevelError::InvalidTimeLimit);
        }
        Ok(())
    }
}

/// Parameter sets a `Level` can carry.
pub trait LevelParams: Clone {
    /// Checks the parameters are playable.
    ///
    /// # Errors
    ///
    /// Returns `LevelError` describing the first invalid field.
    fn validate(&self) -> Result<(), LevelError>;
}

impl LevelParams for TriviaParams {
    fn validate(&self) -> Result<(), LevelError> {
        self.check()
    }
}

impl LevelParams for MemoryParams {
    fn validate(&self) -> Result<(), LevelError> {
        self.check()
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Immutable level configuration.
///
/// A level without an unlock requirement is an entry level and is always
/// playable.
#[derive(Debug, Clone, PartialEq)]
pub struct Level<P> {
    id: LevelId,
    name: String,
    description: String,
    category: CategoryId,
    tier: DifficultyTier,
    unlock: Option<UnlockRequirement>,
    params: P,
}

pub type TriviaLevel = Level<TriviaParams>;
pub type MemoryLevel = Level<MemoryParams>;

impl<P: LevelParams> Level<P> {
    /// Creates a validated level.
    ///
    /// # Errors
    ///
    /// Returns `LevelError` if the name is blank, the level requires itself,
    /// or the parameters are unplayable.
    pub fn new(
        id: LevelId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: CategoryId,
        tier: DifficultyTier,
        unlock: Option<UnlockRequirement>,
        params: P,
    ) -> Result<Self, LevelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LevelError::EmptyName);
        }
        if unlock.is_some_and(|req| req.level == id) {
            return Err(LevelError::SelfRequirement(id));
        }
        params.validate()?;

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            description: description.into().trim().to_owned(),
            category,
            tier,
            unlock,
            params,
        })
    }
}

impl<P> Level<P> {
    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> CategoryId {
        self.category
    }

    #[must_use]
    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    #[must_use]
    pub fn unlock(&self) -> Option<&UnlockRequirement> {
        self.unlock.as_ref()
    }

    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.unlock.is_none()
    }

    #[must_use]
    pub fn params(&self) -> &P {
        &self.params
    }

    /// The slice of this level the progression ledger needs.
    #[must_use]
    pub fn gate(&self) -> LevelGate {
        LevelGate {
            id: self.id,
            category: self.category,
            unlock: self.unlock,
        }
    }
}

/// Unlock-relevant view of a level, independent of its game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelGate {
    pub id: LevelId,
    pub category: CategoryId,
    pub unlock: Option<UnlockRequirement>,
}

impl LevelGate {
    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.unlock.is_none()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
