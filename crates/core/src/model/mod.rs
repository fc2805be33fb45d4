mod challenge;
mod combo;
mod ids;
mod level;
mod progress;
mod result;

pub use challenge::{AnswerOption, CellIndex, Pattern, Question, QuestionKind};
pub use combo::ComboState;
pub use ids::{AnimalId, CategoryId, LevelId, ParseIdError, RoundId};
pub use level::{
    DifficultyTier, Level, LevelError, LevelGate, LevelParams, MemoryLevel, MemoryParams,
    TriviaLevel, TriviaParams, UnlockRequirement,
};
pub use progress::{AggregateStats, LevelProgress, rank_index};
pub use result::{ItemOutcome, ItemRecord, RoundOutcome, RoundResult, RoundTally};
