#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod ledger;
pub mod rounds;
pub mod session;

pub use arcade_core::Clock;

pub use error::{LedgerError, SessionError};
pub use ledger::{MEMORY_PROGRESS_KEY, ProgressLedger, RecordOutcome, TRIVIA_PROGRESS_KEY};
pub use rounds::{
    AnswerFeedback, MemoryRound, MemorySnapshot, Phase, QuestionView, RoundMachine, RoundStatus,
    TriviaRound, TriviaSnapshot,
};
pub use session::GameSession;
