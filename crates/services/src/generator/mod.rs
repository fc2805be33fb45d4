//! Round content generation. Every generator takes its random source as a
//! parameter so a seeded `StdRng` reproduces a round exactly.

mod pattern;
mod trivia;

pub use pattern::generate_pattern;
pub use trivia::{TRUE_STATEMENT_PROBABILITY, generate_questions};
