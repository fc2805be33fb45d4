use std::collections::HashSet;

use crate::model::ids::AnimalId;

//
// ─── TRIVIA ────────────────────────────────────────────────────────────────────
//

/// Shape of a trivia question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    /// Name the animal a fact describes.
    Identify,
    /// Pick the animal's habitat.
    Habitat,
    /// Decide whether a statement is true.
    TrueFalse,
    /// Pick the value of one categorical attribute (diet, status, abilities).
    Classification,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 4] = [
        QuestionKind::Identify,
        QuestionKind::Habitat,
        QuestionKind::TrueFalse,
        QuestionKind::Classification,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub id: String,
    pub label: String,
    pub is_correct: bool,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            is_correct,
        }
    }
}

/// One generated trivia question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub kind: QuestionKind,
    pub subject: AnimalId,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub hint: Option<String>,
    /// Shown once the question has been answered.
    pub explanation: String,
}

impl Question {
    /// The option flagged correct, if the question is well formed.
    #[must_use]
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.is_correct)
    }

    #[must_use]
    pub fn option(&self, id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id == id)
    }

    /// Exactly one correct option and pairwise distinct option ids.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let correct = self.options.iter().filter(|o| o.is_correct).count();
        let mut seen = HashSet::with_capacity(self.options.len());
        let distinct = self.options.iter().all(|o| seen.insert(o.id.as_str()));
        correct == 1 && distinct
    }
}

//
// ─── MEMORY ────────────────────────────────────────────────────────────────────
//

/// Row-major index of a cell on a square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex(u32);

impl CellIndex {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn from_coords(row: u32, col: u32, size: u32) -> Self {
        Self(row * size + col)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// `(row, col)` on a grid of the given size.
    #[must_use]
    pub fn coords(&self, size: u32) -> (u32, u32) {
        (self.0 / size, self.0 % size)
    }
}

/// The ordered cells a memory round reveals and then asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    size: u32,
    cells: Vec<CellIndex>,
}

impl Pattern {
    /// Wraps generated cells. Callers guarantee uniqueness and bounds;
    /// `is_well_formed` checks both.
    #[must_use]
    pub fn new(size: u32, cells: Vec<CellIndex>) -> Self {
        Self { size, cells }
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn cells(&self) -> &[CellIndex] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn contains(&self, cell: CellIndex) -> bool {
        self.cells.contains(&cell)
    }

    /// Position of a cell in reveal order.
    #[must_use]
    pub fn position(&self, cell: CellIndex) -> Option<usize> {
        self.cells.iter().position(|c| *c == cell)
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let bound = self.size.saturating_mul(self.size);
        let mut seen = HashSet::with_capacity(self.cells.len());
        self.cells
            .iter()
            .all(|cell| cell.value() < bound && seen.insert(*cell))
    }
}
