//! Static level catalogs and reference data.

pub mod animals;
mod memory;
mod trivia;

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{CategoryId, Level, LevelError, LevelGate, LevelId, MemoryParams, TriviaParams};

pub use memory::{CLASSIC, EXPERT, WARM_UP, memory_catalog};
pub use trivia::trivia_catalog;

pub type TriviaCatalog = Catalog<TriviaParams>;
pub type MemoryCatalog = Catalog<MemoryParams>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error("level {0} is defined twice")]
    DuplicateLevel(LevelId),

    #[error("level {level} belongs to unknown category {category}")]
    UnknownCategory { level: LevelId, category: CategoryId },

    #[error("level {level} requires unknown level {requires}")]
    UnknownPrerequisite { level: LevelId, requires: LevelId },
}

/// A top-level grouping of levels (animal category or grid family).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: &'static str,
    pub description: &'static str,
}

/// Ordered, validated set of levels for one game.
///
/// Level order within a category is play order: the first level of each
/// category is its entry level and `successor` walks forward from there.
#[derive(Debug, Clone)]
pub struct Catalog<P> {
    categories: Vec<Category>,
    levels: Vec<Level<P>>,
}

impl<P> Catalog<P> {
    /// # Errors
    ///
    /// Returns `CatalogError` on duplicate level ids, levels in unknown
    /// categories, or requirements that point outside the catalog.
    pub fn new(categories: Vec<Category>, levels: Vec<Level<P>>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for level in &levels {
            if !seen.insert(level.id()) {
                return Err(CatalogError::DuplicateLevel(level.id()));
            }
            if !categories.iter().any(|c| c.id == level.category()) {
                return Err(CatalogError::UnknownCategory {
                    level: level.id(),
                    category: level.category(),
                });
            }
        }
        for level in &levels {
            if let Some(req) = level.unlock().filter(|req| !seen.contains(&req.level)) {
                return Err(CatalogError::UnknownPrerequisite {
                    level: level.id(),
                    requires: req.level,
                });
            }
        }
        Ok(Self { categories, levels })
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn levels(&self) -> &[Level<P>] {
        &self.levels
    }

    #[must_use]
    pub fn level(&self, id: LevelId) -> Option<&Level<P>> {
        self.levels.iter().find(|l| l.id() == id)
    }

    pub fn levels_in(&self, category: CategoryId) -> impl Iterator<Item = &Level<P>> {
        self.levels.iter().filter(move |l| l.category() == category)
    }

    /// The level after `id` in the same category, if any.
    #[must_use]
    pub fn successor(&self, id: LevelId) -> Option<&Level<P>> {
        let current = self.level(id)?;
        self.levels_in(current.category())
            .skip_while(|l| l.id() != id)
            .nth(1)
    }

    /// Unlock view of every level, in catalog order.
    #[must_use]
    pub fn gates(&self) -> Vec<LevelGate> {
        self.levels.iter().map(Level::gate).collect()
    }
}
