use std::time::Duration;

use crate::catalog::{Catalog, CatalogError, Category, MemoryCatalog};
use crate::model::{CategoryId, DifficultyTier, Level, LevelId, MemoryParams, UnlockRequirement};

pub const WARM_UP: CategoryId = CategoryId::new("warm-up");
pub const CLASSIC: CategoryId = CategoryId::new("classic");
pub const EXPERT: CategoryId = CategoryId::new("expert");

struct Row {
    id: u32,
    name: &'static str,
    category: CategoryId,
    tier: DifficultyTier,
    grid_size: u32,
    pattern_length: u32,
    reveal_ms: u64,
    per_cell_ms: u64,
    strict_order: bool,
    /// `(prerequisite, min_score)`
    requires: Option<(u32, u32)>,
}

#[rustfmt::skip]
const ROWS: [Row; 9] = [
    Row { id: 1, name: "Warm-up I",   category: WARM_UP, tier: DifficultyTier::Easy,   grid_size: 3, pattern_length: 3,  reveal_ms: 800, per_cell_ms: 4_000, strict_order: false, requires: None },
    Row { id: 2, name: "Warm-up II",  category: WARM_UP, tier: DifficultyTier::Easy,   grid_size: 3, pattern_length: 4,  reveal_ms: 700, per_cell_ms: 3_500, strict_order: false, requires: Some((1, 250)) },
    Row { id: 3, name: "Warm-up III", category: WARM_UP, tier: DifficultyTier::Medium, grid_size: 3, pattern_length: 5,  reveal_ms: 600, per_cell_ms: 3_000, strict_order: false, requires: Some((2, 350)) },
    Row { id: 4, name: "Classic I",   category: CLASSIC, tier: DifficultyTier::Easy,   grid_size: 4, pattern_length: 5,  reveal_ms: 700, per_cell_ms: 3_500, strict_order: false, requires: None },
    Row { id: 5, name: "Classic II",  category: CLASSIC, tier: DifficultyTier::Medium, grid_size: 4, pattern_length: 6,  reveal_ms: 600, per_cell_ms: 3_000, strict_order: false, requires: Some((4, 450)) },
    Row { id: 6, name: "Classic III", category: CLASSIC, tier: DifficultyTier::Medium, grid_size: 4, pattern_length: 7,  reveal_ms: 500, per_cell_ms: 3_000, strict_order: true,  requires: Some((5, 700)) },
    Row { id: 7, name: "Expert I",    category: EXPERT,  tier: DifficultyTier::Medium, grid_size: 5, pattern_length: 7,  reveal_ms: 550, per_cell_ms: 3_000, strict_order: false, requires: None },
    Row { id: 8, name: "Expert II",   category: EXPERT,  tier: DifficultyTier::Hard,   grid_size: 5, pattern_length: 8,  reveal_ms: 450, per_cell_ms: 2_500, strict_order: false, requires: Some((7, 1100)) },
    Row { id: 9, name: "Expert III",  category: EXPERT,  tier: DifficultyTier::Hard,   grid_size: 5, pattern_length: 10, reveal_ms: 400, per_cell_ms: 2_500, strict_order: true,  requires: Some((8, 1500)) },
];

const CATEGORIES: [Category; 3] = [
    Category {
        id: WARM_UP,
        name: "Warm-up",
        description: "Small 3x3 boards to get going.",
    },
    Category {
        id: CLASSIC,
        name: "Classic",
        description: "The standard 4x4 board.",
    },
    Category {
        id: EXPERT,
        name: "Expert",
        description: "Wide 5x5 boards and long patterns.",
    },
];

/// Builds the pattern memory catalog.
///
/// # Errors
///
/// Returns `CatalogError` if a level definition is invalid.
pub fn memory_catalog() -> Result<MemoryCatalog, CatalogError> {
    let levels = ROWS
        .iter()
        .map(|row| {
            let description = if row.strict_order {
                format!("Repeat {} cells in the order they lit up.", row.pattern_length)
            } else {
                format!("Remember {} cells on a {}x{} grid.", row.pattern_length, row.grid_size, row.grid_size)
            };
            Level::new(
                LevelId::new(row.id),
                row.name,
                description,
                row.category,
                row.tier,
                row.requires
                    .map(|(level, score)| UnlockRequirement::score(LevelId::new(level), score)),
                MemoryParams {
                    grid_size: row.grid_size,
                    pattern_length: row.pattern_length,
                    reveal_interval: Duration::from_millis(row.reveal_ms),
                    time_per_cell: Duration::from_millis(row.per_cell_ms),
                    strict_order: row.strict_order,
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::new(CATEGORIES.to_vec(), levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_fits_its_grid() {
        let catalog = memory_catalog().unwrap();
        assert_eq!(catalog.levels().len(), 9);
        for level in catalog.levels() {
            let params = level.params();
            assert!(params.pattern_length <= params.cell_count());
        }
    }

    #[test]
    fn first_level_of_each_grouping_is_entry() {
        let catalog = memory_catalog().unwrap();
        let entries: Vec<_> = catalog.levels().iter().filter(|l| l.is_entry()).map(Level::id).collect();
        assert_eq!(entries, vec![LevelId::new(1), LevelId::new(4), LevelId::new(7)]);
    }

    #[test]
    fn strict_order_levels_close_each_harder_grouping() {
        let catalog = memory_catalog().unwrap();
        let strict: Vec<_> = catalog
            .levels()
            .iter()
            .filter(|l| l.params().strict_order)
            .map(Level::id)
            .collect();
        assert_eq!(strict, vec![LevelId::new(6), LevelId::new(9)]);
    }
}
