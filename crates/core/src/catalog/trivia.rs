use std::time::Duration;

use crate::catalog::animals::{BIRDS, MAMMALS, OCEAN, REPTILES};
use crate::catalog::{Catalog, CatalogError, Category, TriviaCatalog};
use crate::model::{
    CategoryId, DifficultyTier, Level, LevelId, QuestionKind, TriviaParams, UnlockRequirement,
};

const CATEGORIES: [Category; 4] = [
    Category {
        id: MAMMALS,
        name: "Mammals",
        description: "Fur, whiskers and warm blood.",
    },
    Category {
        id: BIRDS,
        name: "Birds",
        description: "Feathers, beaks and a lot of eggs.",
    },
    Category {
        id: REPTILES,
        name: "Reptiles & Amphibians",
        description: "Scales, slime and sunbathing.",
    },
    Category {
        id: OCEAN,
        name: "Ocean Life",
        description: "Everything that swims below the waves.",
    },
];

/// Builds the trivia catalog: three levels per category, ids numbered
/// consecutively in category order.
///
/// # Errors
///
/// Returns `CatalogError` if a level definition is invalid.
pub fn trivia_catalog() -> Result<TriviaCatalog, CatalogError> {
    let mut levels = Vec::with_capacity(CATEGORIES.len() * 3);
    for (index, category) in CATEGORIES.iter().enumerate() {
        let first = u32::try_from(index).unwrap_or(u32::MAX) * 3 + 1;
        levels.extend(category_levels(first, category)?);
    }
    Catalog::new(CATEGORIES.to_vec(), levels)
}

fn category_levels(
    first: u32,
    category: &Category,
) -> Result<[Level<TriviaParams>; 3], CatalogError> {
    let id = |offset: u32| LevelId::new(first + offset);
    let cat: CategoryId = category.id;

    let starter = Level::new(
        id(0),
        format!("{}: First Steps", category.name),
        "Name the animal and spot the real facts.",
        cat,
        DifficultyTier::Easy,
        None,
        TriviaParams {
            question_count: 6,
            allowed_kinds: vec![QuestionKind::Identify, QuestionKind::TrueFalse],
            time_limit: Duration::from_secs(20),
            option_count: 3,
        },
    )?;

    let field_guide = Level::new(
        id(1),
        format!("{}: Field Guide", category.name),
        "Habitats and diets join the mix.",
        cat,
        DifficultyTier::Medium,
        Some(UnlockRequirement::score(id(0), 600)),
        TriviaParams {
            question_count: 8,
            allowed_kinds: QuestionKind::ALL.to_vec(),
            time_limit: Duration::from_secs(15),
            option_count: 4,
        },
    )?;

    let expert = Level::new(
        id(2),
        format!("{}: Expert", category.name),
        "Less time, more questions.",
        cat,
        DifficultyTier::Hard,
        Some(UnlockRequirement::score(id(1), 1200).with_min_accuracy(70.0)),
        TriviaParams {
            question_count: 10,
            allowed_kinds: QuestionKind::ALL.to_vec(),
            time_limit: Duration::from_secs(10),
            option_count: 4,
        },
    )?;

    Ok([starter, field_guide, expert])
}
