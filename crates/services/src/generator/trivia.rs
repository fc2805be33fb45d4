//! Builds trivia rounds from the animal reference table.

use std::collections::HashSet;

use arcade_core::catalog::animals::{Animal, ConservationStatus, Diet, Habitat, animals_in};
use arcade_core::model::{AnswerOption, Question, QuestionKind, TriviaLevel};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Chance that a true/false question states a real fact.
pub const TRUE_STATEMENT_PROBABILITY: f64 = 0.6;

/// Classification questions never offer more than this many choices.
const MAX_CLASSIFICATION_OPTIONS: usize = 3;

/// Generates the questions for one trivia round.
///
/// Shape is fixed by the level (count and allowed kinds); content comes from
/// `rng`. A category with too few animals or values yields questions with
/// fewer options rather than an error.
pub fn generate_questions<R: Rng + ?Sized>(level: &TriviaLevel, rng: &mut R) -> Vec<Question> {
    let params = level.params();
    let pool: Vec<&'static Animal> = animals_in(level.category()).collect();
    if pool.is_empty() {
        tracing::warn!(level = %level.id(), category = %level.category(), "no animals for category");
        return Vec::new();
    }

    let option_count = usize::try_from(params.option_count).unwrap_or(usize::MAX);
    let mut questions = Vec::with_capacity(pool.len());
    for _ in 0..params.question_count {
        let (Some(&kind), Some(&subject)) = (params.allowed_kinds.choose(rng), pool.choose(rng))
        else {
            break;
        };
        let question = match kind {
            QuestionKind::Identify => identify(subject, &pool, option_count, rng),
            QuestionKind::Habitat => habitat(subject, option_count, rng),
            QuestionKind::TrueFalse => true_false(subject, rng),
            QuestionKind::Classification => classification(subject, option_count, rng),
        };
        questions.push(question);
    }
    questions.shuffle(rng);
    questions
}

//
// ─── QUESTION KINDS ────────────────────────────────────────────────────────────
//

fn identify<R: Rng + ?Sized>(
    subject: &Animal,
    pool: &[&'static Animal],
    option_count: usize,
    rng: &mut R,
) -> Question {
    let fact = subject.facts.choose(rng).copied().unwrap_or(subject.clue);
    let others: Vec<&Animal> = pool
        .iter()
        .copied()
        .filter(|a| a.id != subject.id)
        .collect();

    let mut options = vec![AnswerOption::new(subject.id.as_str(), subject.name, true)];
    options.extend(
        others
            .choose_multiple(rng, option_count.saturating_sub(1))
            .map(|a| AnswerOption::new(a.id.as_str(), a.name, false)),
    );

    Question {
        kind: QuestionKind::Identify,
        subject: subject.id,
        prompt: format!("Which animal {fact}?"),
        options: finish_options(options, rng),
        hint: Some(subject.clue.to_owned()),
        explanation: format!("The {} {fact}.", subject.name),
    }
}

fn habitat<R: Rng + ?Sized>(subject: &Animal, option_count: usize, rng: &mut R) -> Question {
    let others: Vec<Habitat> = Habitat::ALL
        .into_iter()
        .filter(|h| *h != subject.habitat)
        .collect();

    let mut options = vec![AnswerOption::new(
        subject.habitat.slug(),
        subject.habitat.label(),
        true,
    )];
    options.extend(
        others
            .choose_multiple(rng, option_count.saturating_sub(1))
            .map(|h| AnswerOption::new(h.slug(), h.label(), false)),
    );

    Question {
        kind: QuestionKind::Habitat,
        subject: subject.id,
        prompt: format!("Where does the {} live?", subject.name),
        options: finish_options(options, rng),
        hint: Some(subject.clue.to_owned()),
        explanation: format!(
            "The {} lives in the {}.",
            subject.name,
            subject.habitat.label().to_lowercase()
        ),
    }
}

/// Attribute a false statement contradicts.
#[derive(Debug, Clone, Copy)]
enum Contradiction {
    Habitat,
    Diet,
    Flight,
    Nocturnal,
}

const CONTRADICTIONS: [Contradiction; 4] = [
    Contradiction::Habitat,
    Contradiction::Diet,
    Contradiction::Flight,
    Contradiction::Nocturnal,
];

fn true_false<R: Rng + ?Sized>(subject: &Animal, rng: &mut R) -> Question {
    let real_fact = subject.facts.choose(rng).copied();
    let (statement, is_true, explanation) = match real_fact {
        Some(fact) if rng.random_bool(TRUE_STATEMENT_PROBABILITY) => {
            let statement = format!("The {} {fact}.", subject.name);
            let explanation = format!("True: the {} {fact}.", subject.name);
            (statement, true, explanation)
        }
        _ => {
            let (statement, correction) = false_statement(subject, rng);
            (statement, false, format!("False: {correction}"))
        }
    };

    let options = vec![
        AnswerOption::new("true", "True", is_true),
        AnswerOption::new("false", "False", !is_true),
    ];

    Question {
        kind: QuestionKind::TrueFalse,
        subject: subject.id,
        prompt: format!("True or false: {statement}"),
        options: finish_options(options, rng),
        hint: Some(subject.clue.to_owned()),
        explanation,
    }
}

/// Returns `(statement, correction)`. The statement always swaps in a value
/// different from the animal's own, so it can never be true.
fn false_statement<R: Rng + ?Sized>(subject: &Animal, rng: &mut R) -> (String, String) {
    let name = subject.name;
    let contradiction = CONTRADICTIONS
        .choose(rng)
        .copied()
        .unwrap_or(Contradiction::Flight);

    match contradiction {
        Contradiction::Habitat => {
            let wrong = Habitat::ALL
                .into_iter()
                .filter(|h| *h != subject.habitat)
                .collect::<Vec<_>>();
            match wrong.choose(rng) {
                Some(habitat) => (
                    format!("The {name} naturally lives in the {}.", habitat.label().to_lowercase()),
                    format!("the {name} lives in the {}.", subject.habitat.label().to_lowercase()),
                ),
                None => flight_statement(subject),
            }
        }
        Contradiction::Diet => {
            let wrong = Diet::ALL
                .into_iter()
                .filter(|d| *d != subject.diet)
                .collect::<Vec<_>>();
            match wrong.choose(rng) {
                Some(diet) => (
                    format!("The {name} is a {}.", diet.slug()),
                    format!("the {name} is a {}.", subject.diet.slug()),
                ),
                None => flight_statement(subject),
            }
        }
        Contradiction::Flight => flight_statement(subject),
        Contradiction::Nocturnal => {
            if subject.nocturnal {
                (
                    format!("The {name} sleeps at night and is active during the day."),
                    format!("the {name} is mostly active at night."),
                )
            } else {
                (
                    format!("The {name} is mostly active at night."),
                    format!("the {name} is active during the day."),
                )
            }
        }
    }
}

fn flight_statement(subject: &Animal) -> (String, String) {
    let name = subject.name;
    if subject.can_fly {
        (
            format!("The {name} cannot fly."),
            format!("the {name} can fly."),
        )
    } else {
        (
            format!("The {name} can fly."),
            format!("the {name} cannot fly."),
        )
    }
}

/// Categorical attribute a classification question asks about.
#[derive(Debug, Clone, Copy)]
enum Attribute {
    Diet,
    Status(ConservationStatus),
    Flight,
    Nocturnal,
}

fn classification<R: Rng + ?Sized>(subject: &Animal, option_count: usize, rng: &mut R) -> Question {
    let mut applicable = vec![Attribute::Diet, Attribute::Flight, Attribute::Nocturnal];
    if let Some(status) = subject.status {
        applicable.push(Attribute::Status(status));
    }
    // Uniform over whatever applies to this animal.
    let attribute = applicable.choose(rng).copied().unwrap_or(Attribute::Diet);
    let limit = option_count.clamp(2, MAX_CLASSIFICATION_OPTIONS);
    let name = subject.name;

    let (prompt, options, explanation) = match attribute {
        Attribute::Diet => {
            let mut options = vec![AnswerOption::new(
                format!("diet:{}", subject.diet.slug()),
                subject.diet.label(),
                true,
            )];
            let others: Vec<Diet> = Diet::ALL.into_iter().filter(|d| *d != subject.diet).collect();
            options.extend(
                others
                    .choose_multiple(rng, limit - 1)
                    .map(|d| AnswerOption::new(format!("diet:{}", d.slug()), d.label(), false)),
            );
            (
                format!("What kind of eater is the {name}?"),
                options,
                format!("The {name} is a {}.", subject.diet.slug()),
            )
        }
        Attribute::Status(status) => {
            let mut options = vec![AnswerOption::new(
                format!("status:{}", status.slug()),
                status.label(),
                true,
            )];
            let others: Vec<ConservationStatus> = ConservationStatus::ALL
                .into_iter()
                .filter(|s| *s != status)
                .collect();
            options.extend(
                others
                    .choose_multiple(rng, limit - 1)
                    .map(|s| AnswerOption::new(format!("status:{}", s.slug()), s.label(), false)),
            );
            (
                format!("What is the conservation status of the {name}?"),
                options,
                format!("The {name} is listed as {}.", status.label().to_lowercase()),
            )
        }
        Attribute::Flight => (
            format!("Can the {name} fly?"),
            yes_no(subject.can_fly),
            if subject.can_fly {
                format!("Yes, the {name} can fly.")
            } else {
                format!("No, the {name} cannot fly.")
            },
        ),
        Attribute::Nocturnal => (
            format!("Is the {name} mostly active at night?"),
            yes_no(subject.nocturnal),
            if subject.nocturnal {
                format!("Yes, the {name} is nocturnal.")
            } else {
                format!("No, the {name} is active during the day.")
            },
        ),
    };

    Question {
        kind: QuestionKind::Classification,
        subject: subject.id,
        prompt,
        options: finish_options(options, rng),
        hint: Some(subject.clue.to_owned()),
        explanation,
    }
}

fn yes_no(answer: bool) -> Vec<AnswerOption> {
    vec![
        AnswerOption::new("yes", "Yes", answer),
        AnswerOption::new("no", "No", !answer),
    ]
}

/// Drops repeated ids (first wins) and shuffles.
fn finish_options<R: Rng + ?Sized>(mut options: Vec<AnswerOption>, rng: &mut R) -> Vec<AnswerOption> {
    let mut seen = HashSet::with_capacity(options.len());
    options.retain(|o| seen.insert(o.id.clone()));
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::catalog::animals::{ANIMALS, MAMMALS};
    use arcade_core::catalog::trivia_catalog;
    use arcade_core::model::{DifficultyTier, Level, LevelId, TriviaParams};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn level(kinds: Vec<QuestionKind>, count: u32, options: u32) -> TriviaLevel {
        Level::new(
            LevelId::new(1),
            "Test",
            "",
            MAMMALS,
            DifficultyTier::Easy,
            None,
            TriviaParams {
                question_count: count,
                allowed_kinds: kinds,
                time_limit: Duration::from_secs(10),
                option_count: options,
            },
        )
        .unwrap()
    }

    #[test]
    fn every_question_in_the_catalog_is_well_formed() {
        let catalog = trivia_catalog().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            for level in catalog.levels() {
                let questions = generate_questions(level, &mut rng);
                assert_eq!(questions.len(), level.params().question_count as usize);
                for q in &questions {
                    assert!(q.is_well_formed(), "{q:?}");
                    assert!(level.params().allowed_kinds.contains(&q.kind));
                }
            }
        }
    }

    #[test]
    fn same_seed_same_round() {
        let level = level(QuestionKind::ALL.to_vec(), 8, 4);
        let a = generate_questions(&level, &mut StdRng::seed_from_u64(42));
        let b = generate_questions(&level, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_option_count_degrades_to_what_exists() {
        let level = level(vec![QuestionKind::Identify], 5, 50);
        let pool = animals_in(MAMMALS).count();
        let mut rng = StdRng::seed_from_u64(3);
        for q in generate_questions(&level, &mut rng) {
            assert_eq!(q.options.len(), pool);
            assert!(q.is_well_formed());
        }
    }

    #[test]
    fn identify_options_are_animal_ids() {
        let level = level(vec![QuestionKind::Identify], 6, 4);
        let mut rng = StdRng::seed_from_u64(11);
        for q in generate_questions(&level, &mut rng) {
            assert_eq!(q.options.len(), 4);
            let correct = q.correct_option().unwrap();
            assert_eq!(correct.id, q.subject.as_str());
            let subject = ANIMALS.iter().find(|a| a.id == q.subject).unwrap();
            assert!(!q.prompt.contains(subject.name));
        }
    }

    #[test]
    fn false_statements_never_match_the_animal() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut about_nights = 0;
        for animal in ANIMALS {
            for _ in 0..20 {
                let (statement, _) = false_statement(animal, &mut rng);
                let habitat = format!("in the {}.", animal.habitat.label().to_lowercase());
                let diet = format!("is a {}.", animal.diet.slug());
                assert!(!statement.ends_with(&habitat), "{statement}");
                assert!(!statement.ends_with(&diet), "{statement}");
                if animal.can_fly {
                    assert!(!statement.ends_with("can fly."), "{statement}");
                } else {
                    assert!(!statement.ends_with("cannot fly."), "{statement}");
                }
                if animal.nocturnal {
                    assert!(!statement.ends_with("is mostly active at night."), "{statement}");
                } else {
                    assert!(
                        !statement.ends_with("sleeps at night and is active during the day."),
                        "{statement}"
                    );
                }
                if statement.contains("at night") {
                    about_nights += 1;
                }
            }
        }
        assert!(about_nights > 0);
    }

    #[test]
    fn true_false_leans_towards_true() {
        let level = level(vec![QuestionKind::TrueFalse], 400, 2);
        let mut rng = StdRng::seed_from_u64(5);
        let questions = generate_questions(&level, &mut rng);
        let truths = questions
            .iter()
            .filter(|q| q.correct_option().is_some_and(|o| o.id == "true"))
            .count();
        assert!((200..=280).contains(&truths), "{truths} of 400 were true");
    }

    #[test]
    fn classification_uses_two_or_three_options() {
        let level = level(vec![QuestionKind::Classification], 60, 4);
        let mut rng = StdRng::seed_from_u64(8);
        for q in generate_questions(&level, &mut rng) {
            assert!((2..=3).contains(&q.options.len()), "{q:?}");
            assert!(q.is_well_formed());
        }
    }
}
