//! Animal reference data behind the trivia game.
//!
//! Facts are written as predicates without the animal's name ("lives in ...")
//! so they can be dropped into both identify prompts and true/false statements.

use crate::model::{AnimalId, CategoryId};

pub const MAMMALS: CategoryId = CategoryId::new("mammals");
pub const BIRDS: CategoryId = CategoryId::new("birds");
pub const REPTILES: CategoryId = CategoryId::new("reptiles");
pub const OCEAN: CategoryId = CategoryId::new("ocean");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Habitat {
    Savanna,
    Rainforest,
    Ocean,
    Desert,
    Arctic,
    Forest,
    Wetland,
    Mountains,
}

impl Habitat {
    pub const ALL: [Habitat; 8] = [
        Habitat::Savanna,
        Habitat::Rainforest,
        Habitat::Ocean,
        Habitat::Desert,
        Habitat::Arctic,
        Habitat::Forest,
        Habitat::Wetland,
        Habitat::Mountains,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Habitat::Savanna => "savanna",
            Habitat::Rainforest => "rainforest",
            Habitat::Ocean => "ocean",
            Habitat::Desert => "desert",
            Habitat::Arctic => "arctic",
            Habitat::Forest => "forest",
            Habitat::Wetland => "wetland",
            Habitat::Mountains => "mountains",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Habitat::Savanna => "Savanna",
            Habitat::Rainforest => "Rainforest",
            Habitat::Ocean => "Open ocean",
            Habitat::Desert => "Desert",
            Habitat::Arctic => "Arctic",
            Habitat::Forest => "Temperate forest",
            Habitat::Wetland => "Wetlands",
            Habitat::Mountains => "Mountains",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diet {
    Carnivore,
    Herbivore,
    Omnivore,
}

impl Diet {
    pub const ALL: [Diet; 3] = [Diet::Carnivore, Diet::Herbivore, Diet::Omnivore];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Diet::Carnivore => "carnivore",
            Diet::Herbivore => "herbivore",
            Diet::Omnivore => "omnivore",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Diet::Carnivore => "Carnivore",
            Diet::Herbivore => "Herbivore",
            Diet::Omnivore => "Omnivore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConservationStatus {
    LeastConcern,
    NearThreatened,
    Vulnerable,
    Endangered,
    CriticallyEndangered,
}

impl ConservationStatus {
    pub const ALL: [ConservationStatus; 5] = [
        ConservationStatus::LeastConcern,
        ConservationStatus::NearThreatened,
        ConservationStatus::Vulnerable,
        ConservationStatus::Endangered,
        ConservationStatus::CriticallyEndangered,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            ConservationStatus::LeastConcern => "least-concern",
            ConservationStatus::NearThreatened => "near-threatened",
            ConservationStatus::Vulnerable => "vulnerable",
            ConservationStatus::Endangered => "endangered",
            ConservationStatus::CriticallyEndangered => "critically-endangered",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ConservationStatus::LeastConcern => "Least concern",
            ConservationStatus::NearThreatened => "Near threatened",
            ConservationStatus::Vulnerable => "Vulnerable",
            ConservationStatus::Endangered => "Endangered",
            ConservationStatus::CriticallyEndangered => "Critically endangered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animal {
    pub id: AnimalId,
    pub name: &'static str,
    pub category: CategoryId,
    pub habitat: Habitat,
    pub diet: Diet,
    pub status: Option<ConservationStatus>,
    pub can_fly: bool,
    pub nocturnal: bool,
    pub facts: &'static [&'static str],
    pub clue: &'static str,
}

#[allow(clippy::too_many_arguments)]
const fn animal(
    id: &'static str,
    name: &'static str,
    category: CategoryId,
    habitat: Habitat,
    diet: Diet,
    status: Option<ConservationStatus>,
    can_fly: bool,
    nocturnal: bool,
    facts: &'static [&'static str],
    clue: &'static str,
) -> Animal {
    Animal {
        id: AnimalId::new(id),
        name,
        category,
        habitat,
        diet,
        status,
        can_fly,
        nocturnal,
        facts,
        clue,
    }
}

use ConservationStatus::{CriticallyEndangered, Endangered, LeastConcern, NearThreatened, Vulnerable};

pub static ANIMALS: &[Animal] = &[
    // ─── mammals ───
    animal("lion", "Lion", MAMMALS, Habitat::Savanna, Diet::Carnivore, Some(Vulnerable), false, false,
        &["lives in family groups called prides", "has a roar that carries for about eight kilometres"],
        "The males have a shaggy mane."),
    animal("elephant", "African Elephant", MAMMALS, Habitat::Savanna, Diet::Herbivore, Some(Endangered), false, false,
        &["is the largest land animal alive today", "uses its trunk to drink, smell and grab food"],
        "It never forgets, or so the saying goes."),
    animal("orangutan", "Orangutan", MAMMALS, Habitat::Rainforest, Diet::Omnivore, Some(CriticallyEndangered), false, false,
        &["builds a fresh sleeping nest in the trees every night", "shares about 97 percent of its DNA with humans"],
        "Its name means 'person of the forest'."),
    animal("bat", "Fruit Bat", MAMMALS, Habitat::Rainforest, Diet::Herbivore, Some(LeastConcern), true, true,
        &["spreads seeds across the forest as it feeds", "hangs upside down while it rests"],
        "It is the only mammal capable of true flight."),
    animal("camel", "Dromedary Camel", MAMMALS, Habitat::Desert, Diet::Herbivore, Some(LeastConcern), false, false,
        &["stores fat, not water, in its hump", "can close its nostrils during sandstorms"],
        "It is sometimes called the ship of the desert."),
    animal("polar-bear", "Polar Bear", MAMMALS, Habitat::Arctic, Diet::Carnivore, Some(Vulnerable), false, false,
        &["has black skin beneath its white-looking fur", "hunts seals from the edge of sea ice"],
        "It is the largest land carnivore."),
    animal("snow-leopard", "Snow Leopard", MAMMALS, Habitat::Mountains, Diet::Carnivore, Some(Vulnerable), false, false,
        &["wraps its long tail around its face for warmth", "can leap up to fifteen metres in one bound"],
        "Its nickname is the 'ghost of the mountains'."),

    // ─── birds ───
    animal("bald-eagle", "Bald Eagle", BIRDS, Habitat::Forest, Diet::Carnivore, Some(LeastConcern), true, false,
        &["builds one of the largest nests of any bird", "snatches fish from the water with its talons"],
        "It is the national bird of the United States."),
    animal("emperor-penguin", "Emperor Penguin", BIRDS, Habitat::Arctic, Diet::Carnivore, Some(NearThreatened), false, false,
        &["keeps its egg warm on its feet through the winter", "can dive deeper than 500 metres"],
        "It is the tallest of all penguins."),
    animal("ostrich", "Ostrich", BIRDS, Habitat::Savanna, Diet::Omnivore, Some(LeastConcern), false, false,
        &["lays the largest egg of any living bird", "can sprint at about seventy kilometres per hour"],
        "It is the largest bird in the world."),
    animal("barn-owl", "Barn Owl", BIRDS, Habitat::Forest, Diet::Carnivore, Some(LeastConcern), true, true,
        &["can locate prey in total darkness by sound alone", "has a heart-shaped facial disc"],
        "It swallows its prey whole and coughs up pellets."),
    animal("toucan", "Toco Toucan", BIRDS, Habitat::Rainforest, Diet::Omnivore, Some(LeastConcern), true, false,
        &["has a huge, light beak that helps it shed heat", "tosses fruit into the air before swallowing it"],
        "Its bright orange beak is a third of its length."),
    animal("flamingo", "Greater Flamingo", BIRDS, Habitat::Wetland, Diet::Omnivore, Some(LeastConcern), true, false,
        &["gets its pink colour from the food it eats", "often rests standing on one leg"],
        "It feeds with its head upside down."),
    animal("kakapo", "Kakapo", BIRDS, Habitat::Forest, Diet::Herbivore, Some(CriticallyEndangered), false, true,
        &["is the heaviest parrot in the world", "has every living individual tracked by name"],
        "It is a flightless parrot from New Zealand."),

    // ─── reptiles & amphibians ───
    animal("komodo-dragon", "Komodo Dragon", REPTILES, Habitat::Savanna, Diet::Carnivore, Some(Endangered), false, false,
        &["is the largest living lizard", "can detect carrion from several kilometres away"],
        "It lives on a handful of Indonesian islands."),
    animal("green-iguana", "Green Iguana", REPTILES, Habitat::Rainforest, Diet::Herbivore, Some(LeastConcern), false, false,
        &["has a light-sensing 'third eye' on top of its head", "can drop from high branches without injury"],
        "It often basks on branches over rivers."),
    animal("poison-dart-frog", "Poison Dart Frog", REPTILES, Habitat::Rainforest, Diet::Carnivore, Some(LeastConcern), false, false,
        &["warns predators with bright colours", "carries its tadpoles on its back"],
        "Some groups once used its toxin on hunting darts."),
    animal("axolotl", "Axolotl", REPTILES, Habitat::Wetland, Diet::Carnivore, Some(CriticallyEndangered), false, false,
        &["can regrow lost limbs and even parts of its heart", "keeps its feathery gills into adulthood"],
        "It is a salamander that never fully grows up."),
    animal("thorny-devil", "Thorny Devil", REPTILES, Habitat::Desert, Diet::Carnivore, Some(LeastConcern), false, false,
        &["drinks by channelling water along grooves in its skin", "eats thousands of ants in a single meal"],
        "It is a spiky lizard from the Australian outback."),
    animal("saltwater-crocodile", "Saltwater Crocodile", REPTILES, Habitat::Wetland, Diet::Carnivore, Some(LeastConcern), false, true,
        &["has the strongest bite force ever measured", "can swim far out to sea between islands"],
        "It is the largest living reptile."),
    animal("tortoise", "Galapagos Tortoise", REPTILES, Habitat::Forest, Diet::Herbivore, Some(Endangered), false, false,
        &["can live for more than a hundred years", "can survive a year without food or water"],
        "It gave its name to the islands it lives on."),

    // ─── ocean life ───
    animal("blue-whale", "Blue Whale", OCEAN, Habitat::Ocean, Diet::Carnivore, Some(Endangered), false, false,
        &["is the largest animal ever known to have lived", "feeds almost entirely on tiny krill"],
        "Its heart is the size of a small car."),
    animal("octopus", "Common Octopus", OCEAN, Habitat::Ocean, Diet::Carnivore, Some(LeastConcern), false, true,
        &["has three hearts and blue blood", "can change colour and texture in a fraction of a second"],
        "It has eight arms covered in suckers."),
    animal("clownfish", "Clownfish", OCEAN, Habitat::Ocean, Diet::Omnivore, Some(LeastConcern), false, false,
        &["shelters among the stinging tentacles of sea anemones", "can change from male to female"],
        "A famous film was made about one searching for his son."),
    animal("great-white-shark", "Great White Shark", OCEAN, Habitat::Ocean, Diet::Carnivore, Some(Vulnerable), false, false,
        &["can sense tiny electrical fields given off by prey", "replaces its teeth throughout its life"],
        "It is the largest predatory fish."),
    animal("sea-otter", "Sea Otter", OCEAN, Habitat::Ocean, Diet::Carnivore, Some(Endangered), false, false,
        &["has the densest fur of any animal", "uses rocks as tools to crack open shellfish"],
        "It sometimes holds paws with others while sleeping."),
    animal("green-sea-turtle", "Green Sea Turtle", OCEAN, Habitat::Ocean, Diet::Herbivore, Some(Endangered), false, false,
        &["returns to the beach where it hatched to lay eggs", "grazes on seagrass as an adult"],
        "It is named for the colour of its body fat."),
    animal("narwhal", "Narwhal", OCEAN, Habitat::Arctic, Diet::Carnivore, Some(LeastConcern), false, false,
        &["has a spiral tusk that is actually a long tooth", "lives in Arctic waters all year round"],
        "It is known as the unicorn of the sea."),
];

/// Looks up an animal by id.
#[must_use]
pub fn animal_by_id(id: AnimalId) -> Option<&'static Animal> {
    ANIMALS.iter().find(|a| a.id == id)
}

/// All animals in a category, in catalog order.
pub fn animals_in(category: CategoryId) -> impl Iterator<Item = &'static Animal> {
    ANIMALS.iter().filter(move |a| a.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn animal_ids_are_unique() {
        let mut seen = HashSet::new();
        assert!(ANIMALS.iter().all(|a| seen.insert(a.id)));
    }

    #[test]
    fn every_category_has_enough_animals_for_four_options() {
        for category in [MAMMALS, BIRDS, REPTILES, OCEAN] {
            assert!(animals_in(category).count() >= 4, "{category} is too small");
        }
    }

    #[test]
    fn every_animal_has_facts_and_a_clue() {
        for a in ANIMALS {
            assert!(!a.facts.is_empty(), "{} has no facts", a.id);
            assert!(!a.clue.trim().is_empty(), "{} has no clue", a.id);
        }
    }

    #[test]
    fn lookup_by_id() {
        let owl = animal_by_id(AnimalId::new("barn-owl")).unwrap();
        assert!(owl.nocturnal && owl.can_fly);
        assert!(animal_by_id(AnimalId::new("dodo")).is_none());
    }
}
