use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::error::{CatalogError, ParseError};

/// Size of the draw alphabet.
pub const ANIMAL_COUNT: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Animal {
    Ram,
    Bull,
    Centipede,
    Scorpion,
    Lion,
    Frog,
    Parrot,
    Mouse,
    Eagle,
    Tiger,
    Cat,
    Horse,
    Monkey,
    Dove,
    Fox,
    Bear,
    Turkey,
    Donkey,
    Goat,
    Pig,
    Rooster,
    Camel,
    Zebra,
    Iguana,
    Hen,
    Cow,
    Dog,
    Vulture,
    Elephant,
    Caiman,
    Paca,
    Squirrel,
    Fish,
    Deer,
    Giraffe,
    Snake,
}

impl Animal {
    /// All animals in draw-number order (Ram = 1 .. Snake = 36).
    pub const ALL: [Animal; ANIMAL_COUNT] = [
        Animal::Ram,
        Animal::Bull,
        Animal::Centipede,
        Animal::Scorpion,
        Animal::Lion,
        Animal::Frog,
        Animal::Parrot,
        Animal::Mouse,
        Animal::Eagle,
        Animal::Tiger,
        Animal::Cat,
        Animal::Horse,
        Animal::Monkey,
        Animal::Dove,
        Animal::Fox,
        Animal::Bear,
        Animal::Turkey,
        Animal::Donkey,
        Animal::Goat,
        Animal::Pig,
        Animal::Rooster,
        Animal::Camel,
        Animal::Zebra,
        Animal::Iguana,
        Animal::Hen,
        Animal::Cow,
        Animal::Dog,
        Animal::Vulture,
        Animal::Elephant,
        Animal::Caiman,
        Animal::Paca,
        Animal::Squirrel,
        Animal::Fish,
        Animal::Deer,
        Animal::Giraffe,
        Animal::Snake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Animal::Ram => "Ram",
            Animal::Bull => "Bull",
            Animal::Centipede => "Centipede",
            Animal::Scorpion => "Scorpion",
            Animal::Lion => "Lion",
            Animal::Frog => "Frog",
            Animal::Parrot => "Parrot",
            Animal::Mouse => "Mouse",
            Animal::Eagle => "Eagle",
            Animal::Tiger => "Tiger",
            Animal::Cat => "Cat",
            Animal::Horse => "Horse",
            Animal::Monkey => "Monkey",
            Animal::Dove => "Dove",
            Animal::Fox => "Fox",
            Animal::Bear => "Bear",
            Animal::Turkey => "Turkey",
            Animal::Donkey => "Donkey",
            Animal::Goat => "Goat",
            Animal::Pig => "Pig",
            Animal::Rooster => "Rooster",
            Animal::Camel => "Camel",
            Animal::Zebra => "Zebra",
            Animal::Iguana => "Iguana",
            Animal::Hen => "Hen",
            Animal::Cow => "Cow",
            Animal::Dog => "Dog",
            Animal::Vulture => "Vulture",
            Animal::Elephant => "Elephant",
            Animal::Caiman => "Caiman",
            Animal::Paca => "Paca",
            Animal::Squirrel => "Squirrel",
            Animal::Fish => "Fish",
            Animal::Deer => "Deer",
            Animal::Giraffe => "Giraffe",
            Animal::Snake => "Snake",
        }
    }

    /// Draw number printed on the ticket, 1..=36.
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn from_number(number: u8) -> Option<Self> {
        if number == 0 {
            return None;
        }
        Self::ALL.get(number as usize - 1).copied()
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Animal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u8>() {
            return Self::from_number(number).ok_or_else(|| ParseError::UnknownAnimal(s.to_string()));
        }
        Self::ALL
            .iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| ParseError::UnknownAnimal(s.to_string()))
    }
}

/// One row of the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub animal: Animal,
    pub number: u8,
    /// Display label, e.g. a localized name.
    pub label: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    animals: Vec<CatalogEntry>,
}

/// Read-only table of the 36 animals. Built once at startup and shared
/// behind an `Arc`; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct AnimalCatalog {
    entries: Vec<CatalogEntry>,
}

impl AnimalCatalog {
    pub fn builtin() -> Self {
        let entries = Animal::ALL
            .iter()
            .map(|&animal| CatalogEntry {
                animal,
                number: animal.number(),
                label: animal.as_str().to_string(),
            })
            .collect();
        Self { entries }
    }

    /// Load display labels from a JSON file of the form
    /// `{"animals": [{"animal": "Lion", "number": 5, "label": "León"}, ...]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json(&raw)?;
        info!("Loaded animal catalog from {}", path.as_ref().display());
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::from_entries(file.animals)
    }

    pub fn from_entries(mut entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.len() != ANIMAL_COUNT {
            return Err(CatalogError::WrongSize {
                expected: ANIMAL_COUNT,
                found: entries.len(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.animal) {
                return Err(CatalogError::Duplicate(entry.animal.to_string()));
            }
            if entry.number != entry.animal.number() {
                return Err(CatalogError::NumberMismatch {
                    animal: entry.animal.to_string(),
                    expected: entry.animal.number(),
                    found: entry.number,
                });
            }
        }

        entries.sort_by_key(|e| e.number);
        Ok(Self { entries })
    }

    /// Animals in draw-number order.
    pub fn animals(&self) -> impl Iterator<Item = Animal> + '_ {
        self.entries.iter().map(|e| e.animal)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label(&self, animal: Animal) -> &str {
        self.entries
            .iter()
            .find(|e| e.animal == animal)
            .map(|e| e.label.as_str())
            .unwrap_or_else(|| animal.as_str())
    }

    /// Resolve user input by canonical name, catalog label or number.
    pub fn lookup(&self, input: &str) -> Result<Animal, ParseError> {
        let trimmed = input.trim();
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.label.to_lowercase() == trimmed.to_lowercase())
        {
            return Ok(entry.animal);
        }
        Animal::from_str(trimmed)
    }
}

impl Default for AnimalCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_follow_draw_order() {
        assert_eq!(Animal::Ram.number(), 1);
        assert_eq!(Animal::Lion.number(), 5);
        assert_eq!(Animal::Snake.number(), 36);
        assert_eq!(Animal::from_number(10), Some(Animal::Tiger));
        assert_eq!(Animal::from_number(0), None);
        assert_eq!(Animal::from_number(37), None);
    }

    #[test]
    fn test_parse_by_name_and_number() {
        assert_eq!("lion".parse::<Animal>().unwrap(), Animal::Lion);
        assert_eq!(" EAGLE ".parse::<Animal>().unwrap(), Animal::Eagle);
        assert_eq!("27".parse::<Animal>().unwrap(), Animal::Dog);
        assert!("unicorn".parse::<Animal>().is_err());
    }

    #[test]
    fn test_builtin_catalog_is_complete() {
        let catalog = AnimalCatalog::builtin();
        assert_eq!(catalog.len(), ANIMAL_COUNT);
        let distinct: HashSet<_> = catalog.animals().collect();
        assert_eq!(distinct.len(), ANIMAL_COUNT);
        assert_eq!(catalog.animals().next(), Some(Animal::Ram));
    }

    #[test]
    fn test_catalog_rejects_wrong_size() {
        let mut entries = AnimalCatalog::builtin().entries().to_vec();
        entries.pop();
        assert!(matches!(
            AnimalCatalog::from_entries(entries),
            Err(CatalogError::WrongSize { found: 35, .. })
        ));
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let mut entries = AnimalCatalog::builtin().entries().to_vec();
        entries[1] = entries[0].clone();
        assert!(matches!(
            AnimalCatalog::from_entries(entries),
            Err(CatalogError::Duplicate(_))
        ));
    }

    #[test]
    fn test_labels_and_lookup() {
        let mut entries = AnimalCatalog::builtin().entries().to_vec();
        entries[4].label = "León".to_string();
        let catalog = AnimalCatalog::from_entries(entries).unwrap();

        assert_eq!(catalog.label(Animal::Lion), "León");
        assert_eq!(catalog.lookup("león").unwrap(), Animal::Lion);
        assert_eq!(catalog.lookup("Lion").unwrap(), Animal::Lion);
        assert_eq!(catalog.lookup("5").unwrap(), Animal::Lion);
    }

    #[test]
    fn test_catalog_from_json() {
        let entries: Vec<String> = Animal::ALL
            .iter()
            .map(|a| format!(r#"{{"animal":"{}","number":{},"label":"{}"}}"#, a, a.number(), a))
            .collect();
        let raw = format!(r#"{{"animals":[{}]}}"#, entries.join(","));

        let catalog = AnimalCatalog::from_json(&raw).unwrap();
        assert_eq!(catalog.len(), ANIMAL_COUNT);
    }
}
