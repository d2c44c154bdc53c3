use super::report::Findings;
use crate::types::{Animal, AnimalCatalog, SequentialPattern};

/// Animal appearing most often across all triplets, weighted by frequency.
/// Earlier-seen animals win ties.
pub fn most_common_animal(patterns: &[SequentialPattern]) -> Option<(Animal, u32)> {
    let mut tally: Vec<(Animal, u32)> = Vec::new();
    for pattern in patterns {
        for animal in pattern.animals() {
            match tally.iter_mut().find(|(a, _)| *a == animal) {
                Some(entry) => entry.1 += pattern.frequency,
                None => tally.push((animal, pattern.frequency)),
            }
        }
    }

    tally
        .into_iter()
        .fold(None, |best: Option<(Animal, u32)>, item| match best {
            Some(b) if b.1 >= item.1 => Some(b),
            _ => Some(item),
        })
}

pub fn analyze_sequences(
    patterns: &[SequentialPattern],
    top: usize,
    catalog: &AnimalCatalog,
) -> Findings {
    let mut findings = Findings::default();

    for (i, pattern) in patterns.iter().take(top).enumerate() {
        findings.patterns.push(format!(
            "Sequence {}: {} → {} → {} ({} times)",
            i + 1,
            catalog.label(pattern.prev_2),
            catalog.label(pattern.prev_1),
            catalog.label(pattern.current),
            pattern.frequency
        ));
    }

    let repeats = patterns.iter().filter(|p| p.has_repeat()).count();
    if repeats > 0 {
        findings.insights.push(format!(
            "{} recurring sequences contain a repeated animal",
            repeats
        ));
    }

    if let Some((animal, occurrences)) = most_common_animal(patterns) {
        findings.insights.push(format!(
            "{} is the most frequent animal in recurring sequences ({} appearances)",
            catalog.label(animal),
            occurrences
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use Animal::*;

    fn triplet(prev_2: Animal, prev_1: Animal, current: Animal, frequency: u32) -> SequentialPattern {
        SequentialPattern {
            prev_2,
            prev_1,
            current,
            frequency,
        }
    }

    #[test]
    fn test_top_three_reported_in_order() {
        let patterns = vec![
            triplet(Fox, Dog, Cat, 5),
            triplet(Cat, Cat, Lion, 4),
            triplet(Ram, Bull, Cow, 3),
            triplet(Eagle, Fox, Dog, 2),
        ];
        let findings = analyze_sequences(&patterns, 3, &AnimalCatalog::builtin());

        assert_eq!(findings.patterns.len(), 3);
        assert_eq!(findings.patterns[0], "Sequence 1: Fox → Dog → Cat (5 times)");
        assert_eq!(findings.patterns[2], "Sequence 3: Ram → Bull → Cow (3 times)");
        assert!(findings.insights[0].starts_with("1 recurring"));
    }

    #[test]
    fn test_skipped_repeat_counts() {
        let patterns = vec![
            triplet(Fox, Dog, Fox, 3),
            triplet(Cat, Cat, Lion, 2),
            triplet(Ram, Bull, Cow, 2),
        ];
        let findings = analyze_sequences(&patterns, 3, &AnimalCatalog::builtin());
        assert_eq!(findings.insights[0], "2 recurring sequences contain a repeated animal");
    }

    #[test]
    fn test_most_common_weighted_by_frequency() {
        let patterns = vec![triplet(Fox, Dog, Cat, 5), triplet(Cat, Lion, Ram, 2)];
        assert_eq!(most_common_animal(&patterns), Some((Cat, 7)));
    }

    #[test]
    fn test_most_common_tie_keeps_first_seen() {
        let patterns = vec![triplet(Fox, Dog, Cat, 2)];
        assert_eq!(most_common_animal(&patterns), Some((Fox, 2)));
        assert_eq!(most_common_animal(&[]), None);
    }

    #[test]
    fn test_no_patterns_no_findings() {
        let findings = analyze_sequences(&[], 3, &AnimalCatalog::builtin());
        assert_eq!(findings, Findings::default());
    }
}
