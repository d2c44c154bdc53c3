use rust_decimal::Decimal;

use super::{sort_candidates, Algorithm, Candidate, ForecastInputs, Scorer};
use crate::config::SequentialSettings;

/// Continues recurring triplets whose first two animals match the last two draws.
pub struct SequentialScorer {
    settings: SequentialSettings,
}

impl SequentialScorer {
    pub fn new(settings: SequentialSettings) -> Self {
        Self { settings }
    }
}

impl Scorer for SequentialScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sequential
    }

    fn score(&self, inputs: &ForecastInputs) -> Vec<Candidate> {
        let (last, second_last) = match inputs.last_outcomes.as_slice() {
            [last, second_last, ..] => (last.animal, second_last.animal),
            _ => return Vec::new(),
        };

        let mut candidates: Vec<Candidate> = inputs
            .sequences
            .iter()
            .filter(|p| p.prev_2 == second_last && p.prev_1 == last)
            .map(|p| {
                let frequency = Decimal::from(p.frequency);
                Candidate::new(
                    Algorithm::Sequential,
                    p.current,
                    (frequency * self.settings.probability_per_occurrence)
                        .min(self.settings.probability_cap),
                    (frequency * self.settings.confidence_per_occurrence)
                        .min(self.settings.confidence_cap),
                    format!(
                        "Sequence detected: {} → {} → {}",
                        inputs.catalog.label(p.prev_2),
                        inputs.catalog.label(p.prev_1),
                        inputs.catalog.label(p.current)
                    ),
                )
            })
            .collect();

        sort_candidates(&mut candidates);
        candidates
    }
}
