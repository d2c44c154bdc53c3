use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

use super::{sort_candidates, Algorithm, Candidate, ForecastInputs, Scorer};
use crate::config::InverseFrequencySettings;

/// Favours animals drawn less often than expected over the last week.
pub struct InverseFrequencyScorer {
    settings: InverseFrequencySettings,
}

impl InverseFrequencyScorer {
    pub fn new(settings: InverseFrequencySettings) -> Self {
        Self { settings }
    }
}

impl Scorer for InverseFrequencyScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::InverseFrequency
    }

    fn score(&self, inputs: &ForecastInputs) -> Vec<Candidate> {
        let recent: HashMap<_, _> = inputs
            .recent_stats
            .iter()
            .map(|s| (s.animal, s.count))
            .collect();

        let mut candidates: Vec<Candidate> = inputs
            .catalog
            .animals()
            .filter_map(|animal| {
                let recent_count = recent.get(&animal).copied().unwrap_or(0);
                let absence = (self.settings.expected_weekly_frequency - Decimal::from(recent_count))
                    .max(Decimal::ZERO);
                let probability = (absence * self.settings.scale)
                    .min(self.settings.cap)
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

                (probability > self.settings.min_probability).then(|| {
                    Candidate::new(
                        Algorithm::InverseFrequency,
                        animal,
                        probability,
                        self.settings.confidence,
                        format!("Low recent frequency: {} appearances", recent_count),
                    )
                })
            })
            .collect();

        sort_candidates(&mut candidates);
        candidates
    }
}
