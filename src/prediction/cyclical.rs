use rust_decimal::Decimal;

use super::{sort_candidates, Algorithm, Candidate, ForecastInputs, Scorer};
use crate::config::CyclicalSettings;

/// Promotes animals whose detected cycle is due within the lookahead.
pub struct CyclicalScorer {
    settings: CyclicalSettings,
}

impl CyclicalScorer {
    pub fn new(settings: CyclicalSettings) -> Self {
        Self { settings }
    }
}

impl Scorer for CyclicalScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Cyclical
    }

    fn score(&self, inputs: &ForecastInputs) -> Vec<Candidate> {
        let today = inputs.now.date();

        let mut candidates: Vec<Candidate> = inputs
            .cycles
            .iter()
            .filter_map(|cycle| {
                let days_until = (cycle.next_expected - today).num_days();
                if !(0..=self.settings.lookahead_days).contains(&days_until) {
                    return None;
                }

                let confidence = Decimal::from(cycle.confidence);
                let probability = (confidence / self.settings.confidence_divisor)
                    .max(self.settings.min_probability);

                Some(Candidate::new(
                    Algorithm::Cyclical,
                    cycle.animal,
                    probability,
                    confidence,
                    format!(
                        "{} cycle suggests an appearance in {} days",
                        cycle.period, days_until
                    ),
                ))
            })
            .collect();

        sort_candidates(&mut candidates);
        candidates
    }
}
