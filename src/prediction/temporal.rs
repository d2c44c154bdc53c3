use chrono::{Datelike, Timelike};
use rust_decimal::Decimal;

use super::{sort_candidates, Algorithm, Candidate, ForecastInputs, Scorer};
use crate::analysis::timing::day_name;
use crate::config::TemporalSettings;
use crate::types::Animal;

/// Scores animals by how often they were drawn at the current hour and weekday.
pub struct TemporalScorer {
    settings: TemporalSettings,
}

impl TemporalScorer {
    pub fn new(settings: TemporalSettings) -> Self {
        Self { settings }
    }
}

impl Scorer for TemporalScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Temporal
    }

    fn score(&self, inputs: &ForecastInputs) -> Vec<Candidate> {
        let hour = inputs.now.hour();
        let day = inputs.now.date().weekday().num_days_from_sunday();

        // (animal, hour count, day count) in first-seen order
        let mut tallies: Vec<(Animal, u64, u64)> = Vec::new();
        for row in inputs.hourly.iter().filter(|r| r.hour == hour) {
            slot(&mut tallies, row.animal).1 = row.count;
        }
        for row in inputs.weekdays.iter().filter(|r| r.day_of_week == day) {
            slot(&mut tallies, row.animal).2 = row.count;
        }

        let mut candidates: Vec<Candidate> = tallies
            .into_iter()
            .filter_map(|(animal, hour_count, day_count)| {
                let score = Decimal::from(hour_count) * self.settings.hour_weight
                    + Decimal::from(day_count) * self.settings.day_weight;
                let probability = score.min(self.settings.cap);

                (probability > self.settings.min_probability).then(|| {
                    Candidate::new(
                        Algorithm::Temporal,
                        animal,
                        probability,
                        self.settings.confidence,
                        format!("Favourable hour/day pattern: {}:00 on {}", hour, day_name(day)),
                    )
                })
            })
            .collect();

        sort_candidates(&mut candidates);
        candidates
    }
}

fn slot(tallies: &mut Vec<(Animal, u64, u64)>, animal: Animal) -> &mut (Animal, u64, u64) {
    let index = match tallies.iter().position(|(a, _, _)| *a == animal) {
        Some(i) => i,
        None => {
            tallies.push((animal, 0, 0));
            tallies.len() - 1
        }
    };
    &mut tallies[index]
}
