use chrono::Duration;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::{sort_candidates, Algorithm, Candidate, ForecastInputs, Scorer};
use crate::config::TrendSettings;
use crate::types::{Animal, DailyCount};

/// Least-squares slope of `values` against their index.
///
/// `slope = (n·Σxy − Σx·Σy) / (n·Σx² − (Σx)²)` with `x = 0..n-1`.
/// Returns zero for fewer than two points.
pub fn linear_slope(values: &[u64]) -> Decimal {
    let n = values.len() as i64;
    if n < 2 {
        return Decimal::ZERO;
    }

    let sum_x = n * (n - 1) / 2;
    let sum_x2 = (n - 1) * n * (2 * n - 1) / 6;
    let sum_y: i64 = values.iter().map(|&v| v as i64).sum();
    let sum_xy: i64 = values
        .iter()
        .enumerate()
        .map(|(x, &y)| x as i64 * y as i64)
        .sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = n * sum_x2 - sum_x * sum_x;
    Decimal::from(numerator) / Decimal::from(denominator)
}

/// Favours animals whose daily count has been rising over the horizon.
pub struct TrendScorer {
    settings: TrendSettings,
}

impl TrendScorer {
    pub fn new(settings: TrendSettings) -> Self {
        Self { settings }
    }

    /// Per-animal daily series, index 0 = oldest day of the horizon.
    fn series(&self, inputs: &ForecastInputs) -> HashMap<Animal, Vec<u64>> {
        let days = self.settings.days;
        let first_day = inputs.now.date() - Duration::days(days as i64 - 1);

        let mut series: HashMap<Animal, Vec<u64>> = HashMap::new();
        for DailyCount { date, animal, count } in &inputs.trend_days {
            let offset = (*date - first_day).num_days();
            if offset < 0 || offset >= days as i64 {
                continue;
            }
            series.entry(*animal).or_insert_with(|| vec![0; days])[offset as usize] += count;
        }
        series
    }
}

impl Scorer for TrendScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Trend
    }

    fn score(&self, inputs: &ForecastInputs) -> Vec<Candidate> {
        let series = self.series(inputs);

        let mut candidates: Vec<Candidate> = inputs
            .catalog
            .animals()
            .filter_map(|animal| {
                let values = series.get(&animal)?;
                let slope = linear_slope(values);
                if slope <= self.settings.min_slope {
                    return None;
                }

                Some(Candidate::new(
                    Algorithm::Trend,
                    animal,
                    (slope * self.settings.scale).min(self.settings.cap),
                    self.settings.confidence,
                    format!(
                        "Positive trend: +{}%",
                        (slope * Decimal::ONE_HUNDRED).round_dp(1)
                    ),
                ))
            })
            .collect();

        sort_candidates(&mut candidates);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnimalCatalog;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 16).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    /// `counts[0]` lands six days ago, `counts[6]` today.
    fn week(animal: Animal, counts: [u64; 7]) -> Vec<DailyCount> {
        counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, &count)| DailyCount {
                date: now().date() - Duration::days(6 - i as i64),
                animal,
                count,
            })
            .collect()
    }

    fn inputs(trend_days: Vec<DailyCount>) -> ForecastInputs {
        let mut inputs = ForecastInputs::empty(now(), Arc::new(AnimalCatalog::builtin()));
        inputs.trend_days = trend_days;
        inputs
    }

    #[test]
    fn test_slope_closed_form() {
        assert_eq!(linear_slope(&[0, 1, 2, 3, 4, 5, 6]), dec!(1));
        assert_eq!(linear_slope(&[3, 3, 3, 3]), Decimal::ZERO);
        assert_eq!(linear_slope(&[4, 2, 0]), dec!(-2));
        assert_eq!(linear_slope(&[5]), Decimal::ZERO);
    }

    #[test]
    fn test_increasing_series_triggers_candidate() {
        let scorer = TrendScorer::new(TrendSettings::default());
        let candidates = scorer.score(&inputs(week(Animal::Eagle, [0, 0, 1, 1, 2, 2, 3])));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].animal, Animal::Eagle);
        // slope = 0.5 → probability 5
        assert_eq!(candidates[0].probability, dec!(5));
        assert_eq!(candidates[0].rationale, "Positive trend: +50.0%");
    }

    #[test]
    fn test_decreasing_series_yields_nothing() {
        let scorer = TrendScorer::new(TrendSettings::default());
        let candidates = scorer.score(&inputs(week(Animal::Eagle, [6, 5, 4, 3, 2, 1, 0])));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_probability_capped() {
        let scorer = TrendScorer::new(TrendSettings::default());
        let candidates = scorer.score(&inputs(week(Animal::Cow, [0, 2, 4, 6, 8, 10, 12])));
        assert_eq!(candidates[0].probability, dec!(8));
    }
}
