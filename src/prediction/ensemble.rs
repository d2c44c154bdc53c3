//! Weighted merge of the scorer outputs and the summary figures derived from it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::{Algorithm, Candidate};
use crate::analysis::Cycle;
use crate::config::ForecastSettings;
use crate::types::{AggregatedStat, Animal};

/// One animal's entry in the combined forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedPrediction {
    pub animal: Animal,
    /// Weighted sum, two decimals.
    pub probability: Decimal,
    pub confidence: u32,
    pub reasons: Vec<String>,
    pub algorithms: Vec<Algorithm>,
}

/// Merge weighted candidate lists by animal.
///
/// Animals keep the order in which they were first seen, so the stable sort
/// breaks probability ties in that order.
pub fn combine(lists: &[(Vec<Candidate>, Decimal)]) -> Vec<CombinedPrediction> {
    let mut merged: Vec<(CombinedPrediction, Decimal)> = Vec::new();

    for (candidates, weight) in lists {
        for candidate in candidates {
            let index = match merged.iter().position(|(p, _)| p.animal == candidate.animal) {
                Some(i) => i,
                None => {
                    merged.push((
                        CombinedPrediction {
                            animal: candidate.animal,
                            probability: Decimal::ZERO,
                            confidence: 0,
                            reasons: Vec::new(),
                            algorithms: Vec::new(),
                        },
                        Decimal::ZERO,
                    ));
                    merged.len() - 1
                }
            };

            let (entry, confidence) = &mut merged[index];
            entry.probability += candidate.probability * weight;
            *confidence += candidate.confidence * weight;
            entry.reasons.push(candidate.rationale.clone());
            entry.algorithms.push(candidate.algorithm);
        }
    }

    let mut combined: Vec<CombinedPrediction> = merged
        .into_iter()
        .map(|(mut entry, confidence)| {
            entry.probability = entry
                .probability
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            entry.confidence = confidence
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u32()
                .unwrap_or(0);
            entry
        })
        .collect();

    combined.sort_by(|a, b| b.probability.cmp(&a.probability));
    combined
}

/// Overall confidence in the forecast, 0 when nothing was predicted.
///
/// Base plus a bonus per distinct algorithm backing the top entry plus a
/// bonus for the probability spread, clamped to the configured range.
pub fn model_confidence(predictions: &[CombinedPrediction], settings: &ForecastSettings) -> u32 {
    let Some(top) = predictions.first() else {
        return 0;
    };

    let algorithms: HashSet<Algorithm> = top.algorithms.iter().copied().collect();
    let spread = match predictions.last() {
        Some(bottom) if predictions.len() > 1 => top.probability - bottom.probability,
        _ => settings.single_entry_spread,
    };

    let confidence = Decimal::from(settings.confidence_base)
        + Decimal::from(settings.confidence_per_algorithm * algorithms.len() as i64)
        + (spread * settings.spread_factor).min(settings.spread_cap);

    let rounded = confidence
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(settings.confidence_floor);

    rounded.clamp(settings.confidence_floor, settings.confidence_ceiling) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Stable,
    Moderate,
    Volatile,
    InsufficientData,
}

impl TrendLabel {
    /// Compare the leading animals of a short window against a longer one.
    pub fn classify(
        short: &[AggregatedStat],
        long: &[AggregatedStat],
        settings: &ForecastSettings,
    ) -> Self {
        if short.is_empty() || long.is_empty() {
            return TrendLabel::InsufficientData;
        }

        let top_long: Vec<Animal> = long
            .iter()
            .take(settings.trend_top_n)
            .map(|s| s.animal)
            .collect();
        let overlap = short
            .iter()
            .take(settings.trend_top_n)
            .filter(|s| top_long.contains(&s.animal))
            .count();

        if overlap >= settings.stable_overlap {
            TrendLabel::Stable
        } else if overlap <= settings.volatile_overlap {
            TrendLabel::Volatile
        } else {
            TrendLabel::Moderate
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TrendLabel::Stable => "Stable trend: the same animals keep leading",
            TrendLabel::Moderate => "Moderate trend: some shifts among the leaders",
            TrendLabel::Volatile => "Volatile trend: the leading animals change often",
            TrendLabel::InsufficientData => "Insufficient data",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub animal: Animal,
    pub confidence: u32,
    pub reason: String,
    /// 1 = strongest.
    pub priority: usize,
}

pub const GENERIC_REASON: &str = "Combined analysis of multiple algorithms";
pub const CYCLE_NOTE: &str = " + cyclical pattern detected";

pub fn recommendations(top: &[CombinedPrediction], cycles: &[Cycle]) -> Vec<Recommendation> {
    top.iter()
        .enumerate()
        .map(|(i, prediction)| {
            let mut reason = prediction
                .reasons
                .first()
                .cloned()
                .unwrap_or_else(|| GENERIC_REASON.to_string());
            if cycles.iter().any(|c| c.animal == prediction.animal) {
                reason.push_str(CYCLE_NOTE);
            }

            Recommendation {
                animal: prediction.animal,
                confidence: prediction.confidence,
                reason,
                priority: i + 1,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CyclePeriod;
    use crate::config::EnsembleWeights;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn candidate(algorithm: Algorithm, animal: Animal, probability: Decimal, confidence: Decimal) -> Candidate {
        Candidate::new(algorithm, animal, probability, confidence, format!("{} says {}", algorithm, animal))
    }

    fn stat(animal: Animal) -> AggregatedStat {
        AggregatedStat {
            animal,
            count: 1,
            percentage: dec!(1),
            last_occurrence: NaiveDate::from_ymd_opt(2024, 5, 16).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    fn prediction(animal: Animal, probability: Decimal, algorithms: Vec<Algorithm>) -> CombinedPrediction {
        CombinedPrediction {
            animal,
            probability,
            confidence: 60,
            reasons: Vec::new(),
            algorithms,
        }
    }

    #[test]
    fn test_single_algorithm_scaled_by_weight() {
        let weights = EnsembleWeights::default();
        let combined = combine(&[(
            vec![candidate(Algorithm::Sequential, Animal::Cat, dec!(10), dec!(75))],
            Algorithm::Sequential.weight(&weights),
        )]);

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].probability, dec!(1.50));
        // 75 × 0.15 = 11.25
        assert_eq!(combined[0].confidence, 11);
        assert_eq!(combined[0].algorithms, vec![Algorithm::Sequential]);
    }

    #[test]
    fn test_accumulates_across_algorithms() {
        let combined = combine(&[
            (
                vec![candidate(Algorithm::InverseFrequency, Animal::Fox, dec!(1.94), dec!(70))],
                dec!(0.25),
            ),
            (
                vec![candidate(Algorithm::Temporal, Animal::Fox, dec!(4), dec!(65))],
                dec!(0.25),
            ),
        ]);

        // 0.485 + 1.0 = 1.485 → 1.49
        assert_eq!(combined[0].probability, dec!(1.49));
        // 17.5 + 16.25 = 33.75 → 34
        assert_eq!(combined[0].confidence, 34);
        assert_eq!(combined[0].reasons.len(), 2);
        assert_eq!(
            combined[0].algorithms,
            vec![Algorithm::InverseFrequency, Algorithm::Temporal]
        );
    }

    #[test]
    fn test_sorted_with_first_seen_ties() {
        let combined = combine(&[
            (
                vec![
                    candidate(Algorithm::Trend, Animal::Dog, dec!(4), dec!(60)),
                    candidate(Algorithm::Trend, Animal::Lion, dec!(8), dec!(60)),
                ],
                dec!(0.5),
            ),
            (
                vec![candidate(Algorithm::Temporal, Animal::Cat, dec!(4), dec!(60))],
                dec!(0.5),
            ),
        ]);

        let order: Vec<_> = combined.iter().map(|p| p.animal).collect();
        assert_eq!(order, vec![Animal::Lion, Animal::Dog, Animal::Cat]);
        assert!(combined.windows(2).all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_model_confidence() {
        let settings = ForecastSettings::default();
        assert_eq!(model_confidence(&[], &settings), 0);

        // 40 + 10 + min(20, 10 × 2)
        let single = vec![prediction(Animal::Cat, dec!(2), vec![Algorithm::Trend])];
        assert_eq!(model_confidence(&single, &settings), 70);

        // 40 + 20 + 2 × 1.5 = 63
        let pair = vec![
            prediction(Animal::Cat, dec!(2), vec![Algorithm::Trend, Algorithm::Temporal, Algorithm::Trend]),
            prediction(Animal::Dog, dec!(0.5), vec![Algorithm::Trend]),
        ];
        assert_eq!(model_confidence(&pair, &settings), 63);

        // Clamped to the ceiling
        let strong = vec![
            prediction(Animal::Cat, dec!(30), Algorithm::ALL.to_vec()),
            prediction(Animal::Dog, dec!(0), vec![Algorithm::Trend]),
        ];
        assert_eq!(model_confidence(&strong, &settings), 85);
    }

    #[test]
    fn test_trend_label_overlap() {
        use Animal::*;
        let settings = ForecastSettings::default();
        let long: Vec<_> = [Lion, Tiger, Eagle, Cat, Dog].into_iter().map(stat).collect();

        let stable: Vec<_> = [Tiger, Lion, Eagle, Cat, Fox].into_iter().map(stat).collect();
        assert_eq!(TrendLabel::classify(&stable, &long, &settings), TrendLabel::Stable);

        let moderate: Vec<_> = [Lion, Tiger, Eagle, Fox, Ram].into_iter().map(stat).collect();
        assert_eq!(TrendLabel::classify(&moderate, &long, &settings), TrendLabel::Moderate);

        let volatile: Vec<_> = [Lion, Tiger, Fox, Ram, Cow].into_iter().map(stat).collect();
        assert_eq!(TrendLabel::classify(&volatile, &long, &settings), TrendLabel::Volatile);

        assert_eq!(
            TrendLabel::classify(&[], &long, &settings),
            TrendLabel::InsufficientData
        );
    }

    #[test]
    fn test_recommendations_note_cycles() {
        let mut top = vec![
            prediction(Animal::Cat, dec!(3), vec![Algorithm::Trend]),
            prediction(Animal::Dog, dec!(2), vec![Algorithm::Trend]),
        ];
        top[0].reasons.push("Positive trend: +50.0%".to_string());
        let cycles = vec![Cycle {
            animal: Animal::Dog,
            period: CyclePeriod::ThreeDay,
            confidence: 80,
            next_expected: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
        }];

        let recs = recommendations(&top, &cycles);
        assert_eq!(recs[0].reason, "Positive trend: +50.0%");
        assert_eq!(recs[0].priority, 1);
        assert_eq!(recs[1].reason, format!("{}{}", GENERIC_REASON, CYCLE_NOTE));
        assert_eq!(recs[1].priority, 2);
    }
}
