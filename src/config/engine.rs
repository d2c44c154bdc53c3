use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Every weight, cap and threshold the analyzer and the ensemble use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: EnsembleWeights,
    pub inverse_frequency: InverseFrequencySettings,
    pub cyclical: CyclicalSettings,
    pub sequential: SequentialSettings,
    pub temporal: TemporalSettings,
    pub trend: TrendSettings,
    pub cycles: CycleSettings,
    pub forecast: ForecastSettings,
    pub analyzer: AnalyzerSettings,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Ensemble weights
        if self.weights.total() != Decimal::ONE {
            errors.push(format!("ensemble weights must sum to 1, got {}", self.weights.total()));
        }
        for (name, weight) in self.weights.entries() {
            if weight < Decimal::ZERO {
                errors.push(format!("weight '{}' must be >= 0", name));
            }
        }

        // Per-algorithm caps
        for (name, cap) in [
            ("inverse_frequency.cap", self.inverse_frequency.cap),
            ("sequential.probability_cap", self.sequential.probability_cap),
            ("temporal.cap", self.temporal.cap),
            ("trend.cap", self.trend.cap),
        ] {
            if cap <= Decimal::ZERO {
                errors.push(format!("{} must be > 0", name));
            }
        }

        // Cycle detection
        if self.cycles.min_confidence > 100 {
            errors.push("cycles.min_confidence must be between 0 and 100".to_string());
        }
        if self.cycles.weekly_min_observations < self.cycles.min_observations {
            errors.push("cycles.weekly_min_observations must be >= cycles.min_observations".to_string());
        }

        // Sequential mining
        if self.sequential.sample_size < 3 {
            errors.push("sequential.sample_size must be >= 3".to_string());
        }

        // Forecast shape
        if self.forecast.recommendation_count > self.forecast.next_draw_size {
            errors.push("forecast.recommendation_count must be <= forecast.next_draw_size".to_string());
        }
        if self.forecast.confidence_floor > self.forecast.confidence_ceiling {
            errors.push("forecast.confidence_floor must be <= forecast.confidence_ceiling".to_string());
        }
        if self.forecast.volatile_overlap >= self.forecast.stable_overlap {
            errors.push("forecast.volatile_overlap must be < forecast.stable_overlap".to_string());
        }

        if self.trend.days < 2 {
            errors.push("trend.days must be >= 2".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Contribution of each scorer to the combined forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    pub inverse_frequency: Decimal,
    pub cyclical: Decimal,
    pub sequential: Decimal,
    pub temporal: Decimal,
    pub trend: Decimal,
}

impl EnsembleWeights {
    pub fn total(&self) -> Decimal {
        self.inverse_frequency + self.cyclical + self.sequential + self.temporal + self.trend
    }

    pub fn entries(&self) -> [(&'static str, Decimal); 5] {
        [
            ("inverse_frequency", self.inverse_frequency),
            ("cyclical", self.cyclical),
            ("sequential", self.sequential),
            ("temporal", self.temporal),
            ("trend", self.trend),
        ]
    }
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            inverse_frequency: dec!(0.25),
            cyclical: dec!(0.20),
            sequential: dec!(0.15),
            temporal: dec!(0.25),
            trend: dec!(0.15),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InverseFrequencySettings {
    /// Draws per animal expected over a week: 7 / 36.
    pub expected_weekly_frequency: Decimal,
    pub scale: Decimal,
    pub cap: Decimal,
    /// Candidates at or below this probability are dropped.
    pub min_probability: Decimal,
    pub confidence: Decimal,
}

impl Default for InverseFrequencySettings {
    fn default() -> Self {
        Self {
            expected_weekly_frequency: Decimal::from(7) / Decimal::from(36),
            scale: dec!(10),
            cap: dec!(15),
            min_probability: dec!(1),
            confidence: dec!(70),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CyclicalSettings {
    /// Cycles due within `[today, today + lookahead_days]` are scored.
    pub lookahead_days: i64,
    pub min_probability: Decimal,
    pub confidence_divisor: Decimal,
}

impl Default for CyclicalSettings {
    fn default() -> Self {
        Self {
            lookahead_days: 2,
            min_probability: dec!(5),
            confidence_divisor: dec!(10),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequentialSettings {
    /// Trailing draws mined for triplets.
    pub sample_size: usize,
    pub min_frequency: u32,
    pub probability_per_occurrence: Decimal,
    pub probability_cap: Decimal,
    pub confidence_per_occurrence: Decimal,
    pub confidence_cap: Decimal,
}

impl Default for SequentialSettings {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            min_frequency: 2,
            probability_per_occurrence: dec!(2),
            probability_cap: dec!(12),
            confidence_per_occurrence: dec!(15),
            confidence_cap: dec!(80),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalSettings {
    pub hour_weight: Decimal,
    pub day_weight: Decimal,
    pub cap: Decimal,
    /// Candidates at or below this probability are dropped.
    pub min_probability: Decimal,
    pub confidence: Decimal,
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            hour_weight: dec!(0.6),
            day_weight: dec!(0.4),
            cap: dec!(10),
            min_probability: dec!(2),
            confidence: dec!(65),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// Length of the daily series fed to the regression.
    pub days: usize,
    /// Slopes at or below this are ignored.
    pub min_slope: Decimal,
    pub scale: Decimal,
    pub cap: Decimal,
    pub confidence: Decimal,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            days: 7,
            min_slope: dec!(0.1),
            scale: dec!(10),
            cap: dec!(8),
            confidence: dec!(60),
        }
    }
}

/// How the cycle detector pairs up observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapMode {
    /// Gap between each observation and the one before it.
    Consecutive,
    /// Gap between observation `i` and observation `i - period`. The default.
    Lagged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleSettings {
    pub tolerance_days: i64,
    pub min_confidence: u32,
    /// Observations required before the 3-day check runs.
    pub min_observations: usize,
    /// Observations required before the weekly check runs.
    pub weekly_min_observations: usize,
    pub gap_mode: GapMode,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            tolerance_days: 1,
            min_confidence: 60,
            min_observations: 3,
            weekly_min_observations: 7,
            gap_mode: GapMode::Lagged,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub next_draw_size: usize,
    pub recommendation_count: usize,

    // Model confidence heuristic
    pub confidence_base: i64,
    pub confidence_per_algorithm: i64,
    pub spread_factor: Decimal,
    pub spread_cap: Decimal,
    /// Spread assumed when the forecast has a single entry.
    pub single_entry_spread: Decimal,
    pub confidence_floor: i64,
    pub confidence_ceiling: i64,

    // Trend label
    pub trend_top_n: usize,
    pub stable_overlap: usize,
    pub volatile_overlap: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            next_draw_size: 10,
            recommendation_count: 5,
            confidence_base: 40,
            confidence_per_algorithm: 10,
            spread_factor: dec!(2),
            spread_cap: dec!(20),
            single_entry_spread: dec!(10),
            confidence_floor: 30,
            confidence_ceiling: 85,
            trend_top_n: 5,
            stable_overlap: 4,
            volatile_overlap: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Silence longer than this suggests the animal "may be due".
    pub due_after_days: i64,
    /// Appearances more recent than this suggest watching for a repeat.
    pub recent_within_days: i64,
    pub high_share_pct: Decimal,
    pub low_share_pct: Decimal,
    pub top_sequences: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            due_after_days: 7,
            recent_within_days: 2,
            high_share_pct: dec!(5),
            low_share_pct: dec!(1),
            top_sequences: 3,
        }
    }
}
