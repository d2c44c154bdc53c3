//! Next-draw forecasting: five independent scorers and the weighted ensemble.

pub mod cyclical;
pub mod ensemble;
pub mod forecaster;
pub mod inverse_frequency;
pub mod sequential;
pub mod temporal;
pub mod trend;

pub use cyclical::CyclicalScorer;
pub use ensemble::*;
pub use forecaster::*;
pub use inverse_frequency::InverseFrequencyScorer;
pub use sequential::SequentialScorer;
pub use temporal::TemporalScorer;
pub use trend::TrendScorer;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::analysis::Cycle;
use crate::config::EnsembleWeights;
use crate::types::{
    AggregatedStat, Animal, AnimalCatalog, DailyCount, HourlyCount, Outcome, SequentialPattern,
    WeekdayCount,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    InverseFrequency,
    Cyclical,
    Sequential,
    Temporal,
    Trend,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::InverseFrequency,
        Algorithm::Cyclical,
        Algorithm::Sequential,
        Algorithm::Temporal,
        Algorithm::Trend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::InverseFrequency => "inverse_frequency",
            Algorithm::Cyclical => "cyclical",
            Algorithm::Sequential => "sequential",
            Algorithm::Temporal => "temporal",
            Algorithm::Trend => "trend",
        }
    }

    pub fn weight(&self, weights: &EnsembleWeights) -> Decimal {
        match self {
            Algorithm::InverseFrequency => weights.inverse_frequency,
            Algorithm::Cyclical => weights.cyclical,
            Algorithm::Sequential => weights.sequential,
            Algorithm::Temporal => weights.temporal,
            Algorithm::Trend => weights.trend,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scorer's guess for the next draw. Probabilities from different
/// scorers are only comparable after weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub animal: Animal,
    pub probability: Decimal,
    pub confidence: Decimal,
    pub rationale: String,
    pub algorithm: Algorithm,
}

impl Candidate {
    pub fn new(
        algorithm: Algorithm,
        animal: Animal,
        probability: Decimal,
        confidence: Decimal,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            animal,
            probability,
            confidence,
            rationale: rationale.into(),
            algorithm,
        }
    }
}

/// Highest probability first; equal probabilities keep their order.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.probability.cmp(&a.probability));
}

/// Aggregated history a forecast is computed from. Fetched once per
/// request and shared read-only by every scorer.
#[derive(Debug, Clone)]
pub struct ForecastInputs {
    pub now: NaiveDateTime,
    pub catalog: Arc<AnimalCatalog>,
    /// Stats for the last 7 days.
    pub recent_stats: Vec<AggregatedStat>,
    /// Stats for the current calendar week.
    pub weekly_stats: Vec<AggregatedStat>,
    pub cycles: Vec<Cycle>,
    pub sequences: Vec<SequentialPattern>,
    /// Most recent draw first.
    pub last_outcomes: Vec<Outcome>,
    pub hourly: Vec<HourlyCount>,
    pub weekdays: Vec<WeekdayCount>,
    /// Per-day counts over the trend horizon.
    pub trend_days: Vec<DailyCount>,
}

impl ForecastInputs {
    pub fn empty(now: NaiveDateTime, catalog: Arc<AnimalCatalog>) -> Self {
        Self {
            now,
            catalog,
            recent_stats: Vec::new(),
            weekly_stats: Vec::new(),
            cycles: Vec::new(),
            sequences: Vec::new(),
            last_outcomes: Vec::new(),
            hourly: Vec::new(),
            weekdays: Vec::new(),
            trend_days: Vec::new(),
        }
    }
}

pub trait Scorer: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Candidates sorted by probability, highest first.
    fn score(&self, inputs: &ForecastInputs) -> Vec<Candidate>;
}
