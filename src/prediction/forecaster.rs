use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::ensemble::{combine, model_confidence, recommendations, CombinedPrediction, Recommendation, TrendLabel};
use super::{
    CyclicalScorer, ForecastInputs, InverseFrequencyScorer, Scorer, SequentialScorer,
    TemporalScorer, TrendScorer,
};
use crate::analysis::PatternAnalyzer;
use crate::config::EngineConfig;
use crate::database::HistoryStore;
use crate::error::StoreError;
use crate::types::{AnimalCatalog, DateRange, TimeWindow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub next_draw: Vec<CombinedPrediction>,
    pub recommendations: Vec<Recommendation>,
    pub trend: TrendLabel,
    pub model_confidence: u32,
    pub timestamp: NaiveDateTime,
}

/// Gathers the aggregated history, runs every scorer and merges the results.
pub struct Forecaster {
    store: Arc<dyn HistoryStore>,
    catalog: Arc<AnimalCatalog>,
    config: EngineConfig,
    analyzer: PatternAnalyzer,
    scorers: Vec<Box<dyn Scorer>>,
}

impl Forecaster {
    pub fn new(store: Arc<dyn HistoryStore>, catalog: Arc<AnimalCatalog>, config: EngineConfig) -> Self {
        let analyzer = PatternAnalyzer::new(store.clone(), catalog.clone(), config.clone());
        let scorers: Vec<Box<dyn Scorer>> = vec![
            Box::new(InverseFrequencyScorer::new(config.inverse_frequency.clone())),
            Box::new(CyclicalScorer::new(config.cyclical.clone())),
            Box::new(SequentialScorer::new(config.sequential.clone())),
            Box::new(TemporalScorer::new(config.temporal.clone())),
            Box::new(TrendScorer::new(config.trend.clone())),
        ];

        Self {
            store,
            catalog,
            config,
            analyzer,
            scorers,
        }
    }

    pub async fn generate_forecast(&self) -> Forecast {
        self.generate_forecast_at(Local::now().naive_local()).await
    }

    /// Never fails: an input that cannot be fetched is treated as empty and
    /// its scorer contributes nothing.
    pub async fn generate_forecast_at(&self, now: NaiveDateTime) -> Forecast {
        let inputs = self.gather(now).await;

        let lists: Vec<_> = self
            .scorers
            .iter()
            .map(|scorer| {
                let candidates = scorer.score(&inputs);
                debug!("{} produced {} candidates", scorer.algorithm(), candidates.len());
                (candidates, scorer.algorithm().weight(&self.config.weights))
            })
            .collect();

        let combined = combine(&lists);
        let settings = &self.config.forecast;

        let recommendations = recommendations(
            &combined[..combined.len().min(settings.recommendation_count)],
            &inputs.cycles,
        );
        let model_confidence = model_confidence(&combined, settings);
        let trend = TrendLabel::classify(&inputs.recent_stats, &inputs.weekly_stats, settings);

        let next_draw: Vec<CombinedPrediction> =
            combined.into_iter().take(settings.next_draw_size).collect();

        info!(
            "Forecast: {} candidates, model confidence {}, trend {:?}",
            next_draw.len(),
            model_confidence,
            trend
        );

        Forecast {
            next_draw,
            recommendations,
            trend,
            model_confidence,
            timestamp: now,
        }
    }

    async fn gather(&self, now: NaiveDateTime) -> ForecastInputs {
        let recent_range = TimeWindow::RecentDays.resolve(now);
        let weekly_range = TimeWindow::ThisWeek.resolve(now);
        let trend_range = DateRange::days(
            now.date() - Duration::days(self.config.trend.days as i64 - 1),
            now.date(),
        );
        let sequential = &self.config.sequential;

        let (recent_stats, weekly_stats, report, sequences, last_outcomes, hourly, weekdays, trend_days) = tokio::join!(
            self.store.aggregated_stats(recent_range),
            self.store.aggregated_stats(weekly_range),
            self.analyzer.analyze_at(TimeWindow::RecentDays, None, now),
            self.store
                .sequential_patterns(sequential.sample_size, sequential.min_frequency),
            self.store.recent_outcomes(2),
            self.store.frequency_by_hour(weekly_range),
            self.store.frequency_by_day(weekly_range),
            self.store.daily_counts(trend_range, None),
        );

        ForecastInputs {
            now,
            catalog: self.catalog.clone(),
            recent_stats: or_empty(recent_stats, "recent stats"),
            weekly_stats: or_empty(weekly_stats, "weekly stats"),
            cycles: report.cycles,
            sequences: or_empty(sequences, "sequential patterns"),
            last_outcomes: or_empty(last_outcomes, "recent outcomes"),
            hourly: or_empty(hourly, "hourly frequency"),
            weekdays: or_empty(weekdays, "weekday frequency"),
            trend_days: or_empty(trend_days, "daily counts"),
        }
    }
}

fn or_empty<T>(result: Result<Vec<T>, StoreError>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Failed to load {} for forecast: {}", what, e);
        Vec::new()
    })
}
