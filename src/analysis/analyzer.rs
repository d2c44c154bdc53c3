use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cycle::CycleDetector;
use super::cyclical::{describe_cycles, detect_cycles};
use super::frequency::{analyze_animal, analyze_frequency, AnimalSnapshot};
use super::report::PatternReport;
use super::sequence::analyze_sequences;
use super::timing::{analyze_daily, analyze_hourly};
use crate::config::EngineConfig;
use crate::database::HistoryStore;
use crate::error::{AnalysisError, StoreError};
use crate::types::{AggregatedStat, Animal, AnimalCatalog, DateRange, TimeWindow};

/// Builds the descriptive report for a window, optionally drilling into one animal.
pub struct PatternAnalyzer {
    store: Arc<dyn HistoryStore>,
    catalog: Arc<AnimalCatalog>,
    config: EngineConfig,
    detector: CycleDetector,
}

impl PatternAnalyzer {
    pub fn new(store: Arc<dyn HistoryStore>, catalog: Arc<AnimalCatalog>, config: EngineConfig) -> Self {
        let detector = CycleDetector::new(&config.cycles);
        Self {
            store,
            catalog,
            config,
            detector,
        }
    }

    pub async fn analyze(&self, window: TimeWindow, animal: Option<Animal>) -> PatternReport {
        self.analyze_at(window, animal, Local::now().naive_local()).await
    }

    /// Never fails: store errors and empty windows degrade to
    /// [`PatternReport::failed`].
    pub async fn analyze_at(
        &self,
        window: TimeWindow,
        animal: Option<Animal>,
        now: NaiveDateTime,
    ) -> PatternReport {
        match self.try_analyze(window, animal, now).await {
            Ok(report) => {
                info!(
                    "Analyzed {}: {} patterns, {} insights, {} cycles",
                    window,
                    report.detected_patterns.len(),
                    report.insights.len(),
                    report.cycles.len()
                );
                report
            }
            Err(e) => {
                warn!("Pattern analysis for {} failed: {}", window, e);
                PatternReport::failed()
            }
        }
    }

    async fn try_analyze(
        &self,
        window: TimeWindow,
        animal: Option<Animal>,
        now: NaiveDateTime,
    ) -> Result<PatternReport, AnalysisError> {
        let range = window.resolve(now);
        debug!("Resolved {} to {} .. {}", window, range.start, range.end);

        let sequential = &self.config.sequential;
        let (stats, hourly, weekdays, sequences, daily) = tokio::try_join!(
            self.store.aggregated_stats(range),
            self.store.frequency_by_hour(range),
            self.store.frequency_by_day(range),
            self.store
                .sequential_patterns(sequential.sample_size, sequential.min_frequency),
            self.store.daily_counts(range, None),
        )?;

        if stats.is_empty() {
            return Err(AnalysisError::EmptyWindow(window));
        }

        let catalog = self.catalog.as_ref();
        let mut report = PatternReport::default();
        report.merge(analyze_frequency(&stats, window, catalog));
        report.merge(analyze_hourly(&hourly));
        report.merge(analyze_daily(&weekdays));
        report.merge(analyze_sequences(
            &sequences,
            self.config.analyzer.top_sequences,
            catalog,
        ));

        let cycles = detect_cycles(&daily, &self.detector, &self.config.cycles, catalog);
        report.merge(describe_cycles(&cycles, catalog));
        report.cycles = cycles;

        if let Some(animal) = animal {
            match self.animal_snapshot(animal, range, &stats).await {
                Ok(snapshot) => report.merge(analyze_animal(
                    &snapshot,
                    window,
                    now,
                    &self.config.analyzer,
                    catalog,
                )),
                Err(e) => warn!("Skipping {} drill-down: {}", animal, e),
            }
        }

        Ok(report)
    }

    async fn animal_snapshot(
        &self,
        animal: Animal,
        range: DateRange,
        stats: &[AggregatedStat],
    ) -> Result<AnimalSnapshot, StoreError> {
        let (last_seen, daily) = tokio::try_join!(
            self.store.last_occurrence(animal),
            self.store.daily_counts(range, Some(animal)),
        )?;

        Ok(AnimalSnapshot {
            animal,
            last_seen,
            stat: stats.iter().find(|s| s.animal == animal).cloned(),
            daily,
        })
    }
}
