//! Read side of the draw history.
//!
//! The analyzer and the forecaster only ever see aggregated rows through
//! [`HistoryStore`]; they never touch raw storage.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryHistory;
pub use sqlite::Database;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{
    AggregatedStat, Animal, DailyCount, DateRange, HourlyCount, Outcome, SequentialPattern,
    WeekdayCount,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Per-animal counts and shares, ranked by count.
    async fn aggregated_stats(&self, range: DateRange) -> Result<Vec<AggregatedStat>, StoreError>;

    /// Counts grouped by hour of day and animal, ordered by hour then count.
    async fn frequency_by_hour(&self, range: DateRange) -> Result<Vec<HourlyCount>, StoreError>;

    /// Counts grouped by weekday (0 = Sunday) and animal, ordered by day then count.
    async fn frequency_by_day(&self, range: DateRange) -> Result<Vec<WeekdayCount>, StoreError>;

    /// Per-day counts, oldest first, optionally for one animal.
    async fn daily_counts(
        &self,
        range: DateRange,
        animal: Option<Animal>,
    ) -> Result<Vec<DailyCount>, StoreError>;

    /// Triplets ending on each of the trailing `sample_size` draws, most
    /// frequent first. The two draws before the sample are read as
    /// predecessors, so a full history yields `sample_size` triplets.
    async fn sequential_patterns(
        &self,
        sample_size: usize,
        min_frequency: u32,
    ) -> Result<Vec<SequentialPattern>, StoreError>;

    async fn last_occurrence(&self, animal: Animal) -> Result<Option<Outcome>, StoreError>;

    /// Most recent draws first.
    async fn recent_outcomes(&self, limit: usize) -> Result<Vec<Outcome>, StoreError>;
}

/// Group a chronological draw sequence into triplets.
/// Shared by both stores so their ordering rules cannot drift apart.
pub(crate) fn mine_triplets(animals: &[Animal], min_frequency: u32) -> Vec<SequentialPattern> {
    let mut patterns: Vec<SequentialPattern> = Vec::new();

    for window in animals.windows(3) {
        let (prev_2, prev_1, current) = (window[0], window[1], window[2]);
        match patterns
            .iter_mut()
            .find(|p| p.prev_2 == prev_2 && p.prev_1 == prev_1 && p.current == current)
        {
            Some(existing) => existing.frequency += 1,
            None => patterns.push(SequentialPattern {
                prev_2,
                prev_1,
                current,
                frequency: 1,
            }),
        }
    }

    patterns.retain(|p| p.frequency >= min_frequency);
    // Stable sort keeps first-occurrence order among equal frequencies
    patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    patterns
}
