use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

use super::{mine_triplets, HistoryStore};
use crate::error::StoreError;
use crate::types::{
    AggregatedStat, Animal, DailyCount, DateRange, HourlyCount, Outcome, SequentialPattern,
    WeekdayCount,
};

/// Draw history held in memory, sorted chronologically on construction.
/// Used for replaying fixtures and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    outcomes: Vec<Outcome>,
}

impl InMemoryHistory {
    pub fn new(mut outcomes: Vec<Outcome>) -> Self {
        // Stable: draws sharing a timestamp keep insertion order
        outcomes.sort_by_key(|o| o.drawn_at());
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn in_range(&self, range: DateRange) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(move |o| range.contains(o.drawn_at()))
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn aggregated_stats(&self, range: DateRange) -> Result<Vec<AggregatedStat>, StoreError> {
        let mut by_animal: BTreeMap<Animal, (u64, NaiveDateTime)> = BTreeMap::new();
        for outcome in self.in_range(range) {
            let entry = by_animal
                .entry(outcome.animal)
                .or_insert((0, outcome.drawn_at()));
            entry.0 += 1;
            entry.1 = entry.1.max(outcome.drawn_at());
        }

        let rows = by_animal
            .into_iter()
            .map(|(animal, (count, last))| (animal, count, last))
            .collect();
        Ok(AggregatedStat::rank(rows))
    }

    async fn frequency_by_hour(&self, range: DateRange) -> Result<Vec<HourlyCount>, StoreError> {
        let mut grouped: BTreeMap<(u32, Animal), u64> = BTreeMap::new();
        for outcome in self.in_range(range) {
            *grouped.entry((outcome.time.hour(), outcome.animal)).or_default() += 1;
        }

        let mut counts: Vec<HourlyCount> = grouped
            .into_iter()
            .map(|((hour, animal), count)| HourlyCount { hour, animal, count })
            .collect();
        counts.sort_by(|a, b| a.hour.cmp(&b.hour).then_with(|| b.count.cmp(&a.count)));
        Ok(counts)
    }

    async fn frequency_by_day(&self, range: DateRange) -> Result<Vec<WeekdayCount>, StoreError> {
        let mut grouped: BTreeMap<(u32, Animal), u64> = BTreeMap::new();
        for outcome in self.in_range(range) {
            let day = outcome.date.weekday().num_days_from_sunday();
            *grouped.entry((day, outcome.animal)).or_default() += 1;
        }

        let mut counts: Vec<WeekdayCount> = grouped
            .into_iter()
            .map(|((day_of_week, animal), count)| WeekdayCount {
                day_of_week,
                animal,
                count,
            })
            .collect();
        counts.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then_with(|| b.count.cmp(&a.count))
        });
        Ok(counts)
    }

    async fn daily_counts(
        &self,
        range: DateRange,
        animal: Option<Animal>,
    ) -> Result<Vec<DailyCount>, StoreError> {
        let mut grouped = BTreeMap::new();
        for outcome in self
            .in_range(range)
            .filter(|o| animal.map_or(true, |a| a == o.animal))
        {
            *grouped.entry((outcome.date, outcome.animal)).or_insert(0u64) += 1;
        }

        Ok(grouped
            .into_iter()
            .map(|((date, animal), count)| DailyCount { date, animal, count })
            .collect())
    }

    async fn sequential_patterns(
        &self,
        sample_size: usize,
        min_frequency: u32,
    ) -> Result<Vec<SequentialPattern>, StoreError> {
        let skip = self.outcomes.len().saturating_sub(sample_size.saturating_add(2));
        let animals: Vec<Animal> = self.outcomes[skip..].iter().map(|o| o.animal).collect();
        Ok(mine_triplets(&animals, min_frequency))
    }

    async fn last_occurrence(&self, animal: Animal) -> Result<Option<Outcome>, StoreError> {
        Ok(self.outcomes.iter().rev().find(|o| o.animal == animal).cloned())
    }

    async fn recent_outcomes(&self, limit: usize) -> Result<Vec<Outcome>, StoreError> {
        Ok(self.outcomes.iter().rev().take(limit).cloned().collect())
    }
}
