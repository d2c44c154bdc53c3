use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::Animal;

/// One recorded draw. Never mutated once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub draw_number: String,
    pub animal: Animal,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Outcome {
    pub fn new(draw_number: impl Into<String>, animal: Animal, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            draw_number: draw_number.into(),
            animal,
            date,
            time,
        }
    }

    pub fn drawn_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Per-animal totals for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStat {
    pub animal: Animal,
    pub count: u64,
    /// Share of the window, rounded to two decimals.
    pub percentage: Decimal,
    pub last_occurrence: NaiveDateTime,
}

impl AggregatedStat {
    /// Turn raw `(animal, count, last seen)` rows into ranked stats.
    /// Ranked by count descending, ties by draw number.
    pub fn rank(rows: Vec<(Animal, u64, NaiveDateTime)>) -> Vec<AggregatedStat> {
        let total: u64 = rows.iter().map(|(_, count, _)| count).sum();

        let mut stats: Vec<AggregatedStat> = rows
            .into_iter()
            .map(|(animal, count, last_occurrence)| AggregatedStat {
                animal,
                count,
                percentage: share_of(count, total),
                last_occurrence,
            })
            .collect();

        stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.animal.number().cmp(&b.animal.number()))
        });
        stats
    }
}

pub(crate) fn share_of(count: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(total))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    /// 0..=23
    pub hour: u32,
    pub animal: Animal,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCount {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u32,
    pub animal: Animal,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub animal: Animal,
    pub count: u64,
}

/// `prev_2 → prev_1 → current`, observed `frequency` times in the trailing sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialPattern {
    pub prev_2: Animal,
    pub prev_1: Animal,
    pub current: Animal,
    pub frequency: u32,
}

impl SequentialPattern {
    /// Some animal appears more than once in the triplet, adjacent or not.
    pub fn has_repeat(&self) -> bool {
        self.prev_2 == self.prev_1 || self.prev_1 == self.current || self.prev_2 == self.current
    }

    pub fn animals(&self) -> [Animal; 3] {
        [self.prev_2, self.prev_1, self.current]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap().and_hms_opt(10, 0, 0).unwrap()
    }

    #[test]
    fn test_rank_computes_rounded_shares() {
        let mut rows = vec![
            (Animal::Eagle, 6, ts()),
            (Animal::Lion, 10, ts()),
            (Animal::Tiger, 8, ts()),
        ];
        rows.push((Animal::Cat, 3, ts()));
        rows.push((Animal::Dog, 3, ts()));

        let stats = AggregatedStat::rank(rows);
        assert_eq!(stats[0].animal, Animal::Lion);
        assert_eq!(stats[0].percentage, dec!(33.33));
        assert_eq!(stats[1].percentage, dec!(26.67));
        assert_eq!(stats[2].percentage, dec!(20.00));
        // Cat (11) ranks before Dog (27) on a tie
        assert_eq!(stats[3].animal, Animal::Cat);
        assert_eq!(stats[4].animal, Animal::Dog);
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let rows: Vec<_> = Animal::ALL
            .iter()
            .take(7)
            .enumerate()
            .map(|(i, &a)| (a, (i as u64) + 1, ts()))
            .collect();
        let total: Decimal = AggregatedStat::rank(rows).iter().map(|s| s.percentage).sum();
        assert!((total - dec!(100)).abs() <= dec!(0.05));
    }

    #[test]
    fn test_share_of_empty_total() {
        assert_eq!(share_of(0, 0), Decimal::ZERO);
    }

    #[test]
    fn test_repeat_adjacent_or_skipped() {
        let repeat = SequentialPattern {
            prev_2: Animal::Cat,
            prev_1: Animal::Cat,
            current: Animal::Dog,
            frequency: 2,
        };
        let skip = SequentialPattern {
            prev_2: Animal::Cat,
            prev_1: Animal::Dog,
            current: Animal::Cat,
            frequency: 2,
        };
        let distinct = SequentialPattern {
            prev_2: Animal::Cat,
            prev_1: Animal::Dog,
            current: Animal::Fox,
            frequency: 2,
        };
        assert!(repeat.has_repeat());
        assert!(skip.has_repeat());
        assert!(!distinct.has_repeat());
    }
}
