use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CycleSettings, GapMode};
use crate::types::Animal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePeriod {
    ThreeDay,
    Weekly,
}

impl CyclePeriod {
    pub fn days(&self) -> i64 {
        match self {
            CyclePeriod::ThreeDay => 3,
            CyclePeriod::Weekly => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePeriod::ThreeDay => "3-day",
            CyclePeriod::Weekly => "weekly",
        }
    }
}

impl fmt::Display for CyclePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected recurrence hypothesis for one animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub animal: Animal,
    pub period: CyclePeriod,
    /// 0..=100
    pub confidence: u32,
    pub next_expected: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDetection {
    pub detected: bool,
    pub confidence: u32,
    pub next_expected: Option<NaiveDate>,
}

impl CycleDetection {
    fn none() -> Self {
        Self {
            detected: false,
            confidence: 0,
            next_expected: None,
        }
    }
}

/// Scores how well a date series fits a fixed recurrence period.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    tolerance_days: i64,
    min_confidence: u32,
    gap_mode: GapMode,
}

impl CycleDetector {
    pub fn new(settings: &CycleSettings) -> Self {
        Self {
            tolerance_days: settings.tolerance_days,
            min_confidence: settings.min_confidence,
            gap_mode: settings.gap_mode,
        }
    }

    /// Compare gaps in the (chronologically sorted) series with `period_days`.
    /// In lagged mode entry `i` is paired with entry `i - period_days`. A gap
    /// matches when it is within the tolerance of the period; confidence is
    /// the rounded match percentage.
    pub fn detect(&self, series: &[NaiveDate], period_days: i64) -> CycleDetection {
        if period_days <= 0 || series.is_empty() {
            return CycleDetection::none();
        }

        let mut dates = series.to_vec();
        dates.sort();

        let offset = match self.gap_mode {
            GapMode::Consecutive => 1,
            GapMode::Lagged => period_days as usize,
        };

        let mut matches = 0u32;
        let mut total = 0u32;
        for i in offset..dates.len() {
            let gap = (dates[i] - dates[i - offset]).num_days();
            total += 1;
            if (gap - period_days).abs() <= self.tolerance_days {
                matches += 1;
            }
        }

        let confidence = match_confidence(matches, total);
        let detected = total > 0 && confidence >= self.min_confidence;
        let next_expected = if detected {
            dates.last().map(|last| *last + Duration::days(period_days))
        } else {
            None
        };

        CycleDetection {
            detected,
            confidence,
            next_expected,
        }
    }

    pub fn detect_period(&self, animal: Animal, series: &[NaiveDate], period: CyclePeriod) -> Option<Cycle> {
        let detection = self.detect(series, period.days());
        match (detection.detected, detection.next_expected) {
            (true, Some(next_expected)) => Some(Cycle {
                animal,
                period,
                confidence: detection.confidence,
                next_expected,
            }),
            _ => None,
        }
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(&CycleSettings::default())
    }
}

/// round(matches / total × 100), half away from zero.
pub fn match_confidence(matches: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (200 * matches + total) / (2 * total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day_offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(day_offset)
    }

    fn consecutive() -> CycleDetector {
        CycleDetector::new(&CycleSettings {
            gap_mode: GapMode::Consecutive,
            ..CycleSettings::default()
        })
    }

    fn series_from_gaps(gaps: &[i64]) -> Vec<NaiveDate> {
        let mut dates = vec![d(0)];
        let mut offset = 0;
        for gap in gaps {
            offset += gap;
            dates.push(d(offset));
        }
        dates
    }

    #[test]
    fn test_weekly_cycle_three_of_four_gaps() {
        let detector = consecutive();
        // 9 is outside the ±1 tolerance
        let series = series_from_gaps(&[7, 9, 6, 7]);
        let result = detector.detect(&series, 7);

        assert_eq!(result.confidence, 75);
        assert!(result.detected);
        assert_eq!(result.next_expected, Some(d(29 + 7)));
    }

    #[test]
    fn test_all_gaps_within_tolerance() {
        let detector = consecutive();
        let result = detector.detect(&series_from_gaps(&[7, 8, 6, 7]), 7);
        assert_eq!(result.confidence, 100);
        assert!(result.detected);
    }

    #[test]
    fn test_threshold_boundary() {
        // 3 of 5 → 60
        let at_threshold = match_confidence(3, 5);
        assert_eq!(at_threshold, 60);
        // 13 of 22 → 59.09 → 59
        let below = match_confidence(13, 22);
        assert_eq!(below, 59);

        let detector = consecutive();
        let sixty = detector.detect(&series_from_gaps(&[3, 3, 3, 9, 9]), 3);
        assert_eq!(sixty.confidence, 60);
        assert!(sixty.detected);

        let mut gaps = vec![3; 13];
        gaps.extend(vec![10; 9]);
        let fifty_nine = detector.detect(&series_from_gaps(&gaps), 3);
        assert_eq!(fifty_nine.confidence, 59);
        assert!(!fifty_nine.detected);
        assert!(fifty_nine.next_expected.is_none());
    }

    #[test]
    fn test_confidence_monotonic_in_matches() {
        let total = 20;
        let mut previous = None;
        for matches in 0..=total {
            let confidence = match_confidence(matches, total);
            if let Some(prev) = previous {
                assert!(confidence > prev);
            }
            previous = Some(confidence);
        }
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let detector = consecutive();
        let mut series = series_from_gaps(&[3, 3, 3]);
        series.reverse();
        let result = detector.detect(&series, 3);
        assert_eq!(result.confidence, 100);
        assert_eq!(result.next_expected, Some(d(12)));
    }

    #[test]
    fn test_single_observation_not_detected() {
        let detector = CycleDetector::default();
        let result = detector.detect(&[d(0)], 3);
        assert!(!result.detected);
        assert_eq!(result.confidence, 0);
    }

    #[test]
    fn test_default_compares_period_offset() {
        let detector = CycleDetector::default();
        // Daily series: entry i and entry i-3 are three days apart
        let daily: Vec<_> = (0..8).map(d).collect();
        let result = detector.detect(&daily, 3);
        assert!(result.detected);
        assert_eq!(result.confidence, 100);
        assert_eq!(result.next_expected, Some(d(10)));

        // Fewer entries than the period gives nothing to compare
        assert!(!detector.detect(&daily[..3], 3).detected);
    }

    #[test]
    fn test_consecutive_mode_rejects_daily_series() {
        let daily: Vec<_> = (0..8).map(d).collect();
        let result = consecutive().detect(&daily, 3);
        assert!(!result.detected);
        assert_eq!(result.confidence, 0);
        assert!(result.next_expected.is_none());
    }

    #[test]
    fn test_default_repeated_dates_pair_by_index() {
        // Two draws on each of four days, three days apart. Lagged pairs give
        // gaps 3, 6, 3, 6, 3.
        let series: Vec<_> = [0, 0, 3, 3, 6, 6, 9, 9].iter().map(|o| d(*o)).collect();
        let result = CycleDetector::default().detect(&series, 3);
        assert_eq!(result.confidence, 60);
        assert!(result.detected);
        assert_eq!(result.next_expected, Some(d(12)));
    }

    #[test]
    fn test_detect_period_builds_cycle() {
        let detector = consecutive();
        let cycle = detector
            .detect_period(Animal::Fox, &series_from_gaps(&[7, 7, 7]), CyclePeriod::Weekly)
            .unwrap();
        assert_eq!(cycle.animal, Animal::Fox);
        assert_eq!(cycle.period.as_str(), "weekly");
        assert_eq!(cycle.next_expected, d(28));
    }
}
