use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::cycle::{Cycle, CycleDetector, CyclePeriod};
use super::report::Findings;
use crate::config::CycleSettings;
use crate::types::{Animal, AnimalCatalog, DailyCount};

/// One date per draw for each animal, oldest first. A day with three draws of
/// the same animal contributes three entries.
pub fn observation_dates(daily: &[DailyCount]) -> BTreeMap<Animal, Vec<NaiveDate>> {
    let mut series: BTreeMap<Animal, Vec<NaiveDate>> = BTreeMap::new();
    for row in daily {
        let dates = series.entry(row.animal).or_default();
        dates.extend(std::iter::repeat(row.date).take(row.count as usize));
    }
    series.retain(|_, dates| !dates.is_empty());
    for dates in series.values_mut() {
        dates.sort();
    }
    series
}

/// Run the detector over every animal with enough observations.
pub fn detect_cycles(
    daily: &[DailyCount],
    detector: &CycleDetector,
    settings: &CycleSettings,
    catalog: &AnimalCatalog,
) -> Vec<Cycle> {
    let series = observation_dates(daily);
    let mut cycles = Vec::new();

    for animal in catalog.animals() {
        let Some(dates) = series.get(&animal) else {
            continue;
        };
        if dates.len() < settings.min_observations {
            continue;
        }

        cycles.extend(detector.detect_period(animal, dates, CyclePeriod::ThreeDay));
        if dates.len() >= settings.weekly_min_observations {
            cycles.extend(detector.detect_period(animal, dates, CyclePeriod::Weekly));
        }
    }

    cycles
}

pub fn describe_cycles(cycles: &[Cycle], catalog: &AnimalCatalog) -> Findings {
    let mut findings = Findings::default();

    for cycle in cycles {
        findings.patterns.push(format!(
            "{}: {} cycle detected ({}% confidence)",
            catalog.label(cycle.animal),
            cycle.period,
            cycle.confidence
        ));
        findings.insights.push(format!(
            "{} next expected around {}",
            catalog.label(cycle.animal),
            cycle.next_expected
        ));
    }

    findings
}
