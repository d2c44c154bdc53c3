//! Window-level frequency ranking and the per-animal drill-down.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::report::{ChartKind, ChartSpec, Findings};
use crate::config::AnalyzerSettings;
use crate::types::{AggregatedStat, Animal, AnimalCatalog, DailyCount, Outcome, TimeWindow};

pub fn analyze_frequency(
    stats: &[AggregatedStat],
    window: TimeWindow,
    catalog: &AnimalCatalog,
) -> Findings {
    let mut findings = Findings::default();

    let Some(top) = stats.first() else {
        return findings;
    };

    findings.patterns.push(format!(
        "{} leads {} with {} draws ({}%)",
        catalog.label(top.animal),
        window.describe(),
        top.count,
        top.percentage
    ));

    let total: u64 = stats.iter().map(|s| s.count).sum();
    findings.insights.push(format!(
        "{} draws of {} distinct animals in {}",
        total,
        stats.len(),
        window.describe()
    ));

    findings
}

/// Everything the drill-down needs about one animal.
#[derive(Debug, Clone)]
pub struct AnimalSnapshot {
    pub animal: Animal,
    pub last_seen: Option<Outcome>,
    /// The animal's row in the window stats, if it was drawn at all.
    pub stat: Option<AggregatedStat>,
    pub daily: Vec<DailyCount>,
}

pub fn analyze_animal(
    snapshot: &AnimalSnapshot,
    window: TimeWindow,
    now: NaiveDateTime,
    settings: &AnalyzerSettings,
    catalog: &AnimalCatalog,
) -> Findings {
    let mut findings = Findings::default();
    let label = catalog.label(snapshot.animal);

    match &snapshot.last_seen {
        Some(last) => {
            let days = (now.date() - last.date).num_days();
            findings
                .patterns
                .push(format!("{}: last seen {} days ago", label, days));

            if days > settings.due_after_days {
                findings.insights.push(format!(
                    "{} has been absent for {} days and may be due",
                    label, days
                ));
            } else if days < settings.recent_within_days {
                findings.insights.push(format!(
                    "{} appeared recently, watch for a repeat",
                    label
                ));
            }
        }
        None => findings
            .patterns
            .push(format!("{}: never drawn", label)),
    }

    let (count, percentage) = snapshot
        .stat
        .as_ref()
        .map_or((0, Decimal::ZERO), |s| (s.count, s.percentage));

    findings.patterns.push(format!(
        "{}: frequency in {}: {} times ({}%)",
        label,
        window.describe(),
        count,
        percentage
    ));

    if percentage > settings.high_share_pct {
        findings
            .insights
            .push(format!("{} shows high frequency in {}", label, window.describe()));
    } else if percentage < settings.low_share_pct {
        findings
            .insights
            .push(format!("{} shows low frequency in {}", label, window.describe()));
    }

    findings.charts.push(ChartSpec {
        kind: ChartKind::Line,
        title: format!("{} Frequency by Day", label),
        labels: snapshot.daily.iter().map(|d| d.date.to_string()).collect(),
        series_label: Some(label.to_string()),
        values: snapshot.daily.iter().map(|d| d.count).collect(),
    });

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 16).unwrap().and_hms_opt(22, 0, 0).unwrap()
    }

    fn stat(animal: Animal, count: u64, percentage: Decimal) -> AggregatedStat {
        AggregatedStat {
            animal,
            count,
            percentage,
            last_occurrence: now(),
        }
    }

    fn seen_on(day: u32) -> Option<Outcome> {
        Some(Outcome::new(
            "M1",
            Animal::Lion,
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        ))
    }

    fn snapshot(last_seen: Option<Outcome>, percentage: Decimal) -> AnimalSnapshot {
        AnimalSnapshot {
            animal: Animal::Lion,
            last_seen,
            stat: Some(stat(Animal::Lion, 3, percentage)),
            daily: vec![DailyCount {
                date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
                animal: Animal::Lion,
                count: 3,
            }],
        }
    }

    #[test]
    fn test_frequency_names_leader() {
        let catalog = AnimalCatalog::builtin();
        let stats = vec![
            stat(Animal::Lion, 10, dec!(33.33)),
            stat(Animal::Tiger, 8, dec!(26.67)),
        ];
        let findings = analyze_frequency(&stats, TimeWindow::ThisWeek, &catalog);
        assert_eq!(findings.patterns[0], "Lion leads this week with 10 draws (33.33%)");
        assert!(findings.insights[0].starts_with("18 draws of 2"));
    }

    #[test]
    fn test_frequency_empty_stats() {
        let findings = analyze_frequency(&[], TimeWindow::Today, &AnimalCatalog::builtin());
        assert_eq!(findings, Findings::default());
    }

    #[test]
    fn test_animal_due_after_long_absence() {
        let settings = AnalyzerSettings::default();
        let findings = analyze_animal(
            &snapshot(seen_on(1), dec!(3)),
            TimeWindow::ThisMonth,
            now(),
            &settings,
            &AnimalCatalog::builtin(),
        );
        assert_eq!(findings.patterns[0], "Lion: last seen 15 days ago");
        assert!(findings.insights[0].contains("may be due"));
        assert_eq!(findings.charts[0].kind, ChartKind::Line);
        assert_eq!(findings.charts[0].values, vec![3]);
    }

    #[test]
    fn test_animal_recent_and_share_bands() {
        let settings = AnalyzerSettings::default();
        let catalog = AnimalCatalog::builtin();

        let recent = analyze_animal(
            &snapshot(seen_on(16), dec!(8)),
            TimeWindow::ThisWeek,
            now(),
            &settings,
            &catalog,
        );
        assert!(recent.insights[0].contains("watch for a repeat"));
        assert!(recent.insights[1].contains("high frequency"));

        // Five days silent sits between the two heuristics
        let quiet = analyze_animal(
            &snapshot(seen_on(11), dec!(0.5)),
            TimeWindow::ThisWeek,
            now(),
            &settings,
            &catalog,
        );
        assert_eq!(quiet.insights.len(), 1);
        assert!(quiet.insights[0].contains("low frequency"));
    }

    #[test]
    fn test_animal_never_drawn() {
        let snap = AnimalSnapshot {
            animal: Animal::Snake,
            last_seen: None,
            stat: None,
            daily: Vec::new(),
        };
        let findings = analyze_animal(
            &snap,
            TimeWindow::Today,
            now(),
            &AnalyzerSettings::default(),
            &AnimalCatalog::builtin(),
        );
        assert_eq!(findings.patterns[0], "Snake: never drawn");
        assert!(findings.patterns[1].ends_with("0 times (0%)"));
    }
}
