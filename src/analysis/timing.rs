//! Hour-of-day and day-of-week sub-analyses.

use std::collections::BTreeMap;

use super::report::{ChartKind, ChartSpec, Findings};
use crate::types::{HourlyCount, WeekdayCount};

pub const DAY_NAMES: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBand {
    Morning,
    Afternoon,
    Evening,
}

impl DayBand {
    /// Morning 06–11, afternoon 12–17, evening 18–05.
    pub fn of_hour(hour: u32) -> Self {
        match hour {
            6..=11 => DayBand::Morning,
            12..=17 => DayBand::Afternoon,
            _ => DayBand::Evening,
        }
    }

    fn insight(&self) -> &'static str {
        match self {
            DayBand::Morning => "Morning tendency: draws concentrate in the morning hours",
            DayBand::Afternoon => "Afternoon tendency: draws concentrate in the afternoon hours",
            DayBand::Evening => "Evening tendency: draws concentrate in the evening hours",
        }
    }
}

/// Sum counts per key and rank by total (descending, stable on key order).
fn ranked_totals(rows: impl Iterator<Item = (u32, u64)>) -> Vec<(u32, u64)> {
    let mut totals: BTreeMap<u32, u64> = BTreeMap::new();
    for (key, count) in rows {
        *totals.entry(key).or_default() += count;
    }
    let mut ranked: Vec<(u32, u64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Dominant band wins ties in morning, afternoon, evening order.
pub fn dominant_band(totals: &[(u32, u64)]) -> DayBand {
    let band_total = |band: DayBand| -> u64 {
        totals
            .iter()
            .filter(|(hour, _)| DayBand::of_hour(*hour) == band)
            .map(|(_, total)| total)
            .sum()
    };

    let morning = band_total(DayBand::Morning);
    let afternoon = band_total(DayBand::Afternoon);
    let evening = band_total(DayBand::Evening);
    let max = morning.max(afternoon).max(evening);

    if max == morning {
        DayBand::Morning
    } else if max == afternoon {
        DayBand::Afternoon
    } else {
        DayBand::Evening
    }
}

pub fn analyze_hourly(rows: &[HourlyCount]) -> Findings {
    let ranked = ranked_totals(rows.iter().map(|r| (r.hour, r.count)));
    let mut findings = Findings::default();

    if let Some(&(top_hour, top_total)) = ranked.first() {
        findings
            .patterns
            .push(format!("Peak activity at {}:00 with {} draws", top_hour, top_total));
        findings.insights.push(dominant_band(&ranked).insight().to_string());
    }

    findings.charts.push(ChartSpec {
        kind: ChartKind::Bar,
        title: "Draws by Hour of Day".to_string(),
        labels: ranked.iter().map(|(hour, _)| format!("{}:00", hour)).collect(),
        series_label: Some("Draws".to_string()),
        values: ranked.iter().map(|(_, total)| *total).collect(),
    });

    findings
}

pub fn analyze_daily(rows: &[WeekdayCount]) -> Findings {
    let ranked = ranked_totals(rows.iter().map(|r| (r.day_of_week, r.count)));
    let mut findings = Findings::default();

    if let Some(&(top_day, top_total)) = ranked.first() {
        findings.patterns.push(format!(
            "{} is the most active day with {} draws",
            day_name(top_day),
            top_total
        ));

        let (weekend, weekday): (Vec<_>, Vec<_>) =
            ranked.iter().partition(|(day, _)| *day == 0 || *day == 6);
        let weekend_total: u64 = weekend.iter().map(|(_, t)| t).sum();
        let weekday_total: u64 = weekday.iter().map(|(_, t)| t).sum();

        if weekend_total > weekday_total {
            findings
                .insights
                .push("Weekend pattern: more activity on Saturdays and Sundays".to_string());
        } else {
            findings
                .insights
                .push("Weekday pattern: more activity Monday through Friday".to_string());
        }
    }

    findings.charts.push(ChartSpec {
        kind: ChartKind::Doughnut,
        title: "Draws by Day of Week".to_string(),
        labels: ranked.iter().map(|(day, _)| day_name(*day).to_string()).collect(),
        series_label: None,
        values: ranked.iter().map(|(_, total)| *total).collect(),
    });

    findings
}

pub fn day_name(day_of_week: u32) -> &'static str {
    DAY_NAMES.get(day_of_week as usize).copied().unwrap_or("Unknown")
}
