use serde::{Deserialize, Serialize};

use super::cycle::Cycle;

/// Marker placed in a report whose analysis could not complete.
pub const ANALYSIS_FAILED: &str = "analysis failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Doughnut,
    Line,
}

/// Renderer-agnostic description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub series_label: Option<String>,
    pub values: Vec<u64>,
}

/// Output of one sub-analysis. Merged by the analyzer in a fixed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub patterns: Vec<String>,
    pub insights: Vec<String>,
    pub charts: Vec<ChartSpec>,
}

/// Descriptive report returned by the pattern analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub detected_patterns: Vec<String>,
    pub insights: Vec<String>,
    pub charts: Vec<ChartSpec>,
    pub cycles: Vec<Cycle>,
}

impl PatternReport {
    pub fn failed() -> Self {
        Self {
            detected_patterns: vec![ANALYSIS_FAILED.to_string()],
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.detected_patterns.len() == 1 && self.detected_patterns[0] == ANALYSIS_FAILED
    }

    pub fn merge(&mut self, findings: Findings) {
        self.detected_patterns.extend(findings.patterns);
        self.insights.extend(findings.insights);
        self.charts.extend(findings.charts);
    }
}
