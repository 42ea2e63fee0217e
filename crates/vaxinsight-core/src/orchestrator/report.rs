//! Analytics report over every known patient. Rendered to the log on each report tick
//! and by the `generate report` chat command.

use crate::analytics::{PatientAnalytics, PatientSnapshot};
use crate::error::CoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientReportLine {
    pub patient_id: String,
    pub stage_changes: u64,
    pub positive_sentiments: u64,
    pub negative_sentiments: u64,
    pub sentiment_ratio: f64,
}

impl PatientReportLine {
    fn from_snapshot(snap: &PatientSnapshot) -> Self {
        Self {
            patient_id: snap.patient_id.clone(),
            stage_changes: snap.record.stage_changes,
            positive_sentiments: snap.record.positive_sentiments,
            negative_sentiments: snap.record.negative_sentiments,
            sentiment_ratio: snap.record.sentiment_ratio(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Patient {} Statistics:\n- Stage Changes: {}\n- Positive Sentiments: {}\n- Negative Sentiments: {}\n- Sentiment Ratio: {:.2}",
            self.patient_id,
            self.stage_changes,
            self.positive_sentiments,
            self.negative_sentiments,
            self.sentiment_ratio
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub patients: Vec<PatientReportLine>,
}

impl AnalyticsReport {
    pub fn render(&self) -> String {
        let mut out = String::from("=== Analytics Report ===");
        for line in &self.patients {
            out.push('\n');
            out.push_str(&line.render());
        }
        out
    }
}

/// Builds the report from a consistent store snapshot and logs one record per patient.
pub fn generate_report(analytics: &PatientAnalytics) -> CoreResult<AnalyticsReport> {
    let report = AnalyticsReport {
        generated_at: Utc::now(),
        patients: analytics
            .snapshot()?
            .iter()
            .map(PatientReportLine::from_snapshot)
            .collect(),
    };

    info!(patients = report.patients.len(), "=== Analytics Report ===");
    for line in &report.patients {
        info!(
            patient_id = %line.patient_id,
            stage_changes = line.stage_changes,
            positive_sentiments = line.positive_sentiments,
            negative_sentiments = line.negative_sentiments,
            sentiment_ratio = %format!("{:.2}", line.sentiment_ratio),
            "patient statistics"
        );
    }
    debug!(report = %report.render(), "analytics report rendered");
    Ok(report)
}
