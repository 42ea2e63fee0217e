//! Shared journey types: stages, sentiment, metrics, events and project scores.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the vaccination engagement funnel. Ordered by engagement intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyStage {
    Hesitant,
    Researching,
    Consulting,
    Accepting,
    Completed,
}

impl JourneyStage {
    pub const ALL: [JourneyStage; 5] = [
        JourneyStage::Hesitant,
        JourneyStage::Researching,
        JourneyStage::Consulting,
        JourneyStage::Accepting,
        JourneyStage::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JourneyStage::Hesitant => "hesitant",
            JourneyStage::Researching => "researching",
            JourneyStage::Consulting => "consulting",
            JourneyStage::Accepting => "accepting",
            JourneyStage::Completed => "completed",
        }
    }
}

impl fmt::Display for JourneyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four numeric metrics a journey event may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKey {
    ProcessEfficiency,
    BusinessValue,
    ScalabilityPotential,
    ImpactFactor,
}

impl MetricKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::ProcessEfficiency => "process_efficiency",
            MetricKey::BusinessValue => "business_value",
            MetricKey::ScalabilityPotential => "scalability_potential",
            MetricKey::ImpactFactor => "impact_factor",
        }
    }
}

/// Event metrics keyed by the closed set of [`MetricKey`]s.
///
/// Values are conventionally in `[0, 1]` but are neither validated nor clamped here;
/// the score calculator clamps after scaling. Unknown keys in a payload are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalability_potential: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_factor: Option<f64>,
}

impl JourneyMetrics {
    pub fn new(
        process_efficiency: f64,
        business_value: f64,
        scalability_potential: f64,
        impact_factor: f64,
    ) -> Self {
        Self {
            process_efficiency: Some(process_efficiency),
            business_value: Some(business_value),
            scalability_potential: Some(scalability_potential),
            impact_factor: Some(impact_factor),
        }
    }

    pub fn get(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::ProcessEfficiency => self.process_efficiency,
            MetricKey::BusinessValue => self.business_value,
            MetricKey::ScalabilityPotential => self.scalability_potential,
            MetricKey::ImpactFactor => self.impact_factor,
        }
    }
}

fn default_metric_value() -> f64 {
    0.2
}

/// Per-key fallback used when an event omits a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDefaults {
    #[serde(default = "default_metric_value")]
    pub process_efficiency: f64,
    #[serde(default = "default_metric_value")]
    pub business_value: f64,
    #[serde(default = "default_metric_value")]
    pub scalability_potential: f64,
    #[serde(default = "default_metric_value")]
    pub impact_factor: f64,
}

impl Default for MetricDefaults {
    fn default() -> Self {
        Self::uniform(default_metric_value())
    }
}

impl MetricDefaults {
    pub fn uniform(value: f64) -> Self {
        Self {
            process_efficiency: value,
            business_value: value,
            scalability_potential: value,
            impact_factor: value,
        }
    }

    pub fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::ProcessEfficiency => self.process_efficiency,
            MetricKey::BusinessValue => self.business_value,
            MetricKey::ScalabilityPotential => self.scalability_potential,
            MetricKey::ImpactFactor => self.impact_factor,
        }
    }

    /// Keeps every default strictly inside (0, 1) so a missing metric scores low but non-zero.
    pub fn sanitized(self) -> Self {
        let fix = |v: f64| {
            if v.is_finite() && v > 0.0 && v < 1.0 {
                v
            } else {
                default_metric_value()
            }
        };
        Self {
            process_efficiency: fix(self.process_efficiency),
            business_value: fix(self.business_value),
            scalability_potential: fix(self.scalability_potential),
            impact_factor: fix(self.impact_factor),
        }
    }
}

/// Six-dimension heuristic score. Each sub-score is in `[0, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectScore {
    pub technology: u8,
    pub engagement: u8,
    pub efficiency: u8,
    pub practicality: u8,
    pub scalability: u8,
    pub impact: u8,
}

impl ProjectScore {
    pub const MAX_DIMENSION: u8 = 5;
    pub const MAX_TOTAL: u8 = 30;

    pub fn total(&self) -> u8 {
        self.technology
            + self.engagement
            + self.efficiency
            + self.practicality
            + self.scalability
            + self.impact
    }
}

/// Treats an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One observation of a patient's vaccination journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientJourneyEvent {
    pub patient_id: String,
    pub sentiment: Sentiment,
    pub journey_stage: JourneyStage,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: JourneyMetrics,
    #[serde(default)]
    pub tech_features: Option<Vec<String>>,
    /// Score attached by the sender, if any. Never trusted; scoring always recomputes.
    #[serde(default)]
    pub score: Option<ProjectScore>,
}

impl PatientJourneyEvent {
    pub fn new(patient_id: impl Into<String>, sentiment: Sentiment, journey_stage: JourneyStage) -> Self {
        Self {
            patient_id: patient_id.into(),
            sentiment,
            journey_stage,
            timestamp: Utc::now(),
            notes: None,
            metrics: JourneyMetrics::default(),
            tech_features: None,
            score: None,
        }
    }

    pub fn with_metrics(mut self, metrics: JourneyMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_tech_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tech_features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> CoreResult<()> {
        if self.patient_id.trim().is_empty() {
            return Err(CoreError::Validation("patient_id must not be empty".to_string()));
        }
        Ok(())
    }

    /// Decode and validate an event from a JSON payload.
    pub fn from_json(payload: &str) -> CoreResult<Self> {
        let event: PatientJourneyEvent = serde_json::from_str(payload)?;
        event.validate()?;
        Ok(event)
    }

    pub fn tech_feature_count(&self) -> usize {
        self.tech_features.as_ref().map(Vec::len).unwrap_or(0)
    }
}
