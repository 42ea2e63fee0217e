//! Patient analytics store: per-patient counters, sentiment history and last score.
//!
//! All state sits behind one `RwLock`, so `record` is atomic with respect to every
//! multi-field read. `record` validates before taking the lock and performs only
//! infallible updates while holding it; an error leaves the store untouched.

use crate::error::{CoreError, CoreResult};
use crate::shared::{JourneyStage, PatientJourneyEvent, ProjectScore, Sentiment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::RwLock;

/// Running counters for one patient.
///
/// `stage_changes` counts every ingested event for the patient, whether or not the
/// stage actually moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub stage_changes: u64,
    pub positive_sentiments: u64,
    pub negative_sentiments: u64,
    pub current_stage: JourneyStage,
    pub last_sentiment: Sentiment,
}

impl PatientRecord {
    fn first(event: &PatientJourneyEvent) -> Self {
        Self {
            stage_changes: 0,
            positive_sentiments: 0,
            negative_sentiments: 0,
            current_stage: event.journey_stage,
            last_sentiment: event.sentiment,
        }
    }

    fn apply(&mut self, event: &PatientJourneyEvent) {
        self.stage_changes += 1;
        match event.sentiment {
            Sentiment::Positive => self.positive_sentiments += 1,
            Sentiment::Negative => self.negative_sentiments += 1,
            Sentiment::Neutral => {}
        }
        self.current_stage = event.journey_stage;
        self.last_sentiment = event.sentiment;
    }

    /// Smoothed ratio `positive / (negative + 1)`.
    pub fn sentiment_ratio(&self) -> f64 {
        self.positive_sentiments as f64 / (self.negative_sentiments as f64 + 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub patient_id: String,
    pub sentiment: Sentiment,
    pub stage: JourneyStage,
}

/// A patient's record together with the score of their most recent event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub patient_id: String,
    pub record: PatientRecord,
    pub last_score: Option<ProjectScore>,
}

/// Sentiment counts over the retained history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub total: u64,
}

impl SentimentSummary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Share of `count` in percent. `None` when there is no history.
    pub fn percentage(&self, count: u64) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(count as f64 * 100.0 / self.total as f64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub total_events: u64,
    pub distinct_patients: usize,
}

#[derive(Debug, Default)]
struct AnalyticsState {
    patients: BTreeMap<String, PatientRecord>,
    recent_scores: HashMap<String, ProjectScore>,
    history: VecDeque<SentimentHistoryEntry>,
    total_events: u64,
}

/// Process-lifetime analytics. Construct once and share through `Arc`.
pub struct PatientAnalytics {
    state: RwLock<AnalyticsState>,
    /// Oldest history entries are evicted beyond this length. `None` = unbounded.
    max_history: Option<usize>,
}

impl Default for PatientAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientAnalytics {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AnalyticsState::default()),
            max_history: None,
        }
    }

    pub fn with_max_history(max_history: Option<usize>) -> Self {
        Self {
            state: RwLock::new(AnalyticsState::default()),
            max_history: max_history.filter(|&n| n > 0),
        }
    }

    pub fn max_history(&self) -> Option<usize> {
        self.max_history
    }

    /// Fold one scored event into the counters and append it to the history.
    /// No deduplication: the same event recorded twice counts twice.
    pub fn record(&self, event: &PatientJourneyEvent, score: ProjectScore) -> CoreResult<PatientRecord> {
        event.validate()?;
        let entry = SentimentHistoryEntry {
            timestamp: event.timestamp,
            patient_id: event.patient_id.clone(),
            sentiment: event.sentiment,
            stage: event.journey_stage,
        };

        let mut state = self.state.write().map_err(|_| CoreError::StoreUnavailable)?;
        let record = state
            .patients
            .entry(event.patient_id.clone())
            .or_insert_with(|| PatientRecord::first(event));
        record.apply(event);
        let updated = record.clone();

        state.recent_scores.insert(event.patient_id.clone(), score);
        state.history.push_back(entry);
        state.total_events += 1;

        if let Some(max) = self.max_history {
            let overflow = state.history.len().saturating_sub(max);
            if overflow > 0 {
                for _ in 0..overflow {
                    state.history.pop_front();
                }
                tracing::debug!(evicted = overflow, max_history = max, "sentiment history trimmed");
            }
        }
        Ok(updated)
    }

    /// Exact-match lookup.
    pub fn get(&self, patient_id: &str) -> CoreResult<Option<PatientSnapshot>> {
        let state = self.state.read().map_err(|_| CoreError::StoreUnavailable)?;
        Ok(state.patients.get(patient_id).map(|record| PatientSnapshot {
            patient_id: patient_id.to_string(),
            record: record.clone(),
            last_score: state.recent_scores.get(patient_id).copied(),
        }))
    }

    /// Case-insensitive lookup; an exact match wins over a case-folded one.
    pub fn find(&self, patient_id: &str) -> CoreResult<Option<PatientSnapshot>> {
        let wanted = patient_id.trim();
        let folded = wanted.to_lowercase();
        let state = self.state.read().map_err(|_| CoreError::StoreUnavailable)?;
        let hit = state.patients.get_key_value(wanted).or_else(|| {
            state
                .patients
                .iter()
                .find(|(id, _)| id.to_lowercase() == folded)
        });
        Ok(hit.map(|(id, record)| PatientSnapshot {
            patient_id: id.clone(),
            record: record.clone(),
            last_score: state.recent_scores.get(id).copied(),
        }))
    }

    /// [`PatientAnalytics::find`], with an absent patient as [`CoreError::NotFound`].
    pub fn lookup(&self, patient_id: &str) -> CoreResult<PatientSnapshot> {
        self.find(patient_id)?
            .ok_or_else(|| CoreError::NotFound(patient_id.trim().to_string()))
    }

    pub fn summarize_sentiment(&self) -> CoreResult<SentimentSummary> {
        let state = self.state.read().map_err(|_| CoreError::StoreUnavailable)?;
        let mut summary = SentimentSummary::default();
        for entry in &state.history {
            match entry.sentiment {
                Sentiment::Positive => summary.positive += 1,
                Sentiment::Negative => summary.negative += 1,
                Sentiment::Neutral => summary.neutral += 1,
            }
        }
        summary.total = state.history.len() as u64;
        Ok(summary)
    }

    pub fn status(&self) -> CoreResult<StoreStatus> {
        let state = self.state.read().map_err(|_| CoreError::StoreUnavailable)?;
        Ok(StoreStatus {
            total_events: state.total_events,
            distinct_patients: state.patients.len(),
        })
    }

    /// Consistent copy of every patient, ordered by identifier.
    pub fn snapshot(&self) -> CoreResult<Vec<PatientSnapshot>> {
        let state = self.state.read().map_err(|_| CoreError::StoreUnavailable)?;
        Ok(state
            .patients
            .iter()
            .map(|(id, record)| PatientSnapshot {
                patient_id: id.clone(),
                record: record.clone(),
                last_score: state.recent_scores.get(id).copied(),
            })
            .collect())
    }

    /// Copy of the retained sentiment history in arrival order.
    pub fn history(&self) -> CoreResult<Vec<SentimentHistoryEntry>> {
        let state = self.state.read().map_err(|_| CoreError::StoreUnavailable)?;
        Ok(state.history.iter().cloned().collect())
    }
}
