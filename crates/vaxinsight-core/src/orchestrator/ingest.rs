//! Journey event ingestion: score the event, fold it into the store, log the result.

use super::{AgentContext, MessageHandler};
use crate::analytics::PatientAnalytics;
use crate::error::{CoreError, CoreResult};
use crate::messaging::{AgentMessage, MessageKind};
use crate::scoring::ScoreCalculator;
use crate::shared::{PatientJourneyEvent, ProjectScore};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct JourneyIngestor {
    calculator: Arc<ScoreCalculator>,
    analytics: Arc<PatientAnalytics>,
}

impl JourneyIngestor {
    pub fn new(calculator: Arc<ScoreCalculator>, analytics: Arc<PatientAnalytics>) -> Self {
        Self { calculator, analytics }
    }

    pub fn analytics(&self) -> &Arc<PatientAnalytics> {
        &self.analytics
    }

    /// Scores and records one event. The store is only touched once scoring succeeded.
    pub fn ingest(&self, event: &PatientJourneyEvent) -> CoreResult<ProjectScore> {
        if let Ok(json) = serde_json::to_string(event) {
            debug!(patient_id = %event.patient_id, event = %json, "journey event details");
        }
        let score = self.calculator.score(event)?;
        let record = self.analytics.record(event, score)?;

        info!(
            patient_id = %event.patient_id,
            stage = %event.journey_stage,
            sentiment = %event.sentiment,
            technology = score.technology,
            engagement = score.engagement,
            efficiency = score.efficiency,
            practicality = score.practicality,
            scalability = score.scalability,
            impact = score.impact,
            total_score = score.total(),
            stage_changes = record.stage_changes,
            "patient journey event ingested"
        );
        Ok(score)
    }
}

/// Inbound handler for [`AgentMessage::PatientJourneyEvent`].
pub struct JourneyEventHandler {
    ingestor: Arc<JourneyIngestor>,
}

impl JourneyEventHandler {
    pub fn new(ingestor: Arc<JourneyIngestor>) -> Self {
        Self { ingestor }
    }
}

#[async_trait::async_trait]
impl MessageHandler for JourneyEventHandler {
    fn kind(&self) -> MessageKind {
        MessageKind::JourneyEvent
    }

    async fn handle(&self, _ctx: &AgentContext, sender: &str, message: AgentMessage) -> CoreResult<()> {
        let event = match message {
            AgentMessage::PatientJourneyEvent(event) => event,
            other => {
                return Err(CoreError::Validation(format!(
                    "{} handler received {}",
                    self.kind().as_str(),
                    other.kind().as_str()
                )))
            }
        };
        info!(patient_id = %event.patient_id, sender = %sender, "new journey event received");
        self.ingestor.ingest(&event).map(|_| ()).map_err(|e| {
            warn!(patient_id = %event.patient_id, error = %e, "journey event rejected");
            e
        })
    }
}
