//! Integration test: journey ingestion into the shared analytics store.
//!
//! Verifies that:
//! 1. Wire payloads decode into events and unknown stages are rejected at the boundary.
//! 2. Counters follow the fold rules: three events for P1 give ratio 1.0.
//! 3. Concurrent ingestion from many tasks loses no updates.
//! 4. A bounded history evicts oldest entries without touching the event count.

use std::sync::Arc;
use vaxinsight_core::{
    AgentMessage, CoreError, JourneyIngestor, JourneyStage, PatientAnalytics, ScoreCalculator,
    Sentiment, SimulationGenerator,
};

fn ingestor(analytics: &Arc<PatientAnalytics>) -> JourneyIngestor {
    JourneyIngestor::new(Arc::new(ScoreCalculator::default()), Arc::clone(analytics))
}

fn event_json(id: &str, sentiment: &str, stage: &str) -> String {
    format!(
        r#"{{"type":"patient_journey_event","body":{{
            "patient_id":"{id}",
            "sentiment":"{sentiment}",
            "journey_stage":"{stage}",
            "timestamp":"2026-01-15T09:30:00Z",
            "metrics":{{"process_efficiency":0.8,"business_value":0.9}},
            "tech_features":["AI"]
        }}}}"#
    )
}

#[test]
fn wire_events_fold_into_counters() {
    let analytics = Arc::new(PatientAnalytics::new());
    let ingest = ingestor(&analytics);

    for (sentiment, stage) in [
        ("positive", "hesitant"),
        ("negative", "researching"),
        ("positive", "consulting"),
    ] {
        let msg = AgentMessage::from_json(&event_json("P1", sentiment, stage)).unwrap();
        let event = match msg {
            AgentMessage::PatientJourneyEvent(e) => e,
            other => panic!("unexpected {:?}", other.kind()),
        };
        let score = ingest.ingest(&event).unwrap();
        // missing scalability/impact fall back to 0.2 -> 1 point each
        assert_eq!(score.scalability, 1);
        assert_eq!(score.impact, 1);
    }

    let snap = analytics.get("P1").unwrap().unwrap();
    assert_eq!(snap.record.stage_changes, 3);
    assert_eq!(snap.record.positive_sentiments, 2);
    assert_eq!(snap.record.negative_sentiments, 1);
    assert_eq!(snap.record.current_stage, JourneyStage::Consulting);
    assert!((snap.record.sentiment_ratio() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn malformed_payloads_are_rejected() {
    let unknown_stage = event_json("P1", "positive", "vaccinated");
    assert!(matches!(
        AgentMessage::from_json(&unknown_stage),
        Err(CoreError::Validation(_))
    ));

    let empty_id = event_json("  ", "positive", "hesitant");
    assert!(matches!(
        AgentMessage::from_json(&empty_id),
        Err(CoreError::Validation(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingestion_loses_no_updates() {
    let analytics = Arc::new(PatientAnalytics::new());
    let ingest = Arc::new(ingestor(&analytics));

    let mut tasks = Vec::new();
    for worker in 0..8 {
        let ingest = Arc::clone(&ingest);
        tasks.push(tokio::spawn(async move {
            for i in 0..50 {
                let id = if i % 2 == 0 { "SHARED".to_string() } else { format!("W{worker}") };
                let event = SimulationGenerator::baseline(&id);
                ingest.ingest(&event).unwrap();
            }
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    let status = analytics.status().unwrap();
    assert_eq!(status.total_events, 400);
    assert_eq!(status.distinct_patients, 9);
    let shared = analytics.get("SHARED").unwrap().unwrap();
    assert_eq!(shared.record.stage_changes, 200);
    assert_eq!(shared.record.positive_sentiments, 200);
    assert_eq!(analytics.summarize_sentiment().unwrap().total, 400);
}

#[test]
fn bounded_history_keeps_newest() {
    let analytics = Arc::new(PatientAnalytics::with_max_history(Some(3)));
    let ingest = ingestor(&analytics);
    let sentiments = [
        Sentiment::Negative,
        Sentiment::Negative,
        Sentiment::Positive,
        Sentiment::Neutral,
        Sentiment::Positive,
    ];
    for (i, s) in sentiments.into_iter().enumerate() {
        let mut event = SimulationGenerator::baseline(&format!("H{i}"));
        event.sentiment = s;
        ingest.ingest(&event).unwrap();
    }

    let history = analytics.history().unwrap();
    let ids: Vec<&str> = history.iter().map(|e| e.patient_id.as_str()).collect();
    assert_eq!(ids, vec!["H2", "H3", "H4"]);

    let summary = analytics.summarize_sentiment().unwrap();
    assert_eq!((summary.positive, summary.negative, summary.neutral), (2, 0, 1));
    assert_eq!(analytics.status().unwrap().total_events, 5);
}
