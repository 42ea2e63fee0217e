//! Synthetic journey events for exercising the pipeline.

use crate::shared::{JourneyMetrics, JourneyStage, PatientJourneyEvent, Sentiment};
use rand::Rng;
use uuid::Uuid;

/// Identifier used by the periodic baseline simulation.
pub const BASELINE_PATIENT_ID: &str = "TEST001";

const SIMULATED_PREFIX: &str = "SIM-";
const BASELINE_NOTES: &str = "Test patient data with metrics";
const TECH_FEATURES: [&str; 3] = ["AI", "Blockchain", "API"];

const EFFICIENCY_CENTER: f64 = 0.8;
const BUSINESS_VALUE_CENTER: f64 = 0.9;
const SCALABILITY_CENTER: f64 = 0.7;
const IMPACT_CENTER: f64 = 0.85;
const JITTER: f64 = 0.05;

pub struct SimulationGenerator;

impl SimulationGenerator {
    /// Fixed event: positive, researching, metrics exactly at their centers.
    pub fn baseline(patient_id: &str) -> PatientJourneyEvent {
        PatientJourneyEvent::new(patient_id, Sentiment::Positive, JourneyStage::Researching)
            .with_notes(BASELINE_NOTES)
            .with_metrics(JourneyMetrics::new(
                EFFICIENCY_CENTER,
                BUSINESS_VALUE_CENTER,
                SCALABILITY_CENTER,
                IMPACT_CENTER,
            ))
            .with_tech_features(TECH_FEATURES)
    }

    /// Baseline shape with every metric jittered by up to ±0.05. Generates an id when
    /// `suffix` is `None`.
    pub fn enhanced(suffix: Option<&str>) -> PatientJourneyEvent {
        Self::enhanced_with_rng(&mut rand::thread_rng(), suffix)
    }

    pub fn enhanced_with_rng<R: Rng>(rng: &mut R, suffix: Option<&str>) -> PatientJourneyEvent {
        let patient_id = match suffix.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => format!("{}{}", SIMULATED_PREFIX, s),
            None => Self::fresh_patient_id(),
        };
        let mut jitter = |center: f64| center + rng.gen_range(-JITTER..=JITTER);
        let metrics = JourneyMetrics::new(
            jitter(EFFICIENCY_CENTER),
            jitter(BUSINESS_VALUE_CENTER),
            jitter(SCALABILITY_CENTER),
            jitter(IMPACT_CENTER),
        );
        PatientJourneyEvent::new(patient_id, Sentiment::Positive, JourneyStage::Researching)
            .with_notes("Simulated patient journey")
            .with_metrics(metrics)
            .with_tech_features(TECH_FEATURES)
    }

    /// `SIM-` followed by eight upper-case hex digits.
    pub fn fresh_patient_id() -> String {
        let id = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("{}{}", SIMULATED_PREFIX, &id[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn baseline_is_fixed() {
        let e = SimulationGenerator::baseline(BASELINE_PATIENT_ID);
        assert_eq!(e.patient_id, "TEST001");
        assert_eq!(e.sentiment, Sentiment::Positive);
        assert_eq!(e.journey_stage, JourneyStage::Researching);
        assert_eq!(e.metrics.process_efficiency, Some(0.8));
        assert_eq!(e.tech_feature_count(), 3);
    }

    #[test]
    fn enhanced_metrics_stay_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let e = SimulationGenerator::enhanced_with_rng(&mut rng, Some("X1"));
            assert_eq!(e.patient_id, "SIM-X1");
            let m = e.metrics;
            let within = |v: Option<f64>, c: f64| {
                let v = v.expect("metric present");
                v >= c - JITTER - 1e-9 && v <= c + JITTER + 1e-9
            };
            assert!(within(m.process_efficiency, EFFICIENCY_CENTER));
            assert!(within(m.business_value, BUSINESS_VALUE_CENTER));
            assert!(within(m.scalability_potential, SCALABILITY_CENTER));
            assert!(within(m.impact_factor, IMPACT_CENTER));
        }
    }

    #[test]
    fn generated_ids_are_fresh() {
        let a = SimulationGenerator::fresh_patient_id();
        let b = SimulationGenerator::fresh_patient_id();
        assert!(a.starts_with("SIM-"));
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
        assert!(SimulationGenerator::enhanced(None).patient_id.starts_with("SIM-"));
        assert!(SimulationGenerator::enhanced(Some("  ")).patient_id.starts_with("SIM-"));
    }
}
