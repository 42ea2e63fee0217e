//! ScoreCalculator: derive the six-dimension [`ProjectScore`] from one journey event.
//!
//! Every dimension is a total function in `[0, 5]`. Metric dimensions scale the raw
//! value by five, round, then clamp, so out-of-range inputs (2.0, -1.0) degrade to the
//! bounds instead of failing. Missing metrics fall back to [`MetricDefaults`].

use crate::error::{CoreError, CoreResult};
use crate::shared::{JourneyStage, MetricDefaults, MetricKey, PatientJourneyEvent, ProjectScore};

const METRIC_SCALE: f64 = 5.0;

pub struct ScoreCalculator {
    defaults: MetricDefaults,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(MetricDefaults::default())
    }
}

impl ScoreCalculator {
    pub fn new(defaults: MetricDefaults) -> Self {
        Self {
            defaults: defaults.sanitized(),
        }
    }

    pub fn defaults(&self) -> &MetricDefaults {
        &self.defaults
    }

    /// Scores every dimension. Fails only when a supplied metric is NaN or infinite.
    pub fn score(&self, event: &PatientJourneyEvent) -> CoreResult<ProjectScore> {
        for key in [
            MetricKey::ProcessEfficiency,
            MetricKey::BusinessValue,
            MetricKey::ScalabilityPotential,
            MetricKey::ImpactFactor,
        ] {
            if let Some(value) = event.metrics.get(key) {
                if !value.is_finite() {
                    return Err(CoreError::Computation {
                        metric: key.as_str(),
                        value,
                    });
                }
            }
        }

        Ok(ProjectScore {
            technology: self.technology(event),
            engagement: self.engagement(event),
            efficiency: self.efficiency(event),
            practicality: self.practicality(event),
            scalability: self.scalability(event),
            impact: self.impact(event),
        })
    }

    pub fn technology(&self, event: &PatientJourneyEvent) -> u8 {
        event.tech_feature_count().min(ProjectScore::MAX_DIMENSION as usize) as u8
    }

    pub fn engagement(&self, event: &PatientJourneyEvent) -> u8 {
        engagement_for_stage(event.journey_stage)
    }

    pub fn efficiency(&self, event: &PatientJourneyEvent) -> u8 {
        self.metric_score(event, MetricKey::ProcessEfficiency)
    }

    pub fn practicality(&self, event: &PatientJourneyEvent) -> u8 {
        self.metric_score(event, MetricKey::BusinessValue)
    }

    pub fn scalability(&self, event: &PatientJourneyEvent) -> u8 {
        self.metric_score(event, MetricKey::ScalabilityPotential)
    }

    pub fn impact(&self, event: &PatientJourneyEvent) -> u8 {
        self.metric_score(event, MetricKey::ImpactFactor)
    }

    fn metric_score(&self, event: &PatientJourneyEvent, key: MetricKey) -> u8 {
        let value = event.metrics.get(key).unwrap_or_else(|| self.defaults.get(key));
        scale_metric(value)
    }
}

pub fn engagement_for_stage(stage: JourneyStage) -> u8 {
    match stage {
        JourneyStage::Hesitant => 1,
        JourneyStage::Researching => 2,
        JourneyStage::Consulting => 3,
        JourneyStage::Accepting => 4,
        JourneyStage::Completed => 5,
    }
}

/// `clamp(round(value * 5), 0, 5)`. Non-finite input maps to 0.
pub fn scale_metric(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value * METRIC_SCALE)
        .round()
        .clamp(0.0, ProjectScore::MAX_DIMENSION as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{JourneyMetrics, Sentiment};

    fn event(stage: JourneyStage) -> PatientJourneyEvent {
        PatientJourneyEvent::new("P1", Sentiment::Positive, stage)
    }

    #[test]
    fn technology_counts_features_up_to_five() {
        let calc = ScoreCalculator::default();
        assert_eq!(calc.technology(&event(JourneyStage::Hesitant)), 0);
        assert_eq!(
            calc.technology(&event(JourneyStage::Hesitant).with_tech_features(Vec::<String>::new())),
            0
        );
        assert_eq!(
            calc.technology(&event(JourneyStage::Hesitant).with_tech_features(["AI", "API"])),
            2
        );
        let many = ["a", "b", "c", "d", "e", "f", "g"];
        assert_eq!(calc.technology(&event(JourneyStage::Hesitant).with_tech_features(many)), 5);
        assert_eq!(
            calc.technology(&event(JourneyStage::Hesitant).with_tech_features(many[..5].iter().copied())),
            5
        );
    }

    #[test]
    fn engagement_is_strictly_increasing() {
        let calc = ScoreCalculator::default();
        let scores: Vec<u8> = JourneyStage::ALL
            .iter()
            .map(|s| calc.engagement(&event(*s)))
            .collect();
        assert_eq!(scores, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn metric_scaling_rounds_and_clamps() {
        assert_eq!(scale_metric(0.8), 4);
        assert_eq!(scale_metric(1.0), 5);
        assert_eq!(scale_metric(2.0), 5);
        assert_eq!(scale_metric(0.0), 0);
        assert_eq!(scale_metric(-1.0), 0);
        assert_eq!(scale_metric(0.9), 5);
        assert_eq!(scale_metric(0.85), 4);
        assert_eq!(scale_metric(f64::NAN), 0);
    }

    #[test]
    fn missing_metrics_use_low_nonzero_default() {
        let calc = ScoreCalculator::default();
        let e = event(JourneyStage::Researching);
        assert_eq!(calc.efficiency(&e), 1);
        assert_eq!(calc.practicality(&e), 1);
        assert_eq!(calc.scalability(&e), 1);
        assert_eq!(calc.impact(&e), 1);
    }

    #[test]
    fn custom_defaults_apply_per_key() {
        let calc = ScoreCalculator::new(MetricDefaults {
            process_efficiency: 0.6,
            ..MetricDefaults::default()
        });
        let e = event(JourneyStage::Researching);
        assert_eq!(calc.efficiency(&e), 3);
        assert_eq!(calc.impact(&e), 1);
    }

    #[test]
    fn total_is_sum_of_dimensions() {
        let calc = ScoreCalculator::default();
        let e = event(JourneyStage::Completed)
            .with_metrics(JourneyMetrics::new(2.0, 1.0, 5.0, 10.0))
            .with_tech_features(["a", "b", "c", "d", "e", "f"]);
        let score = calc.score(&e).expect("score");
        assert_eq!(score.total(), 30);

        let low = event(JourneyStage::Hesitant).with_metrics(JourneyMetrics::new(-3.0, 0.0, 0.0, 0.0));
        let score = calc.score(&low).expect("score");
        assert_eq!(score.total(), 1);
        assert_eq!(
            score.total(),
            score.technology
                + score.engagement
                + score.efficiency
                + score.practicality
                + score.scalability
                + score.impact
        );
    }

    #[test]
    fn non_finite_metric_fails_the_event() {
        let calc = ScoreCalculator::default();
        let e = event(JourneyStage::Hesitant).with_metrics(JourneyMetrics {
            business_value: Some(f64::INFINITY),
            ..JourneyMetrics::default()
        });
        match calc.score(&e) {
            Err(CoreError::Computation { metric, .. }) => assert_eq!(metric, "business_value"),
            other => panic!("expected computation error, got {:?}", other),
        }
    }
}
