//! Chat commands: parse free text into a [`Command`], answer from the analytics store.
//!
//! Matching is case-insensitive on trimmed, whitespace-normalized input. Anything that
//! does not parse is [`Command::Unknown`] and gets the fallback text.

use super::report::generate_report;
use super::simulation::SimulationGenerator;
use super::{AgentContext, JourneyIngestor, MessageHandler};
use crate::analytics::{PatientAnalytics, PatientSnapshot, SentimentSummary};
use crate::error::{CoreError, CoreResult};
use crate::messaging::{AgentMessage, ChatAcknowledgement, ChatContent, ChatMessage, MessageKind};
use crate::shared::ProjectScore;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const HELP_TEXT: &str = "I can help with:\n\
- `status`: how many events and patients I have seen\n\
- `patient stats <id>`: counters and latest score for one patient\n\
- `sentiment summary`: positive/negative/neutral breakdown\n\
- `simulate data`: ingest a synthetic patient journey event\n\
- `generate report`: write the analytics report to the log\n\
- `explain scoring`: how the six score dimensions work\n\
- `who are you`: what this agent is";

pub const FALLBACK_TEXT: &str =
    "Sorry, I didn't understand that. Type `help` to see the commands I know.";

pub const NO_DATA_TEXT: &str =
    "There is no data yet. Send `simulate data` to ingest a sample patient journey event.";

const SCORING_TEXT: &str = "Each journey event gets six scores from 0 to 5 (30 in total):\n\
- Technology: one point per technology feature, up to 5\n\
- Engagement: journey stage, from hesitant (1) to completed (5)\n\
- Efficiency: process_efficiency x 5, rounded\n\
- Practicality: business_value x 5, rounded\n\
- Scalability: scalability_potential x 5, rounded\n\
- Impact: impact_factor x 5, rounded\n\
Metric scores are clamped to 0..5; a missing metric falls back to a low default.";

const ERROR_TEXT: &str = "Sorry, I couldn't read the analytics right now. Please try again.";

const TRAILING_PUNCTUATION: &[char] = &['?', '!', '.'];

/// A parsed chat query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    PatientStats(String),
    SentimentSummary,
    SimulateData,
    GenerateReport,
    ExplainScoring,
    WhoAreYou,
    Unknown(String),
}

impl Command {
    pub fn parse(input: &str) -> Command {
        let words: Vec<&str> = input.split_whitespace().collect();
        let normalized = words.join(" ").to_lowercase();
        let normalized = normalized.trim_end_matches(TRAILING_PUNCTUATION);

        match normalized {
            "help" => return Command::Help,
            "status" => return Command::Status,
            "sentiment summary" => return Command::SentimentSummary,
            "simulate data" => return Command::SimulateData,
            "generate report" => return Command::GenerateReport,
            "explain scoring" => return Command::ExplainScoring,
            "who are you" => return Command::WhoAreYou,
            _ => {}
        }

        if words.len() >= 3
            && words[0].eq_ignore_ascii_case("patient")
            && words[1].eq_ignore_ascii_case("stats")
        {
            let id = words[2..].join(" ");
            let id = id.trim_end_matches(TRAILING_PUNCTUATION);
            if !id.is_empty() {
                return Command::PatientStats(id.to_string());
            }
        }
        Command::Unknown(input.trim().to_string())
    }
}

/// Renders responses for chat commands. Reads the store; writes only through the ingestor.
pub struct ChatInterpreter {
    agent_name: String,
    analytics: Arc<PatientAnalytics>,
    ingestor: Arc<JourneyIngestor>,
}

impl ChatInterpreter {
    pub fn new(agent_name: &str, analytics: Arc<PatientAnalytics>, ingestor: Arc<JourneyIngestor>) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            analytics,
            ingestor,
        }
    }

    pub fn respond(&self, input: &str) -> CoreResult<String> {
        self.execute(Command::parse(input))
    }

    pub fn execute(&self, command: Command) -> CoreResult<String> {
        match command {
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Status => {
                let status = self.analytics.status()?;
                Ok(format!(
                    "{} is running. Events processed: {}. Patients tracked: {}.",
                    self.agent_name, status.total_events, status.distinct_patients
                ))
            }
            Command::PatientStats(id) => match self.analytics.lookup(&id) {
                Ok(snap) => Ok(render_patient(&snap)),
                Err(CoreError::NotFound(id)) => Ok(format!(
                    "No record found for patient '{}'. Try `simulate data` to create a sample patient.",
                    id
                )),
                Err(e) => Err(e),
            },
            Command::SentimentSummary => {
                let summary = self.analytics.summarize_sentiment()?;
                Ok(render_summary(&summary))
            }
            Command::SimulateData => {
                let event = SimulationGenerator::enhanced(None);
                let score = self.ingestor.ingest(&event)?;
                Ok(format!(
                    "Simulated a {} event for patient {} (score {}/{}). Ask `patient stats {}` to see it.",
                    event.journey_stage,
                    event.patient_id,
                    score.total(),
                    ProjectScore::MAX_TOTAL,
                    event.patient_id
                ))
            }
            Command::GenerateReport => {
                let report = generate_report(&self.analytics)?;
                Ok(format!(
                    "Analytics report generated for {} patient(s). Details are in the agent log.",
                    report.patients.len()
                ))
            }
            Command::ExplainScoring => Ok(SCORING_TEXT.to_string()),
            Command::WhoAreYou => Ok(format!(
                "I am {}, a demo agent that tracks patient vaccination journeys. I score each \
                 journey event on six dimensions, keep per-patient sentiment counters and answer \
                 questions about them.",
                self.agent_name
            )),
            Command::Unknown(_) => Ok(FALLBACK_TEXT.to_string()),
        }
    }
}

fn render_patient(snap: &PatientSnapshot) -> String {
    let r = &snap.record;
    let mut out = format!(
        "Patient {} statistics:\n\
         - Current stage: {}\n\
         - Last sentiment: {}\n\
         - Stage changes: {}\n\
         - Positive sentiments: {}\n\
         - Negative sentiments: {}\n\
         - Sentiment ratio: {:.2}",
        snap.patient_id,
        r.current_stage,
        r.last_sentiment,
        r.stage_changes,
        r.positive_sentiments,
        r.negative_sentiments,
        r.sentiment_ratio()
    );
    if let Some(s) = snap.last_score {
        out.push_str(&format!(
            "\nMost recent score: {}/{}\n\
             - Technology: {}/5\n\
             - Engagement: {}/5\n\
             - Efficiency: {}/5\n\
             - Practicality: {}/5\n\
             - Scalability: {}/5\n\
             - Impact: {}/5",
            s.total(),
            ProjectScore::MAX_TOTAL,
            s.technology,
            s.engagement,
            s.efficiency,
            s.practicality,
            s.scalability,
            s.impact
        ));
    }
    out
}

fn render_summary(summary: &SentimentSummary) -> String {
    if summary.is_empty() {
        return NO_DATA_TEXT.to_string();
    }
    let pct = |n: u64| summary.percentage(n).unwrap_or(0.0);
    format!(
        "Sentiment summary over {} event(s):\n\
         - Positive: {} ({:.1}%)\n\
         - Negative: {} ({:.1}%)\n\
         - Neutral: {} ({:.1}%)",
        summary.total,
        summary.positive,
        pct(summary.positive),
        summary.negative,
        pct(summary.negative),
        summary.neutral,
        pct(summary.neutral)
    )
}

/// Inbound handler for [`AgentMessage::ChatMessage`]: acknowledge, then answer once.
pub struct ChatHandler {
    interpreter: Arc<ChatInterpreter>,
}

impl ChatHandler {
    pub fn new(interpreter: Arc<ChatInterpreter>) -> Self {
        Self { interpreter }
    }
}

#[async_trait::async_trait]
impl MessageHandler for ChatHandler {
    fn kind(&self) -> MessageKind {
        MessageKind::Chat
    }

    async fn handle(&self, ctx: &AgentContext, sender: &str, message: AgentMessage) -> CoreResult<()> {
        let msg = match message {
            AgentMessage::ChatMessage(msg) => msg,
            other => {
                return Err(CoreError::Validation(format!(
                    "{} handler received {}",
                    self.kind().as_str(),
                    other.kind().as_str()
                )))
            }
        };

        ctx.send(
            sender,
            AgentMessage::ChatAcknowledgement(ChatAcknowledgement::for_message(&msg)),
        )
        .await?;

        for item in &msg.content {
            match item {
                ChatContent::Text { .. } => {}
                ChatContent::StartSession => info!(sender = %sender, "chat session started"),
                ChatContent::EndSession => info!(sender = %sender, "chat session ended"),
                ChatContent::Metadata { metadata } => {
                    debug!(sender = %sender, metadata = ?metadata, "chat metadata received")
                }
            }
        }

        let text = msg.joined_text().unwrap_or_default();
        info!(sender = %sender, msg_id = %msg.msg_id, query = %text, "chat message received");

        let reply = self.interpreter.respond(&text).unwrap_or_else(|e| {
            warn!(sender = %sender, msg_id = %msg.msg_id, error = %e, "chat command failed");
            ERROR_TEXT.to_string()
        });
        ctx.send(sender, AgentMessage::ChatMessage(ChatMessage::text(reply))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_and_space_insensitive() {
        assert_eq!(Command::parse("  HELP "), Command::Help);
        assert_eq!(Command::parse("Sentiment   Summary"), Command::SentimentSummary);
        assert_eq!(Command::parse("who are you?"), Command::WhoAreYou);
        assert_eq!(Command::parse("Generate Report"), Command::GenerateReport);
        assert_eq!(Command::parse("explain scoring"), Command::ExplainScoring);
        assert_eq!(Command::parse("simulate DATA"), Command::SimulateData);
        assert_eq!(Command::parse("status"), Command::Status);
    }

    #[test]
    fn parse_patient_stats_keeps_id() {
        assert_eq!(
            Command::parse("Patient Stats sim-ab12CD"),
            Command::PatientStats("sim-ab12CD".to_string())
        );
        assert_eq!(Command::parse("patient stats"), Command::Unknown("patient stats".to_string()));
        assert_eq!(Command::parse("patient stats P1?"), Command::PatientStats("P1".to_string()));
        assert_eq!(Command::parse("Patient stats SIM-9!."), Command::PatientStats("SIM-9".to_string()));
        assert_eq!(Command::parse("patient stats ?"), Command::Unknown("patient stats ?".to_string()));
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
        assert_eq!(
            Command::parse("what's the weather"),
            Command::Unknown("what's the weather".to_string())
        );
        assert_eq!(Command::parse("helpme"), Command::Unknown("helpme".to_string()));
    }

    #[test]
    fn empty_summary_renders_no_data() {
        assert_eq!(render_summary(&SentimentSummary::default()), NO_DATA_TEXT);
        let s = SentimentSummary {
            positive: 1,
            negative: 1,
            neutral: 2,
            total: 4,
        };
        let text = render_summary(&s);
        assert!(text.contains("Positive: 1 (25.0%)"));
        assert!(text.contains("Neutral: 2 (50.0%)"));
    }
}
