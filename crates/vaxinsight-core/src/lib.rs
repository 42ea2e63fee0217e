//! vaxinsight-core: patient journey scoring, in-memory analytics and chat commands.
//!
//! Data flows one way: inbound journey events are scored by [`ScoreCalculator`] and
//! folded into [`PatientAnalytics`]; chat commands read the store and may ingest
//! simulated events. Transport is abstracted behind [`Outbox`] and [`Protocol`].

mod analytics;
mod config;
mod error;
mod messaging;
mod orchestrator;
mod scoring;
mod shared;

pub use analytics::{
    PatientAnalytics, PatientRecord, PatientSnapshot, SentimentHistoryEntry, SentimentSummary,
    StoreStatus,
};
pub use config::{AgentConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use error::{CoreError, CoreResult};
pub use messaging::{
    AgentMessage, ChannelOutbox, ChatAcknowledgement, ChatContent, ChatMessage, Delivery,
    MessageKind, Outbox,
};
pub use orchestrator::{
    generate_report, AckHandler, AgentContext, AnalyticsReport, ChatHandler, ChatInterpreter,
    Command, JourneyEventHandler, JourneyIngestor, MessageHandler, PatientReportLine, Protocol,
    SimulationGenerator, BASELINE_PATIENT_ID, FALLBACK_TEXT, HELP_TEXT, NO_DATA_TEXT,
};
pub use scoring::{engagement_for_stage, scale_metric, ScoreCalculator};
pub use shared::{
    JourneyMetrics, JourneyStage, MetricDefaults, MetricKey, PatientJourneyEvent, ProjectScore,
    Sentiment,
};
