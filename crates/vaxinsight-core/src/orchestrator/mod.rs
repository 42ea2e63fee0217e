//! Inbound dispatch: handlers for journey events, chat messages and acknowledgements.
//!
//! A [`Protocol`] holds one [`MessageHandler`] per [`MessageKind`]. The transport hands
//! every inbound message to [`Protocol::dispatch`]; handlers reply through the
//! [`AgentContext`] outbox.

mod ack;
mod chat;
mod ingest;
mod report;
mod simulation;

pub use ack::AckHandler;
pub use chat::{ChatHandler, ChatInterpreter, Command, FALLBACK_TEXT, HELP_TEXT, NO_DATA_TEXT};
pub use ingest::{JourneyEventHandler, JourneyIngestor};
pub use report::{generate_report, AnalyticsReport, PatientReportLine};
pub use simulation::{SimulationGenerator, BASELINE_PATIENT_ID};

use crate::analytics::PatientAnalytics;
use crate::error::{CoreError, CoreResult};
use crate::messaging::{AgentMessage, MessageKind, Outbox};
use crate::scoring::ScoreCalculator;
use std::sync::Arc;

/// Identity and send capability passed to every handler.
#[derive(Clone)]
pub struct AgentContext {
    pub address: String,
    outbox: Arc<dyn Outbox>,
}

impl AgentContext {
    pub fn new(address: impl Into<String>, outbox: Arc<dyn Outbox>) -> Self {
        Self {
            address: address.into(),
            outbox,
        }
    }

    pub async fn send(&self, recipient: &str, message: AgentMessage) -> CoreResult<()> {
        self.outbox.send(&self.address, recipient, message).await
    }
}

/// Trait implemented by every inbound message handler.
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    /// The message kind this handler consumes.
    fn kind(&self) -> MessageKind;

    async fn handle(&self, ctx: &AgentContext, sender: &str, message: AgentMessage) -> CoreResult<()>;
}

/// Registry of message handlers, dispatched by message kind.
pub struct Protocol {
    handlers: Vec<Arc<dyn MessageHandler>>,
}

impl Protocol {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Registers a handler. A later registration for the same kind replaces the earlier one.
    pub fn register(&mut self, handler: Arc<dyn MessageHandler>) {
        self.handlers.retain(|h| h.kind() != handler.kind());
        self.handlers.push(handler);
    }

    pub fn handler(&self, kind: MessageKind) -> Option<Arc<dyn MessageHandler>> {
        self.handlers.iter().find(|h| h.kind() == kind).cloned()
    }

    pub fn kinds(&self) -> Vec<MessageKind> {
        self.handlers.iter().map(|h| h.kind()).collect()
    }

    pub async fn dispatch(&self, ctx: &AgentContext, sender: &str, message: AgentMessage) -> CoreResult<()> {
        let kind = message.kind();
        let handler = self.handler(kind).ok_or(CoreError::NoHandler(kind.as_str()))?;
        handler.handle(ctx, sender, message).await
    }

    /// The standard VaxInsight protocol: journey events, chat and chat acknowledgements.
    pub fn standard(
        agent_name: &str,
        calculator: Arc<ScoreCalculator>,
        analytics: Arc<PatientAnalytics>,
    ) -> Self {
        let ingestor = Arc::new(JourneyIngestor::new(calculator, Arc::clone(&analytics)));
        let interpreter = Arc::new(ChatInterpreter::new(agent_name, analytics, Arc::clone(&ingestor)));
        let mut protocol = Self::new();
        protocol.register(Arc::new(JourneyEventHandler::new(ingestor)));
        protocol.register(Arc::new(ChatHandler::new(interpreter)));
        protocol.register(Arc::new(AckHandler));
        protocol
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::new()
    }
}
