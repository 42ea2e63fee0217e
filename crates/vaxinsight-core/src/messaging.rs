//! Message models and the outbound send capability.
//!
//! The transport itself is a collaborator: the core only needs [`Outbox::send`].
//! [`ChannelOutbox`] is the in-process transport used by the daemon and tests.

use crate::error::{CoreError, CoreResult};
use crate::shared::PatientJourneyEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// One content item of a chat envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatContent {
    Text { text: String },
    StartSession,
    EndSession,
    Metadata { metadata: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub msg_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content: Vec<ChatContent>,
}

impl ChatMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            msg_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            content: vec![ChatContent::Text { text: text.into() }],
        }
    }

    /// All text items joined by a single space; `None` when the envelope has no text.
    pub fn joined_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|c| match c {
                ChatContent::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAcknowledgement {
    pub acknowledged_msg_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl ChatAcknowledgement {
    pub fn for_message(msg: &ChatMessage) -> Self {
        Self {
            acknowledged_msg_id: msg.msg_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    JourneyEvent,
    Chat,
    ChatAck,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::JourneyEvent => "patient_journey_event",
            MessageKind::Chat => "chat_message",
            MessageKind::ChatAck => "chat_acknowledgement",
        }
    }
}

/// Every model the agent sends or receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum AgentMessage {
    PatientJourneyEvent(PatientJourneyEvent),
    ChatMessage(ChatMessage),
    ChatAcknowledgement(ChatAcknowledgement),
}

impl AgentMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            AgentMessage::PatientJourneyEvent(_) => MessageKind::JourneyEvent,
            AgentMessage::ChatMessage(_) => MessageKind::Chat,
            AgentMessage::ChatAcknowledgement(_) => MessageKind::ChatAck,
        }
    }

    /// Decode and validate a raw inbound payload.
    pub fn from_json(payload: &str) -> CoreResult<Self> {
        let msg: AgentMessage = serde_json::from_str(payload)?;
        if let AgentMessage::PatientJourneyEvent(ref event) = msg {
            event.validate()?;
        }
        Ok(msg)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Send capability of the messaging collaborator. Sends are fire-and-forget.
#[async_trait::async_trait]
pub trait Outbox: Send + Sync {
    async fn send(&self, sender: &str, recipient: &str, message: AgentMessage) -> CoreResult<()>;
}

/// A message in flight on the in-process transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub sender: String,
    pub recipient: String,
    pub message: AgentMessage,
}

/// In-process transport over an unbounded tokio channel.
#[derive(Clone)]
pub struct ChannelOutbox {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl ChannelOutbox {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl Outbox for ChannelOutbox {
    async fn send(&self, sender: &str, recipient: &str, message: AgentMessage) -> CoreResult<()> {
        self.tx
            .send(Delivery {
                sender: sender.to_string(),
                recipient: recipient.to_string(),
                message,
            })
            .map_err(|_| CoreError::Transport("channel closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{JourneyStage, Sentiment};

    #[test]
    fn joined_text_skips_session_items() {
        let msg = ChatMessage {
            msg_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            content: vec![
                ChatContent::StartSession,
                ChatContent::Text { text: "patient".into() },
                ChatContent::Text { text: "stats P1".into() },
            ],
        };
        assert_eq!(msg.joined_text().as_deref(), Some("patient stats P1"));

        let empty = ChatMessage {
            content: vec![ChatContent::EndSession],
            ..msg
        };
        assert_eq!(empty.joined_text(), None);
    }

    #[test]
    fn inbound_event_with_empty_id_is_rejected() {
        let payload = r#"{"type":"patient_journey_event","body":{
            "patient_id":"","sentiment":"positive","journey_stage":"hesitant",
            "timestamp":"2024-03-01T10:00:00Z"}}"#;
        assert!(matches!(AgentMessage::from_json(payload), Err(CoreError::Validation(_))));
    }

    #[test]
    fn wire_format_is_tagged() {
        let msg = AgentMessage::PatientJourneyEvent(PatientJourneyEvent::new(
            "P7",
            Sentiment::Negative,
            JourneyStage::Accepting,
        ));
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"patient_journey_event""#));
        assert_eq!(AgentMessage::from_json(&json).unwrap().kind(), MessageKind::JourneyEvent);
    }

    #[tokio::test]
    async fn channel_outbox_delivers_in_order() {
        let (outbox, mut rx) = ChannelOutbox::new();
        let first = ChatMessage::text("one");
        let ack = ChatAcknowledgement::for_message(&first);
        outbox
            .send("agent", "user", AgentMessage::ChatAcknowledgement(ack.clone()))
            .await
            .unwrap();
        outbox.send("agent", "user", AgentMessage::ChatMessage(first)).await.unwrap();

        let d1 = rx.recv().await.unwrap();
        assert_eq!(d1.recipient, "user");
        assert_eq!(d1.message, AgentMessage::ChatAcknowledgement(ack));
        assert_eq!(rx.recv().await.unwrap().message.kind(), MessageKind::Chat);
    }

    #[tokio::test]
    async fn send_after_receiver_dropped_is_transport_error() {
        let (outbox, rx) = ChannelOutbox::new();
        drop(rx);
        let err = outbox
            .send("agent", "user", AgentMessage::ChatMessage(ChatMessage::text("x")))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
    }
}
