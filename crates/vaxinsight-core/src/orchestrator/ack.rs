//! Inbound chat acknowledgements are logged and otherwise ignored.

use super::{AgentContext, MessageHandler};
use crate::error::{CoreError, CoreResult};
use crate::messaging::{AgentMessage, MessageKind};
use tracing::info;

pub struct AckHandler;

#[async_trait::async_trait]
impl MessageHandler for AckHandler {
    fn kind(&self) -> MessageKind {
        MessageKind::ChatAck
    }

    async fn handle(&self, _ctx: &AgentContext, sender: &str, message: AgentMessage) -> CoreResult<()> {
        match message {
            AgentMessage::ChatAcknowledgement(ack) => {
                info!(
                    sender = %sender,
                    acknowledged_msg_id = %ack.acknowledged_msg_id,
                    "chat acknowledgement received"
                );
                Ok(())
            }
            other => Err(CoreError::Validation(format!(
                "{} handler received {}",
                self.kind().as_str(),
                other.kind().as_str()
            ))),
        }
    }
}
