use async_trait::async_trait;

use crate::{domain::MessageRef, messaging::types::OutgoingMessage, Result};

/// Outbound messaging port.
///
/// Telegram is the only implementation; tests use an in-memory fake.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send(&self, msg: OutgoingMessage) -> Result<MessageRef>;

    /// Acknowledge a button press so the client clears its spinner.
    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
