//! Transport abstraction for chat I/O.

pub mod telegram;

pub use telegram::TelegramChannel;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

/// What one chat update carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A slash command: lowercased name, leading slash stripped.
    Command(String),
    /// A plain text message.
    Text(String),
    /// A photo attachment, identified by the transport's file handle.
    Photo(String),
}

impl Payload {
    /// Classify a text body: a leading slash makes it a command.
    pub fn from_text(text: &str) -> Self {
        match text.strip_prefix('/') {
            Some(rest) => {
                let name = rest.split_whitespace().next().unwrap_or("");
                Payload::Command(name.to_ascii_lowercase())
            }
            None => Payload::Text(text.to_string()),
        }
    }
}

/// One inbound chat event, scoped to a user identity.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub user_id: String,
    pub chat_id: String,
    pub payload: Payload,
}

/// Stream of inbound events produced by a transport.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// Chat transport: inbound updates, outbound messages, file resolution.
///
/// The checklist core assumes the transport delivers at most one in-flight
/// event per user at a time; it applies no locking of its own around session
/// mutation.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    /// Begin receiving updates.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a plain text message.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ChannelError>;

    /// Send a text message with a reply keyboard of short option labels.
    async fn send_choices(
        &self,
        chat_id: &str,
        text: &str,
        options: &[String],
    ) -> Result<(), ChannelError>;

    /// Resolve a photo handle to a durable, externally fetchable URL.
    async fn resolve_photo(&self, file_id: &str) -> Result<String, ChannelError>;

    /// Show a "working on it" indicator, where the transport has one.
    async fn send_typing(&self, _chat_id: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    /// Verify the transport's credentials.
    async fn health_check(&self) -> Result<(), ChannelError>;
}
