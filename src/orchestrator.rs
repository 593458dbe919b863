//! Orchestrator — wires the transport stream to the checklist flow and, on a
//! completed pass, to the report builder and the analysis gateway.

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{IncomingMessage, Payload, Transport};
use crate::checklist::flow::{self, Event, Outbound};
use crate::checklist::{FlowState, SessionStore};
use crate::config::ChecklistConfig;
use crate::error::{AnalysisError, ChannelError, Error};
use crate::llm::AnalysisGateway;
use crate::report::build_report;

/// Sent when photo resolution fails and the user should retry the upload.
const RETRY_UPLOAD_TEXT: &str =
    "Sorry, that photo could not be retrieved. Please upload it again, or /skip.";

/// Sent when the analysis gateway produced no usable verdict.
const NO_RESULT_TEXT: &str =
    "Sorry, the report could not be parsed. Starting a new checklist below.";

/// Drives the checklist conversation over an injected transport and gateway.
pub struct Orchestrator {
    config: ChecklistConfig,
    store: Arc<SessionStore>,
    gateway: Arc<dyn AnalysisGateway>,
    transport: Arc<dyn Transport>,
}

impl Orchestrator {
    pub fn new(
        config: ChecklistConfig,
        store: Arc<SessionStore>,
        gateway: Arc<dyn AnalysisGateway>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            store,
            gateway,
            transport,
        }
    }

    /// Consume the transport's update stream until it ends.
    ///
    /// Updates are handled one at a time; that single-consumer loop is what
    /// upholds the per-user event serialization the session store relies on.
    pub async fn run(&self) -> Result<(), Error> {
        if let Err(e) = self.transport.health_check().await {
            tracing::warn!("Transport health check failed: {e}");
        }

        let mut stream = self.transport.start().await?;
        tracing::info!(channel = self.transport.name(), "Checklist bot started");

        while let Some(msg) = stream.next().await {
            if let Err(e) = self.handle_message(msg).await {
                tracing::warn!("Failed to handle update: {e}");
            }
        }
        Ok(())
    }

    /// Apply one inbound event to its user's session.
    pub async fn handle_message(&self, msg: IncomingMessage) -> Result<(), ChannelError> {
        let event = match self.to_event(&msg).await {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(()),
            Err(e) => {
                // Recoverable: ask for the same upload again, session untouched.
                tracing::warn!(user = %msg.user_id, "Photo resolution failed: {e}");
                return self.transport.send_text(&msg.chat_id, RETRY_UPLOAD_TEXT).await;
            }
        };

        let step = self
            .store
            .update(&msg.user_id, |session| {
                flow::apply(session, event, &self.config)
            })
            .await;

        self.send_replies(&msg.chat_id, &step.replies).await?;

        if step.completed {
            self.finalize(&msg.user_id, &msg.chat_id).await?;
        }
        Ok(())
    }

    /// Map a transport payload to a flow event, resolving photo handles.
    async fn to_event(&self, msg: &IncomingMessage) -> Result<Option<Event>, ChannelError> {
        match &msg.payload {
            Payload::Command(name) if name == "start" => Ok(Some(Event::Start)),
            Payload::Command(name) if name == "skip" => Ok(Some(Event::Skip)),
            Payload::Command(_) => Ok(None),
            Payload::Text(body) => Ok(Some(Event::Text(body.clone()))),
            Payload::Photo(file_id) => {
                // Resolution hits the network, so only do it when the flow
                // is actually waiting for a photo.
                let state = self.store.snapshot(&msg.user_id).await.state;
                if state != FlowState::AwaitingPhoto {
                    return Ok(None);
                }
                let url = self.transport.resolve_photo(file_id).await?;
                Ok(Some(Event::Photo(url)))
            }
        }
    }

    /// Build the report, run the analysis, relay the verdict, reset.
    async fn finalize(&self, user_id: &str, chat_id: &str) -> Result<(), ChannelError> {
        let session = self.store.snapshot(user_id).await;
        let report = build_report(&session);
        tracing::info!(
            user = %user_id,
            photos = report.photos.len(),
            "Checklist pass complete, requesting analysis"
        );

        let _ = self.transport.send_typing(chat_id).await;

        let verdict = match self.gateway.analyze(&report.text, &report.photos).await {
            Ok(text) => Some(text),
            // Fail-soft: the pass still resets, the user just gets no verdict.
            Err(e @ AnalysisError::Http { .. }) => {
                tracing::warn!(user = %user_id, "Analysis transport failure: {e}");
                None
            }
            Err(e @ AnalysisError::InvalidResponse { .. }) => {
                tracing::warn!(user = %user_id, "Analysis response unusable: {e}");
                None
            }
            Err(e @ AnalysisError::Provider { .. }) => {
                tracing::warn!(user = %user_id, "Analysis provider error: {e}");
                None
            }
        };

        match verdict {
            Some(text) => self.transport.send_text(chat_id, &text).await?,
            None => self.transport.send_text(chat_id, NO_RESULT_TEXT).await?,
        }

        self.store.clear(user_id).await;
        self.send_replies(chat_id, &flow::start_prompts(&self.config)).await
    }

    async fn send_replies(&self, chat_id: &str, replies: &[Outbound]) -> Result<(), ChannelError> {
        for reply in replies {
            match reply {
                Outbound::Text(text) => self.transport.send_text(chat_id, text).await?,
                Outbound::Choices { text, options } => {
                    self.transport.send_choices(chat_id, text, options).await?
                }
            }
        }
        Ok(())
    }
}
