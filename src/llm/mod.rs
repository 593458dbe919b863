//! Multimodal analysis gateway.
//!
//! The orchestrator hands the gateway a finished report plus the photo
//! references collected during the pass and gets back the provider's verdict.
//! Every gateway failure is collapsed to a "no result" outcome upstream, so a
//! provider outage never takes down the conversation flow.

mod openai;

pub use openai::{DEFAULT_MODEL, OpenAiVisionGateway};

use async_trait::async_trait;

use crate::error::AnalysisError;

/// External capability turning a report plus photos into a verdict.
///
/// `photos` carries `(entry_index, url)` pairs in ascending entry order; an
/// implementation must keep that order when building its request, with the
/// report text as the primary instruction payload.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(
        &self,
        report: &str,
        photos: &[(usize, String)],
    ) -> Result<String, AnalysisError>;
}
