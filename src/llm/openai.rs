//! OpenAI chat-completions gateway — report text plus vision content parts.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::AnalysisError;
use crate::llm::AnalysisGateway;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Default vision-capable model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Analysis gateway backed by the OpenAI chat-completions API.
pub struct OpenAiVisionGateway {
    api_key: SecretString,
    model: String,
    client: reqwest::Client,
}

impl OpenAiVisionGateway {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::Http {
                provider: "openai".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            api_key,
            model: model.into(),
            client,
        })
    }

    /// One user message: the report text first, then one image part per
    /// photo, in the entry order the report builder produced.
    fn request_body(&self, report: &str, photos: &[(usize, String)]) -> serde_json::Value {
        let mut content = vec![serde_json::json!({ "type": "text", "text": report })];
        for (_, url) in photos {
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": { "url": url }
            }));
        }
        serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": content }],
            "max_tokens": MAX_TOKENS,
        })
    }
}

#[async_trait]
impl AnalysisGateway for OpenAiVisionGateway {
    async fn analyze(
        &self,
        report: &str,
        photos: &[(usize, String)],
    ) -> Result<String, AnalysisError> {
        let resp = self
            .client
            .post(API_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.request_body(report, photos))
            .send()
            .await
            .map_err(|e| AnalysisError::Http {
                provider: "openai".to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let body: serde_json::Value =
            resp.json().await.map_err(|e| AnalysisError::InvalidResponse {
                provider: "openai".to_string(),
                reason: e.to_string(),
            })?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown provider error")
                .to_string();
            return Err(AnalysisError::Provider {
                provider: "openai".to_string(),
                message,
            });
        }

        match body
            .pointer("/choices/0/message/content")
            .and_then(serde_json::Value::as_str)
        {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(AnalysisError::InvalidResponse {
                provider: "openai".to_string(),
                reason: "no completion content in response".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> OpenAiVisionGateway {
        OpenAiVisionGateway::new(SecretString::from("test-key"), DEFAULT_MODEL).unwrap()
    }

    #[test]
    fn request_body_text_part_comes_first() {
        let gw = gateway();
        let body = gw.request_body("the report", &[]);

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], MAX_TOKENS);
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "the report");
    }

    #[test]
    fn request_body_preserves_photo_order() {
        let gw = gateway();
        let photos = vec![
            (1, "https://example.com/1.jpg".to_string()),
            (3, "https://example.com/3.jpg".to_string()),
        ];
        let body = gw.request_body("report", &photos);

        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 3);
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "https://example.com/1.jpg");
        assert_eq!(content[2]["image_url"]["url"], "https://example.com/3.jpg");
    }

    #[tokio::test]
    async fn analyze_with_bad_key_fails() {
        // With no server or a rejected key this must surface as an error,
        // never a panic.
        let gw = gateway();
        let result = gw.analyze("report", &[]).await;
        assert!(result.is_err());
    }
}
