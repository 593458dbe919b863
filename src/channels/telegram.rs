//! Telegram transport — long-polls the Bot API for updates.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::channels::{IncomingMessage, MessageStream, Payload, Transport};
use crate::error::ChannelError;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Telegram transport — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    /// Send a text message with the given reply_markup, splitting messages
    /// that exceed Telegram's 4096 char limit.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        reply_markup: &Value,
    ) -> Result<(), ChannelError> {
        let chunks = split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH);
        for chunk in &chunks {
            self.send_message_chunk(chat_id, chunk, reply_markup).await?;
        }
        Ok(())
    }

    /// Send a single chunk (≤4096 chars), Markdown-first with plain fallback.
    async fn send_message_chunk(
        &self,
        chat_id: &str,
        text: &str,
        reply_markup: &Value,
    ) -> Result<(), ChannelError> {
        let markdown_body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "reply_markup": reply_markup,
        });

        let markdown_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&markdown_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if markdown_resp.status().is_success() {
            return Ok(());
        }

        let markdown_status = markdown_resp.status();
        tracing::warn!(
            status = ?markdown_status,
            "Telegram sendMessage with Markdown failed; retrying without parse_mode"
        );

        let plain_body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "reply_markup": reply_markup,
        });
        let plain_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&plain_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !plain_resp.status().is_success() {
            let plain_err = plain_resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!(
                    "sendMessage failed (markdown: {markdown_status}, plain: {plain_err})"
                ),
            });
        }

        Ok(())
    }
}

// ── Transport trait implementation ──────────────────────────────────

#[async_trait]
impl Transport for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let poll_url = self.api_url("getUpdates");
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message"]
                });

                let resp = match client.post(&poll_url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(Value::as_array) {
                    for update in results {
                        // Advance offset past this update
                        if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                            offset = uid + 1;
                        }

                        let Some(message) = update.get("message") else {
                            continue;
                        };
                        let Some(incoming) = parse_update_message(message) else {
                            continue;
                        };

                        if tx.send(incoming).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
        // Plain sends also clear any lingering reply keyboard.
        self.send_message(chat_id, text, &serde_json::json!({ "remove_keyboard": true }))
            .await
    }

    async fn send_choices(
        &self,
        chat_id: &str,
        text: &str,
        options: &[String],
    ) -> Result<(), ChannelError> {
        let keyboard: Vec<Vec<Value>> = options
            .iter()
            .map(|label| vec![serde_json::json!({ "text": label })])
            .collect();
        let markup = serde_json::json!({
            "keyboard": keyboard,
            "resize_keyboard": true,
        });
        self.send_message(chat_id, text, &markup).await
    }

    async fn resolve_photo(&self, file_id: &str) -> Result<String, ChannelError> {
        let resp = self
            .client
            .post(self.api_url("getFile"))
            .json(&serde_json::json!({ "file_id": file_id }))
            .send()
            .await
            .map_err(|e| ChannelError::FileResolution {
                file_id: file_id.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::FileResolution {
                file_id: file_id.to_string(),
                reason: format!("getFile failed: {err}"),
            });
        }

        let data: Value = resp.json().await.map_err(|e| ChannelError::FileResolution {
            file_id: file_id.to_string(),
            reason: e.to_string(),
        })?;

        let file_path = data
            .pointer("/result/file_path")
            .and_then(Value::as_str)
            .ok_or_else(|| ChannelError::FileResolution {
                file_id: file_id.to_string(),
                reason: "no file_path in getFile response".to_string(),
            })?;

        Ok(format!(
            "https://api.telegram.org/file/bot{}/{file_path}",
            self.bot_token.expose_secret()
        ))
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), ChannelError> {
        let _ = self
            .client
            .post(self.api_url("sendChatAction"))
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "action": "typing"
            }))
            .send()
            .await;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Extract an [`IncomingMessage`] from one update's `message` object.
///
/// Photo updates carry an array of renditions, smallest first; the last one
/// is the full-resolution photo and its file_id is what we keep.
fn parse_update_message(message: &Value) -> Option<IncomingMessage> {
    let user_id = message.pointer("/from/id").and_then(Value::as_i64)?.to_string();
    let chat_id = message.pointer("/chat/id").and_then(Value::as_i64)?.to_string();

    let payload = if let Some(sizes) = message.get("photo").and_then(Value::as_array) {
        let file_id = sizes.last()?.get("file_id")?.as_str()?;
        Payload::Photo(file_id.to_string())
    } else if let Some(text) = message.get("text").and_then(Value::as_str) {
        Payload::from_text(text)
    } else {
        return None;
    };

    Some(IncomingMessage {
        user_id,
        chat_id,
        payload,
    })
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let chunk = &remaining[..max_len];
        let split_at = chunk
            .rfind('\n')
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(max_len);

        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { max_len } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> TelegramChannel {
        TelegramChannel::new(SecretString::from("123:ABC"))
    }

    #[test]
    fn telegram_channel_name() {
        assert_eq!(channel().name(), "telegram");
    }

    #[test]
    fn telegram_api_url() {
        assert_eq!(
            channel().api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
        assert_eq!(
            channel().api_url("getFile"),
            "https://api.telegram.org/bot123:ABC/getFile"
        );
    }

    // ── Update parsing ──────────────────────────────────────────────

    #[test]
    fn parse_text_message() {
        let message = serde_json::json!({
            "from": { "id": 42, "username": "alice" },
            "chat": { "id": 99887766 },
            "text": "All clear"
        });
        let incoming = parse_update_message(&message).unwrap();
        assert_eq!(incoming.user_id, "42");
        assert_eq!(incoming.chat_id, "99887766");
        assert_eq!(incoming.payload, Payload::Text("All clear".into()));
    }

    #[test]
    fn parse_start_command() {
        let message = serde_json::json!({
            "from": { "id": 42 },
            "chat": { "id": 7 },
            "text": "/start"
        });
        let incoming = parse_update_message(&message).unwrap();
        assert_eq!(incoming.payload, Payload::Command("start".into()));
    }

    #[test]
    fn parse_photo_takes_largest_rendition() {
        let message = serde_json::json!({
            "from": { "id": 42 },
            "chat": { "id": 7 },
            "photo": [
                { "file_id": "small", "width": 90 },
                { "file_id": "medium", "width": 320 },
                { "file_id": "large", "width": 1280 }
            ]
        });
        let incoming = parse_update_message(&message).unwrap();
        assert_eq!(incoming.payload, Payload::Photo("large".into()));
    }

    #[test]
    fn parse_ignores_stickers_and_other_updates() {
        let message = serde_json::json!({
            "from": { "id": 42 },
            "chat": { "id": 7 },
            "sticker": { "file_id": "abc" }
        });
        assert!(parse_update_message(&message).is_none());
    }

    #[test]
    fn parse_requires_sender_and_chat() {
        let message = serde_json::json!({ "text": "hello" });
        assert!(parse_update_message(&message).is_none());
    }

    // ── Network error handling (no server behind the fake token) ───

    #[tokio::test]
    async fn resolve_photo_failure_is_recoverable() {
        let result = channel().resolve_photo("no-such-file").await;
        assert!(matches!(
            result,
            Err(ChannelError::FileResolution { .. })
        ));
    }

    #[tokio::test]
    async fn send_typing_never_fails() {
        assert!(channel().send_typing("123").await.is_ok());
    }

    // ── Message splitting ───────────────────────────────────────────

    #[test]
    fn split_message_short() {
        let chunks = split_message("Hello", 4096);
        assert_eq!(chunks, vec!["Hello"]);
    }

    #[test]
    fn split_message_exact_limit() {
        let msg = "a".repeat(4096);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 4096);
    }

    #[test]
    fn split_message_over_limit_on_newline() {
        let msg = format!("{}\n{}", "a".repeat(2000), "b".repeat(3000));
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(2000));
        assert_eq!(chunks[1], "b".repeat(3000));
    }

    #[test]
    fn split_message_no_good_split_point() {
        let msg = "a".repeat(5000);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }
}
