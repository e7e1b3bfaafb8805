//! Core trait definition for chat-completion language models.
//!
//! The async trait is implemented by the `aimark-lm` crate; the grading
//! engine only ever talks to a model through it.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AskError;

// ---------------------------------------------------------------------------
// Chat model trait
// ---------------------------------------------------------------------------

/// Trait for chat-completion backends that answer free-text prompts.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Human-readable endpoint name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send a prompt and return the assistant's reply text.
    async fn ask(&self, prompt: &str) -> Result<String, AskError>;

    /// Send a prompt and pull a JSON payload out of the reply.
    ///
    /// `Ok(None)` means the model answered but no payload could be parsed
    /// between the markers; only transport and endpoint failures are `Err`.
    async fn ask_json(
        &self,
        prompt: &str,
        start_marker: &str,
        end_marker: &str,
    ) -> Result<Option<Value>, AskError> {
        let reply = self.ask(prompt).await?;
        let payload = extract_json(&reply, start_marker, end_marker);
        tracing::debug!(parsed = payload.is_some(), "model reply reconciled");
        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// JSON payload extraction
// ---------------------------------------------------------------------------

/// Extract a JSON payload from a chatty model reply.
///
/// Models wrap their answers in prose, so the payload is taken as the span
/// from the first occurrence of `start_marker` through the last occurrence
/// of `end_marker`, inclusive. Returns `None` when either marker is absent,
/// when they appear in the wrong order, or when the span is not valid JSON.
pub fn extract_json(reply: &str, start_marker: &str, end_marker: &str) -> Option<Value> {
    let start = reply.find(start_marker)?;
    let end = reply.rfind(end_marker)? + end_marker.len();
    if end <= start {
        return None;
    }
    serde_json::from_str(&reply[start..end]).ok()
}
