//! Mock model for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use aimark_core::error::AskError;
use aimark_core::traits::ChatModel;

/// A mock chat model for testing grading code without real API calls.
///
/// Returns configurable replies based on prompt content matching.
pub struct MockModel {
    /// Map of prompt substring → reply.
    replies: HashMap<String, String>,
    /// Default reply if no prompt matches.
    default_reply: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last prompt received.
    last_prompt: Mutex<Option<String>>,
}

impl MockModel {
    /// Create a new mock model with the given prompt→reply mappings.
    pub fn new(replies: HashMap<String, String>) -> Self {
        Self {
            replies,
            default_reply: "[]".to_string(),
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn with_fixed_reply(reply: &str) -> Self {
        Self {
            replies: HashMap::new(),
            default_reply: reply.to_string(),
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this model.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last prompt sent to this model.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ask(&self, prompt: &str) -> Result<String, AskError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        // Find a matching reply based on prompt content
        let reply = self
            .replies
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_reply.clone());

        Ok(reply)
    }
}
