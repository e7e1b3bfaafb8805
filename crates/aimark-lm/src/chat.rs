//! Chat-completions endpoint client.
//!
//! One `Lm` describes one endpoint: a name, the full chat-completions URL,
//! an API key, and a model identifier. Replies are cached per descriptor,
//! so re-grading a sheet never re-asks for prompts it has already seen.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use aimark_core::error::AskError;
use aimark_core::traits::ChatModel;

use crate::cache::ReplyCache;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// System instruction sent ahead of every grading prompt.
pub const SYSTEM_PROMPT: &str = "You are a teacher of computer science in a UK high school.";

/// A chat-completions endpoint descriptor with its reply cache.
pub struct Lm {
    name: String,
    url: String,
    key: String,
    model: String,
    system_prompt: String,
    cache: ReplyCache,
    client: reqwest::Client,
}

impl Lm {
    /// Creates a descriptor for an OpenAI-compatible chat endpoint.
    ///
    /// `url` is the full chat-completions URL, not a base URL; local
    /// endpoints and hosted ones differ in more than the host.
    pub fn new(name: &str, url: &str, key: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            name: name.to_string(),
            url: url.to_string(),
            key: key.to_string(),
            model: model.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            cache: ReplyCache::unbounded(),
            client,
        }
    }

    /// Replaces the default system instruction.
    pub fn with_system_prompt(mut self, system_prompt: &str) -> Self {
        self.system_prompt = system_prompt.to_string();
        self
    }

    /// Bounds the reply cache (zero disables caching).
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = ReplyCache::bounded(capacity);
        self
    }

    /// The model identifier requested from the endpoint.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The chat-completions URL this descriptor posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of replies currently cached.
    pub fn cached_replies(&self) -> usize {
        self.cache.len()
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

#[async_trait]
impl ChatModel for Lm {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, prompt), fields(endpoint = %self.name, model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<String, AskError> {
        if let Some(reply) = self.cache.get(prompt) {
            tracing::debug!("reply cache hit");
            return Ok(reply);
        }

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AskError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    AskError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(AskError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(AskError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(AskError::ModelNotFound(self.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(AskError::ApiError {
                status,
                message: body,
            });
        }

        let envelope: ChatResponse = response.json().await.map_err(|e| AskError::ApiError {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })?;

        let reply = envelope
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AskError::EmptyReply)?;

        self.cache.insert(prompt.to_string(), reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"content": content, "role": "assistant"}, "index": 0}],
            "model": "llama3"
        })
    }

    fn lm_for(server: &MockServer) -> Lm {
        Lm::new(
            "custom",
            &format!("{}/v1/chat/completions", server.uri()),
            "test-key",
            "llama3",
        )
    }

    #[tokio::test]
    async fn successful_ask() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "llama3",
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": "What is a stack?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("[1, 2]")))
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let reply = lm.ask("What is a stack?").await.unwrap();
        assert_eq!(reply, "[1, 2]");
    }

    #[tokio::test]
    async fn repeated_prompt_hits_the_cache() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("[3]")))
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let first = lm.ask("same prompt").await.unwrap();
        let second = lm.ask("same prompt").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(lm.cached_replies(), 1);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn distinct_prompts_each_go_to_the_network() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("[]")))
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        lm.ask("first prompt").await.unwrap();
        lm.ask("first prompt ").await.unwrap();
        assert_eq!(lm.cached_replies(), 2);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let err = lm.ask("prompt").await.unwrap_err();
        assert!(matches!(err, AskError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let err = lm.ask("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            AskError::RateLimited {
                retry_after_ms: 7000
            }
        ));
    }

    #[tokio::test]
    async fn missing_model_is_typed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let err = lm.ask("prompt").await.unwrap_err();
        assert!(matches!(err, AskError::ModelNotFound(model) if model == "llama3"));
    }

    #[tokio::test]
    async fn server_errors_are_not_cached() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let err = lm.ask("prompt").await.unwrap_err();
        assert!(matches!(err, AskError::ApiError { status: 500, .. }));

        let err = lm.ask("prompt").await.unwrap_err();
        assert!(matches!(err, AskError::ApiError { status: 500, .. }));
        assert_eq!(lm.cached_replies(), 0);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn envelope_without_message_is_empty_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let err = lm.ask("prompt").await.unwrap_err();
        assert!(matches!(err, AskError::EmptyReply));
        assert_eq!(lm.cached_replies(), 0);
    }

    #[tokio::test]
    async fn ask_json_extracts_payload_from_prose() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_body("Happy to help! [1, 3] are satisfied.")),
            )
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let payload = lm.ask_json("prompt", "[", "]").await.unwrap();
        assert_eq!(payload, Some(json!([1, 3])));
    }

    #[tokio::test]
    async fn ask_json_with_no_payload_is_ok_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reply_body("I cannot grade this.")),
            )
            .mount(&server)
            .await;

        let lm = lm_for(&server);
        let payload = lm.ask_json("prompt", "[", "]").await.unwrap();
        assert_eq!(payload, None);
    }

    #[tokio::test]
    async fn custom_system_prompt_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [{"role": "system", "content": "Mark generously."}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("[]")))
            .mount(&server)
            .await;

        let lm = lm_for(&server).with_system_prompt("Mark generously.");
        lm.ask("prompt").await.unwrap();
    }
}
