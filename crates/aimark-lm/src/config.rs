//! Endpoint configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chat::Lm;

/// Configuration for a single chat-completions endpoint.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Full chat-completions URL.
    pub url: String,
    /// API key sent as a Bearer token (empty for local endpoints).
    #[serde(default)]
    pub key: String,
    /// Model identifier requested from the endpoint.
    pub model: String,
    /// Optional system instruction override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Optional reply cache bound (unbounded when absent).
    #[serde(default)]
    pub cache_capacity: Option<usize>,
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("url", &self.url)
            .field("key", &"***")
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}

/// Top-level aimark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AimarkConfig {
    /// Endpoint configurations keyed by name. A config file that defines any
    /// endpoint replaces the built-in list.
    #[serde(default = "default_endpoints")]
    pub endpoints: HashMap<String, EndpointConfig>,
    /// Endpoint used when none is named on the command line.
    #[serde(default = "default_endpoint")]
    pub default_endpoint: String,
    /// Score ceiling used when none is given (falls back to the rubric's
    /// total weight when absent too).
    #[serde(default)]
    pub default_max_score: Option<u32>,
    /// Max concurrent grading requests. 1 grades strictly in row order.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_endpoint() -> String {
    "custom".to_string()
}

fn default_parallelism() -> usize {
    1
}

fn default_openai_endpoint() -> EndpointConfig {
    EndpointConfig {
        url: "https://api.openai.com/v1/chat/completions".to_string(),
        key: String::new(),
        model: "gpt-4o".to_string(),
        system_prompt: None,
        cache_capacity: None,
    }
}

fn default_endpoints() -> HashMap<String, EndpointConfig> {
    let mut endpoints = HashMap::new();
    endpoints.insert(
        "custom".to_string(),
        EndpointConfig {
            url: "http://localhost:11434/v1/chat/completions".to_string(),
            key: String::new(),
            model: "llama3".to_string(),
            system_prompt: None,
            cache_capacity: None,
        },
    );
    endpoints.insert("openai".to_string(), default_openai_endpoint());
    endpoints
}

impl Default for AimarkConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            default_endpoint: default_endpoint(),
            default_max_score: None,
            parallelism: default_parallelism(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in an endpoint config.
fn resolve_endpoint_config(config: &EndpointConfig) -> EndpointConfig {
    EndpointConfig {
        url: resolve_env_vars(&config.url),
        key: resolve_env_vars(&config.key),
        model: resolve_env_vars(&config.model),
        system_prompt: config.system_prompt.as_ref().map(|s| resolve_env_vars(s)),
        cache_capacity: config.cache_capacity,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `aimark.toml` in the current directory
/// 2. `~/.config/aimark/config.toml`
///
/// Environment variable override: `AIMARK_OPENAI_KEY`.
pub fn load_config() -> Result<AimarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AimarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("aimark.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AimarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AimarkConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("AIMARK_OPENAI_KEY") {
        let endpoint = config
            .endpoints
            .entry("openai".into())
            .or_insert_with(default_openai_endpoint);
        endpoint.key = key;
    }

    // Resolve env vars in all endpoint configs
    let resolved: HashMap<String, EndpointConfig> = config
        .endpoints
        .iter()
        .map(|(k, v)| (k.clone(), resolve_endpoint_config(v)))
        .collect();
    config.endpoints = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("aimark"))
}

/// Create an endpoint descriptor from its configuration.
pub fn create_lm(name: &str, config: &EndpointConfig) -> Lm {
    let mut lm = Lm::new(name, &config.url, &config.key, &config.model);
    if let Some(system_prompt) = &config.system_prompt {
        lm = lm.with_system_prompt(system_prompt);
    }
    if let Some(capacity) = config.cache_capacity {
        lm = lm.with_cache_capacity(capacity);
    }
    lm
}
