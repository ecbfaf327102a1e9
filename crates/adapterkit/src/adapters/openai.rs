//! OpenAI-compatible chat completions generator

use super::{invalid_response, request_options};
use crate::base::{Adapter, AdapterCore, AdapterCoreBuilder};
use crate::capabilities::{
    Analysis, Generation, Generator, Options, Summary, TokenUsage, UsageReport,
};
use crate::capability::{CapabilityDescriptor, Tier};
use crate::error::AdapterResult;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_SUMMARY_WORDS: u64 = 150;
/// Request fields taken from per-call options, falling back to configuration.
const PASSTHROUGH_FIELDS: [&str; 3] = ["max_tokens", "temperature", "response_format"];

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Generator backed by an OpenAI-compatible `chat/completions` endpoint.
///
/// Configuration:
/// - `api_key` (required): bearer token
/// - `model` (required): model name
/// - `base_url`: full endpoint URL, defaults to the public OpenAI API
/// - `max_tokens`, `temperature`: request defaults
/// - `monthly_token_limit`: reported by [`Generator::usage`]
/// - `cost_per_1k_tokens`: enables cost estimates in [`Generator::usage`]
pub struct OpenAiGenerator {
    core: AdapterCore,
    api_key: SecretString,
    used_tokens: AtomicU64,
}

impl OpenAiGenerator {
    /// Descriptor shared by every instance.
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new("openai", env!("CARGO_PKG_VERSION"), Tier::Value)
            .with_capabilities(["generate", "chat", "summarize", "analyze", "usage"])
    }

    /// Core builder with this adapter's descriptor and required fields.
    pub fn core_builder() -> AdapterCoreBuilder {
        AdapterCore::builder(Self::descriptor()).required(["api_key", "model"])
    }

    /// Build from raw configuration with the default transport and no logging.
    pub fn new(raw: &Map<String, Value>) -> AdapterResult<Self> {
        Ok(Self::from_core(Self::core_builder().config(raw).build()?))
    }

    /// Wrap an already built core.
    pub fn from_core(core: AdapterCore) -> Self {
        let api_key = SecretString::from(
            core.config()
                .get_str("api_key")
                .unwrap_or_default()
                .to_string(),
        );
        Self {
            core,
            api_key,
            used_tokens: AtomicU64::new(0),
        }
    }

    fn endpoint(&self) -> String {
        self.core
            .config()
            .get_str("base_url")
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string()
    }

    async fn complete(&self, messages: Vec<Value>, options: &Options) -> AdapterResult<Generation> {
        let model = options
            .get("model")
            .cloned()
            .unwrap_or_else(|| self.core.config_value("model", Value::Null));

        let mut body = Map::new();
        body.insert("model".to_string(), model);
        body.insert("messages".to_string(), Value::Array(messages));
        for field in PASSTHROUGH_FIELDS {
            if let Some(value) = options
                .get(field)
                .or_else(|| self.core.config().get(field))
            {
                body.insert(field.to_string(), value.clone());
            }
        }

        let url = self.endpoint();
        let request = request_options(&self.core, options)?
            .method("POST")
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json_body(Value::Object(body));

        let response = self.core.execute(&url, &request).await?;
        let completion: ChatCompletion = response
            .json()
            .map_err(|e| self.core.record(invalid_response(&url, e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        let Some(content) = content else {
            return self
                .core
                .fail(invalid_response(&url, "completion has no message content"));
        };

        if let Some(usage) = completion.usage {
            self.used_tokens
                .fetch_add(usage.total_tokens, Ordering::Relaxed);
        }
        Ok(Generation {
            content,
            usage: completion.usage,
        })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, options: &Options) -> AdapterResult<Generation> {
        let mut messages = Vec::new();
        if let Some(system) = options.get("system").and_then(Value::as_str) {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));
        self.complete(messages, options).await
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        options: &Options,
    ) -> AdapterResult<Generation> {
        let messages = vec![
            json!({"role": "system", "content": system}),
            json!({"role": "user", "content": user}),
        ];
        self.complete(messages, options).await
    }

    async fn summarize(&self, content: &str, options: &Options) -> AdapterResult<Summary> {
        let words = options
            .get("max_words")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_SUMMARY_WORDS);
        let generation = self
            .chat(
                "You are a concise editor. Reply with the summary only.",
                &format!("Summarize the following content in at most {words} words:\n\n{content}"),
                options,
            )
            .await?;
        Ok(Summary {
            summary: generation.content.trim().to_string(),
        })
    }

    async fn analyze(&self, content: &str, schema: &Value) -> AdapterResult<Analysis> {
        let mut options = Options::new();
        options.insert(
            "response_format".to_string(),
            json!({"type": "json_object"}),
        );
        let generation = self
            .chat(
                &format!(
                    "You are an analysis engine. \
                     Reply only with a JSON object matching this schema: {schema}"
                ),
                content,
                &options,
            )
            .await?;

        let analysis = serde_json::from_str(strip_code_fence(&generation.content))
            .map_err(|e| self.core.record(invalid_response(&self.endpoint(), e)))?;
        Ok(Analysis { analysis })
    }

    async fn usage(&self) -> AdapterResult<UsageReport> {
        let used = self.used_tokens.load(Ordering::Relaxed);
        let config = self.core.config();
        Ok(UsageReport {
            used,
            limit: config.get_u64("monthly_token_limit"),
            cost: config
                .get_f64("cost_per_1k_tokens")
                .map(|per_1k| used as f64 / 1000.0 * per_1k),
        })
    }
}

impl Adapter for OpenAiGenerator {
    fn core(&self) -> &AdapterCore {
        &self.core
    }
}

/// Body of a Markdown code fence, or the trimmed text when there is none.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n[1]\n```  "), "[1]");
    }

    #[test]
    fn test_descriptor() {
        let info = OpenAiGenerator::descriptor();
        assert_eq!(info.tier, Tier::Value);
        assert!(info.supports("analyze"));
    }
}
