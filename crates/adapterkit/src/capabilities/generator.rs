//! Content generation capability

use super::Options;
use crate::base::Adapter;
use crate::error::AdapterResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token accounting for one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt_tokens: u64,
    /// Completion tokens
    pub completion_tokens: u64,
    /// Sum of both
    pub total_tokens: u64,
}

/// Generated content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text
    pub content: String,
    /// Token usage, when the service reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Summary of a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Summary text
    pub summary: String,
}

/// Structured analysis of a piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Analysis document, shaped by the requested schema
    pub analysis: Value,
}

/// Cumulative usage of a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    /// Tokens used so far
    pub used: u64,
    /// Configured limit, if any
    pub limit: Option<u64>,
    /// Estimated cost so far, if pricing is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// AI content generation.
#[async_trait]
pub trait Generator: Adapter {
    /// Generate content for `prompt`.
    async fn generate(&self, prompt: &str, options: &Options) -> AdapterResult<Generation>;

    /// One chat turn with a system and a user message.
    async fn chat(&self, system: &str, user: &str, options: &Options)
    -> AdapterResult<Generation>;

    /// Summarize `content`.
    async fn summarize(&self, content: &str, options: &Options) -> AdapterResult<Summary>;

    /// Analyze `content` into a document shaped like `schema`.
    async fn analyze(&self, content: &str, schema: &Value) -> AdapterResult<Analysis>;

    /// Usage so far.
    async fn usage(&self) -> AdapterResult<UsageReport>;
}
