//! Publishing capability

use super::Options;
use crate::base::Adapter;
use crate::error::AdapterResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content to publish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostContent {
    /// Title
    pub title: String,
    /// Body
    pub body: String,
    /// Optional excerpt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Target-specific status, e.g. `draft` or `publish`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Extra target-specific fields
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl PostContent {
    /// Content with a title and body.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Set the excerpt.
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Add an extra field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// A published item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Target-assigned id
    pub id: String,
    /// Public URL, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A scheduled item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPublication {
    /// Target-assigned id
    pub id: String,
    /// When it goes live
    pub scheduled_time: DateTime<Utc>,
}

/// A media file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// File name
    pub filename: String,
    /// MIME type
    pub mime_type: String,
    /// Contents
    pub bytes: Vec<u8>,
}

impl MediaFile {
    /// Create a media file.
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Publishing to a content target.
#[async_trait]
pub trait Poster: Adapter {
    /// Publish new content.
    async fn publish(&self, content: &PostContent, options: &Options)
    -> AdapterResult<Publication>;

    /// Replace the content of `id`.
    async fn update(
        &self,
        id: &str,
        content: &PostContent,
        options: &Options,
    ) -> AdapterResult<Publication>;

    /// Remove `id`.
    async fn delete(&self, id: &str, options: &Options) -> AdapterResult<()>;

    /// Publish `content` at `when`.
    async fn schedule(
        &self,
        content: &PostContent,
        when: DateTime<Utc>,
        options: &Options,
    ) -> AdapterResult<ScheduledPublication>;

    /// Upload a media file.
    async fn upload_media(&self, file: &MediaFile, options: &Options)
    -> AdapterResult<Publication>;
}
