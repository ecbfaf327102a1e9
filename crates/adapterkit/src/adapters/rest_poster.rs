//! WordPress-style REST publishing target

use super::{id_string, invalid_response, join_path, request_options};
use crate::base::{Adapter, AdapterCore, AdapterCoreBuilder};
use crate::capabilities::{
    MediaFile, Options, PostContent, Poster, Publication, ScheduledPublication,
};
use crate::capability::{CapabilityDescriptor, Tier};
use crate::error::{AdapterResult, ErrorRecord, codes};
use crate::http::RequestOptions;
use adapterkit_transport::HttpResponse;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

const POSTS_PATH: [&str; 4] = ["wp-json", "wp", "v2", "posts"];
const MEDIA_PATH: [&str; 4] = ["wp-json", "wp", "v2", "media"];

/// Poster for sites exposing the WordPress REST API.
///
/// Configuration:
/// - `site_url` (required): site root, e.g. `https://blog.example.com`
/// - `username` (required)
/// - `app_password` (required): application password for basic auth
/// - `default_status`: status for [`Poster::publish`] when the content has
///   none, defaults to `publish`
pub struct RestPoster {
    core: AdapterCore,
    credentials: SecretString,
}

impl RestPoster {
    /// Descriptor shared by every instance.
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new("rest-poster", env!("CARGO_PKG_VERSION"), Tier::Free)
            .with_capabilities(["publish", "update", "delete", "schedule", "upload_media"])
    }

    /// Core builder with this adapter's descriptor and required fields.
    pub fn core_builder() -> AdapterCoreBuilder {
        AdapterCore::builder(Self::descriptor()).required(["site_url", "username", "app_password"])
    }

    /// Build from raw configuration with the default transport and no logging.
    pub fn new(raw: &Map<String, Value>) -> AdapterResult<Self> {
        Ok(Self::from_core(Self::core_builder().config(raw).build()?))
    }

    /// Wrap an already built core.
    pub fn from_core(core: AdapterCore) -> Self {
        let config = core.config();
        let user = config.get_str("username").unwrap_or_default();
        let password = config.get_str("app_password").unwrap_or_default();
        let credentials = SecretString::from(STANDARD.encode(format!("{user}:{password}")));
        Self { core, credentials }
    }

    fn endpoint(&self, path: &[&str], id: Option<&str>) -> AdapterResult<String> {
        let site = self.core.config().get_str("site_url").unwrap_or_default();
        let segments: Vec<&str> = path.iter().copied().chain(id).collect();
        join_path(site, &segments).map_err(|err| self.core.record(err))
    }

    fn authorized(&self, options: &Options) -> AdapterResult<RequestOptions> {
        Ok(request_options(&self.core, options)?.header(
            "Authorization",
            format!("Basic {}", self.credentials.expose_secret()),
        ))
    }

    fn post_body(&self, content: &PostContent, status: Option<&str>) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("title".to_string(), Value::from(content.title.as_str()));
        body.insert("content".to_string(), Value::from(content.body.as_str()));
        if let Some(excerpt) = &content.excerpt {
            body.insert("excerpt".to_string(), Value::from(excerpt.as_str()));
        }
        if let Some(status) = status {
            body.insert("status".to_string(), Value::from(status));
        }
        body.extend(content.fields.clone());
        body
    }

    fn publication(
        &self,
        url: &str,
        response: &HttpResponse,
        link_field: &str,
    ) -> AdapterResult<Publication> {
        let body: Value = response
            .json()
            .map_err(|e| self.core.record(invalid_response(url, e)))?;
        let Some(id) = body.get("id").and_then(id_string) else {
            return self
                .core
                .fail(invalid_response(url, "response carries no id"));
        };
        Ok(Publication {
            id,
            url: body
                .get(link_field)
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    async fn send_post(
        &self,
        url: &str,
        body: Map<String, Value>,
        options: &Options,
    ) -> AdapterResult<Publication> {
        let request = self
            .authorized(options)?
            .method("POST")
            .json_body(Value::Object(body));
        let response = self.core.execute(url, &request).await?;
        self.publication(url, &response, "link")
    }
}

#[async_trait]
impl Poster for RestPoster {
    async fn publish(
        &self,
        content: &PostContent,
        options: &Options,
    ) -> AdapterResult<Publication> {
        let status = content
            .status
            .as_deref()
            .or_else(|| self.core.config().get_str("default_status"))
            .unwrap_or("publish");
        let url = self.endpoint(&POSTS_PATH, None)?;
        let body = self.post_body(content, Some(status));
        self.send_post(&url, body, options).await
    }

    async fn update(
        &self,
        id: &str,
        content: &PostContent,
        options: &Options,
    ) -> AdapterResult<Publication> {
        let url = self.endpoint(&POSTS_PATH, Some(id))?;
        // Keep the remote status unless the caller set one.
        let body = self.post_body(content, content.status.as_deref());
        self.send_post(&url, body, options).await
    }

    async fn delete(&self, id: &str, options: &Options) -> AdapterResult<()> {
        let mut url = self.endpoint(&POSTS_PATH, Some(id))?;
        if options.get("force").and_then(Value::as_bool).unwrap_or(false) {
            url.push_str("?force=true");
        }
        let request = self.authorized(options)?.method("DELETE");
        self.core.execute(&url, &request).await?;
        Ok(())
    }

    async fn schedule(
        &self,
        content: &PostContent,
        when: DateTime<Utc>,
        options: &Options,
    ) -> AdapterResult<ScheduledPublication> {
        if when <= Utc::now() {
            return self.core.fail(
                ErrorRecord::new(codes::INVALID_SCHEDULE, "Scheduled time must be in the future")
                    .with_context("scheduled_time", when.to_rfc3339()),
            );
        }

        let mut body = self.post_body(content, Some("future"));
        body.insert(
            "date_gmt".to_string(),
            Value::from(when.format("%Y-%m-%dT%H:%M:%S").to_string()),
        );

        let url = self.endpoint(&POSTS_PATH, None)?;
        let publication = self.send_post(&url, body, options).await?;
        Ok(ScheduledPublication {
            id: publication.id,
            scheduled_time: when,
        })
    }

    async fn upload_media(
        &self,
        file: &MediaFile,
        options: &Options,
    ) -> AdapterResult<Publication> {
        let url = self.endpoint(&MEDIA_PATH, None)?;
        let filename = file.filename.replace('"', "");
        let request = self
            .authorized(options)?
            .method("POST")
            .header("Content-Type", file.mime_type.as_str())
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            )
            .body_bytes(file.bytes.clone());
        let response = self.core.execute(&url, &request).await?;
        self.publication(&url, &response, "source_url")
    }
}

impl Adapter for RestPoster {
    fn core(&self) -> &AdapterCore {
        &self.core
    }
}
