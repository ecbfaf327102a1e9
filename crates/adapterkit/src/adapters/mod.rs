//! Reference adapters, one per capability
//!
//! Each is a complete, working integration and doubles as a template for
//! writing new adapters on top of [`AdapterCore`](crate::base::AdapterCore).

mod openai;
mod rest_poster;
mod web_scraper;
mod webhook_workflow;

pub use openai::OpenAiGenerator;
pub use rest_poster::RestPoster;
pub use web_scraper::WebScraper;
pub use webhook_workflow::WebhookWorkflow;

use crate::base::AdapterCore;
use crate::capabilities::Options;
use crate::error::{AdapterResult, ErrorRecord, codes};
use crate::http::RequestOptions;
use serde_json::{Map, Value};
use url::Url;

/// Append path segments to `base`, keeping its scheme, host and query.
///
/// ```rust
/// use adapterkit::adapters::join_path;
///
/// let url = join_path("https://blog.example.com/", &["wp-json", "wp/v2", "posts"]).unwrap();
/// assert_eq!(url, "https://blog.example.com/wp-json/wp/v2/posts");
/// ```
///
/// # Errors
///
/// `invalid_url` when `base` is not an absolute URL that can take a path.
pub fn join_path(base: &str, segments: &[&str]) -> AdapterResult<String> {
    let mut url = Url::parse(base.trim()).map_err(|e| invalid_url(base, &e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid_url(base, "URL cannot be a base"))?
        .pop_if_empty()
        .extend(
            segments
                .iter()
                .flat_map(|segment| segment.split('/'))
                .filter(|segment| !segment.is_empty()),
        );
    Ok(url.into())
}

fn invalid_url(base: &str, detail: &str) -> ErrorRecord {
    ErrorRecord::new(codes::INVALID_URL, format!("Invalid URL '{base}': {detail}"))
        .with_context("url", base)
}

/// Request options for one call.
///
/// Starts from the adapter's configured `timeout` and `retries`, then
/// applies the caller's `options["request"]` object on top.
pub(crate) fn request_options(
    core: &AdapterCore,
    options: &Options,
) -> AdapterResult<RequestOptions> {
    let mut merged = Map::new();
    for key in ["timeout", "retries", "redirection"] {
        if let Some(value) = core.config().get(key) {
            merged.insert(key.to_string(), value.clone());
        }
    }
    match options.get("request") {
        Some(Value::Object(overrides)) => merged.extend(overrides.clone()),
        Some(Value::Null) | None => {}
        Some(_) => {
            return core.fail(ErrorRecord::new(
                codes::INVALID_OPTIONS,
                "Request overrides must be an object",
            ));
        }
    }
    RequestOptions::from_value(&Value::Object(merged)).map_err(|err| core.record(err))
}

/// Render an id the remote service returned as a number or a string.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

pub(crate) fn invalid_response(url: &str, detail: impl std::fmt::Display) -> ErrorRecord {
    ErrorRecord::new(
        codes::INVALID_RESPONSE,
        format!("Unexpected response from service: {detail}"),
    )
    .with_context("url", url)
}
