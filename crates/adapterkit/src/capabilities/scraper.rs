//! Page fetching and extraction capability

use super::Options;
use crate::base::Adapter;
use crate::error::{AdapterResult, ErrorRecord, codes};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A fetched page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// Raw HTML
    pub html: String,
    /// Extracted fields, when selectors were supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

/// Request budget for the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    /// Requests left
    pub remaining: u64,
    /// Requests per window
    pub limit: u64,
    /// When the window resets
    pub reset_at: DateTime<Utc>,
}

/// Per-URL outcome of a batch. Every requested URL has an entry.
pub type BatchResults = BTreeMap<String, AdapterResult<ScrapedPage>>;

/// Fetching pages and extracting data from them.
#[async_trait]
pub trait Scraper: Adapter {
    /// Fetch one page.
    async fn scrape(&self, url: &str, options: &Options) -> AdapterResult<ScrapedPage>;

    /// Fetch several pages. Each URL succeeds or fails on its own; a failure
    /// never stops the rest of the batch.
    async fn scrape_batch(&self, urls: &[String], options: &Options) -> BatchResults {
        let mut results = BatchResults::new();
        for url in urls {
            let result = self.scrape(url, options).await;
            results.insert(url.clone(), result);
        }
        results
    }

    /// Extract fields from `html`. See [`extract_fields`].
    fn extract(
        &self,
        html: &str,
        selectors: &Map<String, Value>,
    ) -> AdapterResult<Map<String, Value>> {
        extract_fields(html, selectors).map_err(|err| self.core().record(err))
    }

    /// Current request budget.
    async fn rate_limit_status(&self) -> RateLimitStatus;
}

/// Extract one value per field from `html`.
///
/// Each selector is a CSS selector, optionally suffixed with `@attr` to read
/// an attribute instead of the element text. A field with no match is
/// `null`, one match is a string, several matches are an array.
///
/// # Example
///
/// ```rust
/// use adapterkit::capabilities::extract_fields;
/// use serde_json::json;
///
/// let html = r#"<h1> Hello </h1><a href="/a">A</a><a href="/b">B</a>"#;
/// let selectors = json!({"title": "h1", "links": "a@href", "missing": "h2"});
/// let data = extract_fields(html, selectors.as_object().unwrap()).unwrap();
///
/// assert_eq!(data["title"], "Hello");
/// assert_eq!(data["links"], json!(["/a", "/b"]));
/// assert!(data["missing"].is_null());
/// ```
///
/// # Errors
///
/// `invalid_selector` when a selector is not a string or does not parse.
pub fn extract_fields(
    html: &str,
    selectors: &Map<String, Value>,
) -> AdapterResult<Map<String, Value>> {
    let document = ::scraper::Html::parse_document(html);
    let mut data = Map::new();

    for (field, spec) in selectors {
        let spec = spec
            .as_str()
            .ok_or_else(|| invalid_selector(field, "selector must be a string"))?;
        let (css, attr) = split_attr(spec);
        let selector = ::scraper::Selector::parse(css)
            .map_err(|e| invalid_selector(field, &format!("{e:?}")))?;

        let mut values: Vec<Value> = document
            .select(&selector)
            .filter_map(|element| match attr {
                Some(name) => element.value().attr(name).map(|v| Value::from(v.trim())),
                None => Some(Value::from(collapse(&element.text().collect::<String>()))),
            })
            .collect();

        let value = match values.len() {
            0 => Value::Null,
            1 => values.remove(0),
            _ => Value::Array(values),
        };
        data.insert(field.clone(), value);
    }

    Ok(data)
}

fn split_attr(spec: &str) -> (&str, Option<&str>) {
    match spec.rsplit_once('@') {
        Some((css, attr))
            if !attr.is_empty()
                && attr
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')) =>
        {
            (css.trim(), Some(attr))
        }
        _ => (spec.trim(), None),
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn invalid_selector(field: &str, detail: &str) -> ErrorRecord {
    ErrorRecord::new(
        codes::INVALID_SELECTOR,
        format!("Invalid selector for '{field}': {detail}"),
    )
    .with_context("field", field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn selectors(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_text_is_collapsed() {
        let html = "<div class='t'>\n  a   <b>b</b>\n c </div>";
        let data = extract_fields(html, &selectors(json!({"t": ".t"}))).unwrap();
        assert_eq!(data["t"], "a b c");
    }

    #[test]
    fn test_attribute_selector_with_at_inside_brackets() {
        let html = r#"<a href="mailto:x@y.z">mail</a>"#;
        let data = extract_fields(html, &selectors(json!({"m": "a[href*='@']"}))).unwrap();
        assert_eq!(data["m"], "mail");
    }

    #[test]
    fn test_missing_attribute_is_skipped() {
        let html = r#"<img src="/1.png"><img>"#;
        let data = extract_fields(html, &selectors(json!({"src": "img@src"}))).unwrap();
        assert_eq!(data["src"], "/1.png");
    }

    #[test]
    fn test_invalid_selectors() {
        let err = extract_fields("<p></p>", &selectors(json!({"bad": "p[["}))).unwrap_err();
        assert_eq!(err.code, codes::INVALID_SELECTOR);
        assert_eq!(err.context["field"], "bad");

        let err = extract_fields("<p></p>", &selectors(json!({"n": 3}))).unwrap_err();
        assert_eq!(err.code, codes::INVALID_SELECTOR);
    }
}
