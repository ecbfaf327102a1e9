//! Common test utilities and helpers

use adapterkit::{HttpRequest, HttpResponse, LogLevel, LogSink, Transport, TransportError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One captured log record
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Record {
    pub level: LogLevel,
    pub message: String,
    pub context: Map<String, Value>,
}

/// Sink that keeps every record for inspection
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Record>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn at(&self, level: LogLevel) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: LogLevel, message: &str, context: &Map<String, Value>) {
        self.records.lock().unwrap().push(Record {
            level,
            message: message.to_string(),
            context: context.clone(),
        });
    }
}

/// Transport that replays a fixed script of outcomes, one per call
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("script exhausted".into())))
    }
}

/// Response with a status and a text body
#[allow(dead_code)]
pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse::new(status, HashMap::new(), body.as_bytes().to_vec())
}

/// Transport failure that is worth retrying
#[allow(dead_code)]
pub fn refused() -> TransportError {
    TransportError::Connection("connection refused".into())
}

/// Build a raw config map from a JSON object literal
#[allow(dead_code)]
pub fn raw(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
