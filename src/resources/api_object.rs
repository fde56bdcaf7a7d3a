//! Generic wrapper around a resource returned by the service.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

use crate::client::RequestExecutor;
use crate::errors::{DocCloudError, DocCloudResult};
use crate::types::RequestContent;

/// A resource created by the service.
///
/// `result` is the creation response and never changes. `data` starts empty
/// and is replaced wholesale by every [`refresh`](ApiObject::refresh);
/// attribute lookups read `data` only.
#[derive(Debug, Clone)]
pub struct ApiObject {
    executor: Arc<RequestExecutor>,
    result: Value,
    data: Map<String, Value>,
}

impl ApiObject {
    /// Wraps a creation result.
    pub fn new(executor: Arc<RequestExecutor>, result: Value) -> DocCloudResult<Self> {
        if result.is_null() {
            return Err(DocCloudError::invalid_parameter(
                "Object Result parameter is not set",
            ));
        }

        Ok(Self {
            executor,
            result,
            data: Map::new(),
        })
    }

    /// The creation result.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// The data fetched by the last refresh.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The executor used for follow-up requests.
    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    /// Re-fetches the resource and replaces `data`.
    ///
    /// The resource is fetched from `parameters["url"]`, or from the creation
    /// result's `url` when not given. The remaining parameters are sent as
    /// query parameters. The request is unauthenticated.
    #[instrument(skip(self, parameters))]
    pub async fn refresh(&mut self, parameters: Option<Map<String, Value>>) -> DocCloudResult<()> {
        let mut parameters = parameters.unwrap_or_default();

        let url = match parameters.remove("url") {
            Some(Value::String(url)) => url,
            _ => self
                .result
                .get("url")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| DocCloudError::invalid_parameter("url parameter is not set"))?,
        };

        let response = self
            .executor
            .get(&url, RequestContent::QueryParams(parameters), false)
            .await?;

        self.data = match response.into_json().await? {
            Value::Object(data) => data,
            _ => Map::new(),
        };

        tracing::debug!(fields = self.data.len(), "Resource refreshed");
        Ok(())
    }

    /// Returns a top-level attribute, `None` when absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Returns a string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Follows a dotted path through nested mappings and list indices,
    /// e.g. `output.files.0.filename`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.data.get(segments.next()?)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }
}
