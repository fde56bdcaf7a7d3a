//! Conversion service.

use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::client::RequestExecutor;
use crate::errors::DocCloudResult;
use crate::resources::Convert;
use crate::types::RequestContent;

/// Path of the conversion endpoint.
const CONVERT_PATH: &str = "/convert";

/// Conversion service for starting conversion jobs.
#[derive(Debug, Clone)]
pub struct ConvertService {
    executor: Arc<RequestExecutor>,
}

impl ConvertService {
    /// Creates a new conversion service.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Starts a conversion job.
    ///
    /// Sends an authenticated `POST /convert` with `parameters` and wraps the
    /// result. Upload source files with [`RequestContent::MultipartFiles`] or
    /// a raw body with [`RequestContent::RawStream`].
    #[instrument(skip(self, parameters))]
    pub async fn create(&self, parameters: RequestContent) -> DocCloudResult<Convert> {
        let result = self
            .executor
            .post(CONVERT_PATH, parameters, true)
            .await?
            .into_json()
            .await?;

        tracing::debug!(id = ?result.get("id"), "Conversion created");
        Convert::new(Arc::clone(&self.executor), result)
    }

    /// Wraps the result of an earlier [`create`](ConvertService::create),
    /// e.g. one stored between runs, to continue with the job.
    pub fn resume(&self, result: Value) -> DocCloudResult<Convert> {
        Convert::new(Arc::clone(&self.executor), result)
    }
}
