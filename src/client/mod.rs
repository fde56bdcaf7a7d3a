//! DocCloud API client.
//!
//! Provides the main client interface and the request executor shared by
//! services and resources.

mod executor;

pub use executor::{classify_error, RequestExecutor, JSON_CONTENT_TYPE};

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthProvider, BearerTokenAuth};
use crate::config::{DocCloudConfig, DocCloudConfigBuilder, Protocol};
use crate::errors::DocCloudResult;
use crate::resources::Convert;
use crate::services::ConvertService;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::RequestContent;

/// The main DocCloud client.
///
/// # Example
///
/// ```rust,no_run
/// use integrations_doccloud::{DocCloudClient, Protocol, RequestContent};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = DocCloudClient::builder()
///         .access_token("dc_your_token")
///         .protocol(Protocol::Https)
///         .build()?;
///
///     let job = client
///         .convert()
///         .create(RequestContent::files(["report.docx"]))
///         .await?;
///     println!("Created {:?}", job.url());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DocCloudClient {
    executor: Arc<RequestExecutor>,
    convert_service: ConvertService,
}

impl DocCloudClient {
    /// Creates a new client builder.
    pub fn builder() -> DocCloudClientBuilder {
        DocCloudClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `DOCCLOUD_ACCESS_TOKEN` and optionally `DOCCLOUD_ENDPOINT`,
    /// `DOCCLOUD_PROTOCOL` and `DOCCLOUD_TIMEOUT`.
    pub fn from_env() -> DocCloudResult<Self> {
        let config = DocCloudConfig::from_env()?;
        DocCloudClientBuilder::from_config(config).build()
    }

    /// Creates a client from an access token with default settings.
    pub fn from_access_token(access_token: impl Into<String>) -> DocCloudResult<Self> {
        DocCloudClientBuilder::new().access_token(access_token).build()
    }

    /// Returns the conversion service.
    pub fn convert(&self) -> &ConvertService {
        &self.convert_service
    }

    /// Starts a conversion job; shorthand for `convert().create(parameters)`.
    pub async fn create_convert(&self, parameters: RequestContent) -> DocCloudResult<Convert> {
        self.convert_service.create(parameters).await
    }

    /// Returns the request executor for calls not covered by a service.
    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DocCloudConfig {
        self.executor.config()
    }
}

impl std::fmt::Debug for DocCloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocCloudClient")
            .field("config", self.config())
            .finish()
    }
}

/// Builder for the DocCloud client.
pub struct DocCloudClientBuilder {
    config_builder: DocCloudConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl DocCloudClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: DocCloudConfigBuilder::new(),
            transport: None,
            auth: None,
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: DocCloudConfig) -> Self {
        Self {
            config_builder: DocCloudConfigBuilder::new()
                .access_token(config.access_token())
                .endpoint(&config.endpoint)
                .protocol(config.protocol)
                .timeout(config.timeout)
                .user_agent(&config.user_agent),
            transport: None,
            auth: None,
        }
    }

    /// Sets the access token.
    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.access_token(access_token);
        self
    }

    /// Sets the endpoint (host and path, without scheme).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.endpoint(endpoint);
        self
    }

    /// Sets the protocol.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config_builder = self.config_builder.protocol(protocol);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config_builder = self.config_builder.timeout_secs(secs);
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(user_agent);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom auth provider.
    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Builds the client.
    pub fn build(self) -> DocCloudResult<DocCloudClient> {
        let config = self.config_builder.build()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_timeout(config.timeout)?),
        };

        let auth: Arc<dyn AuthProvider> = match self.auth {
            Some(auth) => auth,
            None => Arc::new(BearerTokenAuth::from_string(config.access_token())),
        };
        auth.validate()?;

        tracing::debug!(
            endpoint = %config.endpoint,
            protocol = %config.protocol,
            token = %config.access_token_hint(),
            "Building DocCloud client"
        );

        let executor = Arc::new(RequestExecutor::new(config, transport, auth));

        Ok(DocCloudClient {
            convert_service: ConvertService::new(Arc::clone(&executor)),
            executor,
        })
    }
}

impl Default for DocCloudClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<DocCloudConfig> for DocCloudClientBuilder {
    fn from(config: DocCloudConfig) -> Self {
        Self::from_config(config)
    }
}

impl std::fmt::Debug for DocCloudClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocCloudClientBuilder")
            .field("custom_transport", &self.transport.is_some())
            .field("custom_auth", &self.auth.is_some())
            .finish()
    }
}
