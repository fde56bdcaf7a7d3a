//! Configuration module for the DocCloud client.
//!
//! Holds the endpoint, protocol, access token and transport settings. A
//! configuration is immutable once built and can be shared freely between
//! clients and threads.

use secrecy::{ExposeSecret, SecretString};
use std::str::FromStr;
use std::time::Duration;

use crate::auth::token_hint;
use crate::errors::{DocCloudError, DocCloudResult};

/// Default API endpoint (host and path, without scheme).
pub const DEFAULT_ENDPOINT: &str = "doccloud.byshosting.nl/api/v1";

/// Default protocol used to reach the API.
pub const DEFAULT_PROTOCOL: Protocol = Protocol::Http;

/// Default request timeout (300 seconds; conversions can upload large files).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// URL scheme used to reach the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Protocol {
    /// Returns the scheme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = DocCloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(DocCloudError::invalid_parameter(format!(
                "Unsupported protocol '{}', expected http or https",
                other
            ))),
        }
    }
}

/// Configuration for the DocCloud client.
#[derive(Clone)]
pub struct DocCloudConfig {
    /// Access token for authenticated requests (stored securely).
    pub(crate) access_token: SecretString,
    /// API endpoint, host and path without scheme.
    pub endpoint: String,
    /// Protocol used to reach the endpoint.
    pub protocol: Protocol,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl DocCloudConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DocCloudConfigBuilder {
        DocCloudConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DOCCLOUD_ACCESS_TOKEN` (required): access token
    /// - `DOCCLOUD_ENDPOINT` (optional): custom endpoint
    /// - `DOCCLOUD_PROTOCOL` (optional): `http` or `https`
    /// - `DOCCLOUD_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> DocCloudResult<Self> {
        let access_token = std::env::var("DOCCLOUD_ACCESS_TOKEN").map_err(|_| {
            DocCloudError::invalid_parameter("DOCCLOUD_ACCESS_TOKEN environment variable not set")
        })?;

        let mut builder = DocCloudConfigBuilder::new().access_token(access_token);

        if let Ok(endpoint) = std::env::var("DOCCLOUD_ENDPOINT") {
            builder = builder.endpoint(endpoint);
        }

        if let Ok(protocol) = std::env::var("DOCCLOUD_PROTOCOL") {
            builder = builder.protocol(protocol.parse()?);
        }

        if let Ok(timeout_str) = std::env::var("DOCCLOUD_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout_secs(timeout_secs);
            }
        }

        builder.build()
    }

    /// Returns the access token (exposing the secret).
    pub(crate) fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Returns the access token hint (last 4 characters) for debugging.
    pub fn access_token_hint(&self) -> String {
        token_hint(self.access_token.expose_secret())
    }

    /// Returns `<protocol>://<endpoint>`, the prefix of relative API paths.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.endpoint)
    }
}

impl std::fmt::Debug for DocCloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocCloudConfig")
            .field("access_token", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("protocol", &self.protocol)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for `DocCloudConfig`.
#[derive(Default)]
pub struct DocCloudConfigBuilder {
    access_token: Option<String>,
    endpoint: Option<String>,
    protocol: Option<Protocol>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl DocCloudConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access token.
    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Sets the endpoint (host and path, without scheme).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the protocol.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DocCloudResult<DocCloudConfig> {
        let access_token = self
            .access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| DocCloudError::invalid_parameter("Access Token parameter is empty"))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        if endpoint.is_empty() {
            return Err(DocCloudError::invalid_parameter("Endpoint cannot be empty"));
        }

        if endpoint.contains("://") {
            return Err(DocCloudError::invalid_parameter(
                "Endpoint must not include a scheme; set the protocol instead",
            ));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("integrations-doccloud/{}", env!("CARGO_PKG_VERSION")));

        Ok(DocCloudConfig {
            access_token: SecretString::new(access_token),
            endpoint,
            protocol: self.protocol.unwrap_or(DEFAULT_PROTOCOL),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent,
        })
    }
}
