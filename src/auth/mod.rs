//! Authentication module for the DocCloud client.
//!
//! DocCloud authenticates requests with a bearer access token. The token is
//! kept in a [`SecretString`] and never appears in `Debug` output or logs.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

use crate::errors::{DocCloudError, DocCloudResult};

/// Authentication provider trait.
///
/// Implementations add credentials to the headers of authenticated requests.
pub trait AuthProvider: Send + Sync {
    /// Apply authentication to request headers.
    fn apply_auth(&self, headers: &mut HashMap<String, String>);

    /// Get the authentication scheme name.
    fn scheme(&self) -> &str;

    /// Validate the credentials.
    fn validate(&self) -> DocCloudResult<()>;
}

/// Bearer token authentication provider.
pub struct BearerTokenAuth {
    access_token: SecretString,
}

impl BearerTokenAuth {
    /// Creates a new bearer token provider.
    pub fn new(access_token: SecretString) -> Self {
        Self { access_token }
    }

    /// Creates a provider from a plain string token.
    pub fn from_string(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
        }
    }

    /// Gets a hint of the token for debugging (last 4 characters).
    pub fn token_hint(&self) -> String {
        token_hint(self.access_token.expose_secret())
    }
}

impl AuthProvider for BearerTokenAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.access_token.expose_secret()),
        );
    }

    fn scheme(&self) -> &str {
        "Bearer"
    }

    fn validate(&self) -> DocCloudResult<()> {
        if self.access_token.expose_secret().trim().is_empty() {
            return Err(DocCloudError::invalid_parameter("Access Token parameter is empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BearerTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuth")
            .field("access_token", &"[REDACTED]")
            .field("token_hint", &self.token_hint())
            .finish()
    }
}

pub(crate) fn token_hint(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 4 {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("...{}", tail)
    } else {
        "****".to_string()
    }
}
