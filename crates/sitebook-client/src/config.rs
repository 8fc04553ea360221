//! Backend connection settings.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

/// Request timeout used unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the backend lives and how to authenticate.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Sent as a bearer token when set.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Parses the backend base URL, e.g. `http://localhost:5000`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self {
            base_url,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets the bearer token. A blank token means none.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token.trim().to_string())
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds an endpoint URL by appending percent-encoded path segments
    /// to the base URL's path.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
