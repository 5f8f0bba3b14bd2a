//! External veto hook.
//!
//! Operators may point a flow step at an HTTP endpoint that answers
//! whether a username should be blocked. The request is
//! `GET <hook-url>?username=<value>`; a 2xx response whose body is exactly
//! `yes` is a veto. Every other outcome, including transport failures and
//! timeouts, is treated as "no": the hook is advisory and must never block
//! a flow on its own unavailability.

use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::error::{AuthError, AuthResult};

/// Query parameter carrying the candidate value.
pub const USERNAME_PARAM: &str = "username";

/// Body the endpoint returns to veto a candidate.
const VETO_BODY: &str = "yes";

/// Answer from the hook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResponse {
    /// The endpoint asked to block the candidate.
    Yes,
    /// The endpoint answered with anything other than a veto.
    No,
    /// The endpoint could not be asked (bad URL, transport error,
    /// timeout, non-2xx status).
    Unknown,
}

impl HookResponse {
    /// Returns whether the candidate must be rejected.
    #[must_use]
    pub const fn is_veto(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// Hook transport settings.
#[derive(Debug, Clone)]
pub struct HookSettings {
    /// Upper bound for the whole request, body included.
    pub timeout: Duration,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl HookSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for veto hooks.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HookClient {
    client: reqwest::Client,
}

impl HookClient {
    /// Creates a hook client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the HTTP client cannot be built.
    pub fn new(settings: &HookSettings) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("failed to build hook client: {e}")))?;
        Ok(Self { client })
    }

    /// Creates a hook client with default settings.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the HTTP client cannot be built.
    pub fn with_defaults() -> AuthResult<Self> {
        Self::new(&HookSettings::default())
    }

    /// Asks the hook about `value`.
    ///
    /// Never fails: errors are logged and reported as
    /// [`HookResponse::Unknown`]. The call is not retried.
    pub async fn query(&self, base_url: &str, value: &str) -> HookResponse {
        let url = match build_url(base_url, value) {
            Ok(url) => url,
            Err(e) => {
                warn!(base_url, error = %e, "Failed hook request: invalid hook URL");
                return HookResponse::Unknown;
            }
        };

        match self.fetch(&url).await {
            Ok(body) if body == VETO_BODY => {
                warn!(url = %url, "Matched hook request");
                HookResponse::Yes
            }
            Ok(_) => HookResponse::No,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed hook request");
                HookResponse::Unknown
            }
        }
    }

    async fn fetch(&self, url: &Url) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        response.text().await
    }
}

/// Appends the candidate as the `username` query parameter.
///
/// Existing query parameters of the configured URL are kept.
///
/// # Errors
///
/// Returns the parse error if `base_url` is not an absolute URL.
pub fn build_url(base_url: &str, value: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    url.query_pairs_mut().append_pair(USERNAME_PARAM, value);
    Ok(url)
}
