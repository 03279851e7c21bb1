use std::time::Duration;

use http::HeaderMap;
use url::Url;

use super::hooks::SharedHook;
use super::transport::CredentialPolicy;

/// Validated, immutable configuration shared by every request of a [`Fetcher`](super::Fetcher).
///
/// Built through [`FetcherBuilder`](super::FetcherBuilder); once built nothing in it changes.
#[derive(derive_more::Debug)]
pub struct FetcherConfig {
    pub(super) base_endpoint: Url,
    pub(super) default_headers: HeaderMap,
    pub(super) credentials: CredentialPolicy,
    pub(super) timeout: Option<Duration>,
    pub(super) default_error_message: Option<String>,
    #[debug("{}", if on_response.is_some() { "Some(<hook>)" } else { "None" })]
    pub(super) on_response: Option<SharedHook>,
    #[debug("{}", if on_response_error.is_some() { "Some(<hook>)" } else { "None" })]
    pub(super) on_response_error: Option<SharedHook>,
}

impl FetcherConfig {
    /// Absolute base URL every path is appended to.
    pub fn base_endpoint(&self) -> &Url {
        &self.base_endpoint
    }

    /// Headers sent with every request, beneath per-call headers.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Cookie policy passed to the transport.
    pub fn credentials(&self) -> CredentialPolicy {
        self.credentials
    }

    /// Per-request timeout, `None` for no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Message used when an error response carries no usable payload.
    pub fn default_error_message(&self) -> Option<&str> {
        self.default_error_message.as_deref()
    }
}
