use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use url::Url;

use super::config::FetcherConfig;
use super::hooks::{ResponseHook, SharedHook};
use super::transport::{CredentialPolicy, ReqwestTransport, Transport};
use super::{ConfigurationError, Fetcher};

/// Builder for [`Fetcher`] instances, the fetcher factory.
///
/// Nothing is validated until [`build`](Self::build) (or [`build_with`](Self::build_with)),
/// which either returns a ready fetcher or a [`ConfigurationError`].
///
/// # Default Configuration
///
/// - **Default headers**: none
/// - **Credentials**: [`CredentialPolicy::SameOrigin`]
/// - **Timeout**: none
/// - **Default error message**: none (the status reason phrase is used)
/// - **Hooks**: none
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use abeg_fetch::{CredentialPolicy, Fetcher};
///
/// # fn example() -> Result<(), abeg_fetch::ConfigurationError> {
/// let fetcher = Fetcher::builder("https://api.example.com")
///     .with_timeout(Duration::from_secs(60))
///     .with_credentials(CredentialPolicy::Include)
///     .with_header("X-Client", "web")
///     .with_default_error_message("Something went wrong")
///     .build()?;
///
/// assert_eq!(fetcher.config().timeout(), Some(Duration::from_secs(60)));
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct FetcherBuilder {
    base_endpoint: String,
    default_headers: IndexMap<String, String>,
    credentials: CredentialPolicy,
    timeout: Option<Duration>,
    default_error_message: Option<String>,
    #[debug(skip)]
    on_response: Option<SharedHook>,
    #[debug(skip)]
    on_response_error: Option<SharedHook>,
}

impl FetcherBuilder {
    /// Starts a builder for the given base endpoint.
    pub fn new(base_endpoint: impl Into<String>) -> Self {
        Self {
            base_endpoint: base_endpoint.into(),
            default_headers: IndexMap::new(),
            credentials: CredentialPolicy::default(),
            timeout: None,
            default_error_message: None,
            on_response: None,
            on_response_error: None,
        }
    }

    /// Adds a header sent with every request. A later call with the same name wins.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Adds several default headers.
    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.default_headers
            .extend(headers.into_iter().map(|(name, value)| (name.into(), value.into())));
        self
    }

    /// Sets the cookie policy.
    pub fn with_credentials(mut self, credentials: CredentialPolicy) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the per-request timeout in milliseconds.
    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    /// Sets the message used when an error response carries no usable payload.
    pub fn with_default_error_message(mut self, message: impl Into<String>) -> Self {
        self.default_error_message = Some(message.into());
        self
    }

    /// Registers the hook run on every 2xx response.
    pub fn on_response(mut self, hook: impl ResponseHook) -> Self {
        self.on_response = Some(Arc::new(hook));
        self
    }

    /// Registers the hook run on every non-2xx response.
    ///
    /// This is the place for status-driven global reactions, such as dropping the session
    /// on a 401.
    pub fn on_response_error(mut self, hook: impl ResponseHook) -> Self {
        self.on_response_error = Some(Arc::new(hook));
        self
    }

    /// Builds a fetcher using the default [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when the base endpoint is empty, not an absolute
    /// `http`/`https` URL, the timeout is zero, or a default header is invalid.
    pub fn build(self) -> Result<Fetcher, ConfigurationError> {
        self.build_with(ReqwestTransport::new())
    }

    /// Builds a fetcher using a custom transport.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with<T>(self, transport: T) -> Result<Fetcher<T>, ConfigurationError>
    where
        T: Transport,
    {
        let config = self.into_config()?;
        Ok(Fetcher {
            config: Arc::new(config),
            transport: Arc::new(transport),
        })
    }

    fn into_config(self) -> Result<FetcherConfig, ConfigurationError> {
        let Self {
            base_endpoint,
            default_headers,
            credentials,
            timeout,
            default_error_message,
            on_response,
            on_response_error,
        } = self;

        let base_endpoint = parse_base_endpoint(&base_endpoint)?;

        if timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigurationError::ZeroTimeout);
        }

        let default_headers = to_header_map(default_headers)?;

        Ok(FetcherConfig {
            base_endpoint,
            default_headers,
            credentials,
            timeout,
            default_error_message,
            on_response,
            on_response_error,
        })
    }
}

fn parse_base_endpoint(endpoint: &str) -> Result<Url, ConfigurationError> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::EmptyBaseEndpoint);
    }

    let url = Url::parse(trimmed).map_err(|err| ConfigurationError::InvalidBaseEndpoint {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ConfigurationError::UnsupportedScheme {
                scheme: scheme.to_string(),
            });
        }
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigurationError::InvalidBaseEndpoint {
            endpoint: endpoint.to_string(),
            message: "query strings and fragments are not allowed".to_string(),
        });
    }

    Ok(url)
}

fn to_header_map(headers: IndexMap<String, String>) -> Result<HeaderMap, ConfigurationError> {
    let mut result = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigurationError::InvalidHeaderName { name: name.clone() })?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|_| ConfigurationError::InvalidHeaderValue { name: name.clone() })?;
        result.insert(header_name, header_value);
    }
    Ok(result)
}
