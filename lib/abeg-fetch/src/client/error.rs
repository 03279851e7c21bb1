/// Errors raised while building a [`Fetcher`](crate::Fetcher).
///
/// These are programming or deployment errors: they surface once, when the factory is
/// invoked, and never appear inside a [`ResultEnvelope`](crate::ResultEnvelope).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ConfigurationError {
    /// The base endpoint is empty.
    #[display("Base endpoint must not be empty")]
    EmptyBaseEndpoint,

    /// The base endpoint is not an absolute URL.
    #[display("Invalid base endpoint '{endpoint}': {message}")]
    InvalidBaseEndpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Why it was rejected.
        message: String,
    },

    /// The base endpoint uses a scheme other than `http` or `https`.
    #[display("Unsupported scheme '{scheme}' for base endpoint, expected http or https")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },

    /// A zero timeout would abort every request before it is sent.
    #[display("Timeout must be a positive duration")]
    ZeroTimeout,

    /// A default header has an invalid name.
    #[display("Invalid default header name '{name}'")]
    InvalidHeaderName {
        /// The rejected header name.
        name: String,
    },

    /// A default header has an invalid value.
    #[display("Invalid value for default header '{name}'")]
    InvalidHeaderValue {
        /// The header whose value was rejected.
        name: String,
    },

    /// A required environment variable is missing or empty.
    #[display("{message}")]
    MissingEnv {
        /// The variable name.
        name: &'static str,
        /// Operator-facing hint.
        message: String,
    },

    /// An environment variable is present but cannot be parsed.
    #[display("Invalid value '{value}' for {name}: {message}")]
    InvalidEnv {
        /// The variable name.
        name: &'static str,
        /// The raw value.
        value: String,
        /// Parse failure description.
        message: String,
    },
}

/// Errors caused by misusing the request function.
///
/// Ordinary network and HTTP outcomes are never reported through this type, they are
/// folded into the [`ResultEnvelope`](crate::ResultEnvelope) instead.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum FetcherError {
    /// The request path is malformed.
    #[display("Invalid path '{path}': {reason}")]
    #[from(skip)]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Joining the base endpoint and the path did not produce a valid URL.
    InvalidUrl(url::ParseError),

    /// A per-call header name is invalid.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// A per-call header value is invalid.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The request body could not be serialized as JSON.
    Serialization(serde_json::Error),
}
