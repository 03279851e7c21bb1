use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

mod abort;
pub use self::abort::AbortReason;

mod body;
pub use self::body::{FormData, FormPart, RequestBody};

mod builder;
pub use self::builder::FetcherBuilder;

mod call;
pub use self::call::FetchCall;

mod config;
pub use self::config::FetcherConfig;

mod error;
pub use self::error::{ConfigurationError, FetcherError};

mod hooks;
pub use self::hooks::{HookFuture, HookResult, ResponseHook};

mod path;
pub use self::path::ApiPath;

mod response;
pub use self::response::{
    ErrorPayload, ErrorStatus, FieldErrors, RawResponse, ResultEnvelope, SuccessPayload,
    SuccessStatus, classify_response,
};

pub(crate) mod transport;
pub use self::transport::{
    CredentialPolicy, OutgoingRequest, ReqwestTransport, Transport, TransportError,
    TransportErrorKind,
};

/// A preconfigured request function for one backend.
///
/// A `Fetcher` is what the factory returns: the validated [`FetcherConfig`] plus a
/// [`Transport`], both shared behind `Arc`. Cloning is cheap and every clone issues
/// requests with the same configuration. Nothing in it is mutated by a call, so concurrent
/// calls do not interfere with each other.
///
/// # Example
///
/// ```rust,no_run
/// use std::collections::BTreeMap;
///
/// use abeg_fetch::{FieldErrors, Fetcher, RequestBody};
/// use serde::Deserialize;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Debug, Deserialize)]
/// struct Session {
///     token: String,
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::builder("https://api.example.com")
///     .with_timeout_ms(60_000)
///     .build()?;
///
/// let body = RequestBody::json(&BTreeMap::from([("email", "ada@example.com")]))?;
/// let envelope = fetcher
///     .request::<Session, FieldErrors>("/auth/signin", Some(body), Some(CancellationToken::new()))
///     .await?;
///
/// if let Some(success) = envelope.data() {
///     println!("{}: {:?}", success.message, success.data);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct Fetcher<T = ReqwestTransport> {
    pub(super) config: Arc<FetcherConfig>,
    #[debug(skip)]
    pub(super) transport: Arc<T>,
}

impl<T> Clone for Fetcher<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

// Create
impl Fetcher {
    /// Starts a [`FetcherBuilder`] for the given base endpoint.
    pub fn builder(base_endpoint: impl Into<String>) -> FetcherBuilder {
        FetcherBuilder::new(base_endpoint)
    }
}

// Request
impl<T> Fetcher<T>
where
    T: Transport,
{
    /// The configuration shared by every request.
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// The transport requests go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Prepares a request to `path`, to be refined and then awaited.
    ///
    /// # Errors
    ///
    /// Returns a [`FetcherError`] when the path is malformed.
    pub fn call<D>(
        &self,
        path: impl TryInto<ApiPath, Error = FetcherError>,
    ) -> Result<FetchCall<D, FieldErrors, T>, FetcherError> {
        let path = path.try_into()?;
        FetchCall::build(Arc::clone(&self.config), Arc::clone(&self.transport), path)
    }

    /// Performs one request: `POST` with the body when one is given, `GET` otherwise.
    ///
    /// Every network or HTTP outcome, including timeouts, cancellation and transport
    /// failures, is folded into the returned [`ResultEnvelope`].
    ///
    /// # Errors
    ///
    /// Returns a [`FetcherError`] only for caller misuse, such as a malformed path. In that
    /// case nothing is sent.
    pub async fn request<D, E>(
        &self,
        path: impl TryInto<ApiPath, Error = FetcherError>,
        body: Option<RequestBody>,
        signal: Option<CancellationToken>,
    ) -> Result<ResultEnvelope<D, E>, FetcherError>
    where
        D: DeserializeOwned + Send + 'static,
        E: DeserializeOwned + Send + 'static,
    {
        let mut call = self.call::<D>(path)?.with_error_type::<E>();
        if let Some(body) = body {
            call = call.body(body);
        }
        if let Some(signal) = signal {
            call = call.with_signal(signal);
        }

        Ok(call.await)
    }
}
