use std::marker::PhantomData;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::config::FetcherConfig;
use super::transport::{ReqwestTransport, Transport};
use super::{ApiPath, FetcherError, FieldErrors, FormData, RequestBody};

mod execution;

/// A single request being prepared, created by [`Fetcher::call`](super::Fetcher::call).
///
/// Awaiting the call performs the exchange and always yields a
/// [`ResultEnvelope<D, E>`](super::ResultEnvelope): misuse is reported by the builder
/// methods before anything is sent.
///
/// # Method Groups
///
/// ## Request Body
/// - [`json(data)`](Self::json) - JSON body with `Content-Type: application/json`
/// - [`multipart(form)`](Self::multipart) - multipart body, content type left to the transport
/// - [`body(body)`](Self::body) - an already built [`RequestBody`]
///
/// ## Request Options
/// - [`with_method(method)`](Self::with_method) - override the method (default: `POST` with a body, `GET` without)
/// - [`with_header(name, value)`](Self::with_header) - per-call header, wins over default headers
/// - [`with_signal(token)`](Self::with_signal) - external cancellation
/// - [`with_error_type::<E2>()`](Self::with_error_type) - change the error details type
///
/// # Example
///
/// ```rust,no_run
/// use abeg_fetch::{Fetcher, FormData, FormPart};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Campaign {
///     id: String,
/// }
///
/// # async fn example(fetcher: Fetcher) -> Result<(), Box<dyn std::error::Error>> {
/// let form = FormData::new()
///     .set("story", "A story that is long enough")
///     .set("campaignId", "abc")
///     .append("photos", FormPart::file("cover.png", mime::IMAGE_PNG, vec![0x89, 0x50]));
///
/// let envelope = fetcher
///     .call::<Campaign>("/campaign/create/three")?
///     .multipart(form)
///     .await;
///
/// match envelope.into_result() {
///     Ok(success) => println!("{}", success.message),
///     Err(error) => eprintln!("{}: {}", error.status, error.message),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct FetchCall<D, E = FieldErrors, T = ReqwestTransport> {
    #[debug(skip)]
    pub(super) config: Arc<FetcherConfig>,
    #[debug(skip)]
    pub(super) transport: Arc<T>,
    pub(super) path: ApiPath,
    pub(super) url: Url,
    pub(super) method: Option<Method>,
    pub(super) headers: HeaderMap,
    pub(super) body: Option<RequestBody>,
    pub(super) signal: Option<CancellationToken>,
    #[debug(skip)]
    pub(super) marker: PhantomData<fn() -> (D, E)>,
}

impl<D, E, T> FetchCall<D, E, T>
where
    T: Transport,
{
    pub(super) fn build(
        config: Arc<FetcherConfig>,
        transport: Arc<T>,
        path: ApiPath,
    ) -> Result<Self, FetcherError> {
        let url = path.join(config.base_endpoint())?;

        Ok(Self {
            config,
            transport,
            path,
            url,
            method: None,
            headers: HeaderMap::new(),
            body: None,
            signal: None,
            marker: PhantomData,
        })
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`FetcherError::Serialization`] when the value cannot be serialized.
    pub fn json<B>(self, body: &B) -> Result<Self, FetcherError>
    where
        B: Serialize + ?Sized,
    {
        Ok(self.body(RequestBody::json(body)?))
    }

    /// Sets a multipart body.
    pub fn multipart(self, form: FormData) -> Self {
        self.body(RequestBody::Multipart(form))
    }

    /// Sets the body.
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Adds a per-call header, replacing a default header of the same name.
    ///
    /// # Errors
    ///
    /// Returns an error when the name or value is not a valid header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, FetcherError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Attaches an external cancellation token.
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Changes the type the `error` details of a failure are read as.
    pub fn with_error_type<E2>(self) -> FetchCall<D, E2, T> {
        let Self {
            config,
            transport,
            path,
            url,
            method,
            headers,
            body,
            signal,
            marker: _,
        } = self;

        FetchCall {
            config,
            transport,
            path,
            url,
            method,
            headers,
            body,
            signal,
            marker: PhantomData,
        }
    }
}
