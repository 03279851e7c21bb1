//! The seam between the request function and the network.
//!
//! [`ReqwestTransport`] is the production implementation. Any other type implementing
//! [`Transport`] can be plugged into [`FetcherBuilder::build_with`](crate::FetcherBuilder::build_with),
//! which is how the crate's own tests script backend behaviour.

use std::future::Future;

use http::{HeaderMap, Method};
use url::Url;

use super::RawResponse;
use super::RequestBody;

mod error;
pub use self::error::{TransportError, TransportErrorKind};

mod reqwest_transport;
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(test)]
pub(crate) mod mock;

/// Whether cookies travel with requests, mirroring the fetch `credentials` option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CredentialPolicy {
    /// Never send or store cookies.
    Omit,
    /// Send and store cookies only while the request stays on the base endpoint origin.
    #[default]
    SameOrigin,
    /// Always send and store cookies.
    Include,
}

/// A fully prepared request handed to a [`Transport`].
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Merged headers, including the content type of JSON bodies.
    pub headers: HeaderMap,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Cookie policy, passed through unmodified.
    pub credentials: CredentialPolicy,
}

/// Sends one request and reads the whole response.
///
/// Implementations report only transport-level failures as errors. Every received status,
/// including 4xx and 5xx, is a successful [`RawResponse`]. Dropping the returned future
/// must abort the exchange: that is how timeouts and cancellation reach the network.
pub trait Transport: Send + Sync + 'static {
    /// Performs the exchange.
    fn send(
        &self,
        request: OutgoingRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}
