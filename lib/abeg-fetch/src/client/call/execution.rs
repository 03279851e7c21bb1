use std::future::{Future, IntoFuture};
use std::pin::Pin;

use headers::HeaderMapExt;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, debug_span, warn};
use uuid::Uuid;

use super::FetchCall;
use crate::client::abort::AbortScope;
use crate::client::config::FetcherConfig;
use crate::client::hooks::run_isolated;
use crate::client::transport::{OutgoingRequest, Transport, TransportError};
use crate::client::{
    ErrorPayload, RawResponse, RequestBody, ResultEnvelope, classify_response,
};

const FALLBACK_TRANSPORT_MESSAGE: &str = "Failed to fetch";

impl<D, E, T> FetchCall<D, E, T>
where
    D: DeserializeOwned,
    E: DeserializeOwned,
    T: Transport,
{
    /// Performs the exchange: `idle -> in-flight -> settled`.
    async fn exchange(self) -> ResultEnvelope<D, E> {
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

        let method = method.unwrap_or_else(|| default_method(body.as_ref()));
        let span = debug_span!("fetch", request_id = %Uuid::new_v4(), %method, %path);

        async move {
            let request = OutgoingRequest {
                method,
                url,
                headers: merge_headers(config.default_headers(), headers, body.as_ref()),
                body,
                credentials: config.credentials(),
            };

            // The scope owns the timer and the signal listener; both are gone once `run` returns.
            let outcome = AbortScope::new(config.timeout(), signal)
                .run(transport.send(request))
                .await;

            let response = match outcome {
                Ok(Ok(response)) => response,
                Ok(Err(error)) => {
                    warn!(%error, "transport failure");
                    return ResultEnvelope::Failure(ErrorPayload::new(transport_message(
                        &config, &error,
                    )));
                }
                Err(reason) => return ResultEnvelope::Failure(ErrorPayload::new(reason.to_string())),
            };

            debug!(status = %response.status(), "response received");
            run_hooks(&config, &response).await;

            classify_response(
                response.status(),
                response.body(),
                config.default_error_message(),
            )
        }
        .instrument(span)
        .await
    }
}

fn default_method(body: Option<&RequestBody>) -> Method {
    if body.is_some() {
        Method::POST
    } else {
        Method::GET
    }
}

/// Default headers, overridden by per-call headers, overridden by the body content type.
fn merge_headers(defaults: &HeaderMap, overrides: HeaderMap, body: Option<&RequestBody>) -> HeaderMap {
    let mut headers = defaults.clone();

    let mut current = None;
    for (name, value) in overrides {
        if let Some(name) = name {
            headers.remove(&name);
            current = Some(name);
        }
        if let Some(name) = &current {
            headers.append(name.clone(), value);
        }
    }

    match body {
        Some(RequestBody::Multipart(_)) => {
            headers.remove(CONTENT_TYPE);
        }
        Some(body) => {
            if let Some(content_type) = body.content_type() {
                headers.typed_insert(content_type);
            }
        }
        None => {}
    }

    headers
}

fn transport_message(config: &FetcherConfig, error: &TransportError) -> String {
    if error.message().is_empty() {
        config
            .default_error_message()
            .unwrap_or(FALLBACK_TRANSPORT_MESSAGE)
            .to_string()
    } else {
        error.message().to_string()
    }
}

async fn run_hooks(config: &FetcherConfig, response: &RawResponse) {
    let hook = if response.is_success() {
        config.on_response.as_ref().map(|hook| ("on_response", hook))
    } else {
        config
            .on_response_error
            .as_ref()
            .map(|hook| ("on_response_error", hook))
    };

    if let Some((name, hook)) = hook {
        run_isolated(name, hook, response).await;
    }
}

/// Implement IntoFuture for FetchCall to enable direct .await syntax
impl<D, E, T> IntoFuture for FetchCall<D, E, T>
where
    D: DeserializeOwned + Send + 'static,
    E: DeserializeOwned + Send + 'static,
    T: Transport,
{
    type Output = ResultEnvelope<D, E>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exchange())
    }
}
