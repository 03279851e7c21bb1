use std::sync::Arc;

use http::header::{COOKIE, SET_COOKIE};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use tracing::debug;
use url::Url;

use super::{CredentialPolicy, OutgoingRequest, Transport, TransportError};
use crate::client::{FormData, FormPart, RawResponse, RequestBody};

/// [`Transport`] backed by a shared [`reqwest::Client`] and an in-memory cookie jar.
///
/// The jar plays the role of the browser cookie store: session cookies set by the backend
/// are replayed on later requests according to each request's [`CredentialPolicy`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    cookies: Arc<Jar>,
}

impl ReqwestTransport {
    /// Creates a transport with a default client and an empty cookie jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around an existing client.
    ///
    /// The client should not carry its own cookie store, cookies are managed here.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            cookies: Arc::default(),
        }
    }

    /// The cookie jar shared by every request sent through this transport.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookies
    }

    fn build_form(form: FormData) -> Result<Form, TransportError> {
        form.iter().try_fold(Form::new(), |acc, (name, part)| {
            let form = match part {
                FormPart::Text(value) => acc.text(name.to_string(), value.clone()),
                FormPart::File {
                    file_name,
                    mime,
                    content,
                } => {
                    let part = Part::bytes(content.to_vec())
                        .file_name(file_name.clone())
                        .mime_str(mime.as_ref())?;
                    acc.part(name.to_string(), part)
                }
            };
            Ok(form)
        })
    }
}

fn sends_cookies(policy: CredentialPolicy) -> bool {
    !matches!(policy, CredentialPolicy::Omit)
}

fn stores_cookies(policy: CredentialPolicy, requested: &Url, responded: &Url) -> bool {
    match policy {
        CredentialPolicy::Omit => false,
        CredentialPolicy::SameOrigin => requested.origin() == responded.origin(),
        CredentialPolicy::Include => true,
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let OutgoingRequest {
            method,
            url,
            headers,
            body,
            credentials,
        } = request;

        let mut builder = self.client.request(method, url.clone()).headers(headers);

        if sends_cookies(credentials)
            && let Some(cookie) = self.cookies.cookies(&url)
        {
            builder = builder.header(COOKIE, cookie);
        }

        builder = match body {
            Some(RequestBody::Json(data)) => builder.body(data),
            Some(RequestBody::Multipart(form)) => builder.multipart(Self::build_form(form)?),
            None => builder,
        };

        let request = builder.build()?;
        debug!(?request, "sending...");
        let response = self.client.execute(request).await?;
        debug!(?response, "...receiving");

        let status = response.status();
        let response_url = response.url().clone();
        let headers = response.headers().clone();

        if stores_cookies(credentials, &url, &response_url) {
            let mut set_cookies = headers.get_all(SET_COOKIE).iter();
            self.cookies.set_cookies(&mut set_cookies, &response_url);
        }

        let body = response.bytes().await.map_err(|err| TransportError::body(err.to_string()))?;

        Ok(RawResponse::new(status, response_url)
            .with_headers(headers)
            .with_body(body))
    }
}
