//! # Abeg Fetch
//!
//! A typed network client for the Abeg campaign backend.
//!
//! One configurable factory, [`FetcherBuilder`], produces a [`Fetcher`]: a request
//! function closed over a fixed configuration (base endpoint, default headers, credential
//! policy, timeout, response hooks). Every call resolves to a [`ResultEnvelope`], which is
//! exactly one of a success payload or an error payload. Timeouts, caller cancellation,
//! connection failures and non-2xx statuses all end up in the envelope; only caller misuse
//! (a malformed path, an unserializable body) is reported as an error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use abeg_fetch::{Fetcher, ResultEnvelope};
//! # use serde::Deserialize;
//! # #[derive(Debug, Deserialize)]
//! # struct User { id: String, email: String }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::builder("https://api.example.com")
//!     .with_timeout_ms(60_000)
//!     .build()?;
//!
//! match fetcher.call::<User>("/auth/me")?.await {
//!     ResultEnvelope::Success(success) => println!("{:?}", success.data),
//!     ResultEnvelope::Failure(error) => eprintln!("{}", error.message),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Bodies
//!
//! ```rust,no_run
//! use abeg_fetch::{Fetcher, FormData, FormPart};
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Serialize)]
//! # struct Login { email: String, password: String }
//! # #[derive(Deserialize)]
//! # struct Campaign { id: String }
//!
//! # async fn example(fetcher: Fetcher, login: Login, cover: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! // JSON, sent with `Content-Type: application/json`
//! let signed_in = fetcher.call::<()>("/auth/signin")?.json(&login)?.await;
//!
//! // Multipart, the transport writes the boundary
//! let form = FormData::new()
//!     .set("story", "A story long enough to move people")
//!     .append("photos", FormPart::file("cover.png", mime::IMAGE_PNG, cover));
//! let created = fetcher.call::<Campaign>("/campaign/create/three")?.multipart(form).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Timeout and Cancellation
//!
//! A call is abandoned by whichever fires first: the configured timeout or the caller's
//! [`CancellationToken`](tokio_util::sync::CancellationToken). The envelope then carries
//! `"Request timed out"` or `"Request was cancelled"`.
//!
//! ```rust,no_run
//! use abeg_fetch::Fetcher;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(fetcher: Fetcher) -> Result<(), Box<dyn std::error::Error>> {
//! let token = CancellationToken::new();
//! let call = fetcher.call::<()>("/campaign/all")?.with_signal(token.clone());
//!
//! token.cancel();
//! let envelope = call.await;
//! assert_eq!(envelope.error().map(|error| error.message.as_str()), Some("Request was cancelled"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Backend Binding
//!
//! [`backend::backend_fetcher`] builds the fetcher the application uses, reading its
//! settings from the environment and clearing the session on `401 Unauthorized`.
//!
//! ## Validation
//!
//! [`validation`] defines the interface of the form schemas producing request bodies.

mod client;

pub mod backend;
pub mod validation;

pub use self::client::{
    AbortReason, ApiPath, ConfigurationError, CredentialPolicy, ErrorPayload, ErrorStatus,
    FetchCall, Fetcher, FetcherBuilder, FetcherConfig, FetcherError, FieldErrors, FormData,
    FormPart, HookFuture, HookResult, OutgoingRequest, RawResponse, RequestBody, ResponseHook,
    ReqwestTransport, ResultEnvelope, SuccessPayload, SuccessStatus, Transport, TransportError,
    TransportErrorKind, classify_response,
};
