//! The fetcher the application talks to its backend with.
//!
//! [`BackendSettings`] come from the environment, [`backend_fetcher`] wires them into a
//! [`Fetcher`] that sends cookies and drops the session on `401 Unauthorized`.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use abeg_fetch::backend::{BackendSettings, SessionStore, backend_fetcher};
//!
//! #[derive(Debug, Default)]
//! struct Session;
//!
//! impl SessionStore for Session {
//!     fn clear_session(&self) {}
//! }
//!
//! # fn example() -> Result<(), abeg_fetch::ConfigurationError> {
//! let settings = BackendSettings::from_env()?;
//! let fetcher = backend_fetcher(&settings, Arc::new(Session))?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tracing::info;

use crate::{ConfigurationError, CredentialPolicy, Fetcher, HookResult, RawResponse};

const BACKEND_URL: &str = "BACKEND_URL";
const BACKEND_TIMEOUT_MS: &str = "BACKEND_TIMEOUT_MS";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Owner of the signed-in session.
///
/// The backend fetcher only ever calls [`clear_session`](Self::clear_session), from its
/// `on_response_error` hook, when the backend answers `401 Unauthorized`.
pub trait SessionStore: Debug + Send + Sync + 'static {
    /// Forgets the current session.
    fn clear_session(&self);
}

/// Where the backend lives and how long a call may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Backend base URL.
    ///
    /// Environment variable: `BACKEND_URL` (required)
    pub base_url: String,
    /// Per-request timeout.
    ///
    /// Environment variable: `BACKEND_TIMEOUT_MS` (default: 60000)
    pub timeout: Duration,
}

impl BackendSettings {
    /// Creates settings with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingEnv`] when `BACKEND_URL` is unset or empty, and
    /// [`ConfigurationError::InvalidEnv`] when `BACKEND_TIMEOUT_MS` is not a number.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the settings through `lookup`, which returns the value of a variable.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let base_url = lookup(BACKEND_URL)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigurationError::MissingEnv {
                name: BACKEND_URL,
                message: format!("Please add the {BACKEND_URL} variable to your environment"),
            })?;

        let timeout = match lookup(BACKEND_TIMEOUT_MS) {
            Some(value) => {
                let millis = value.trim().parse::<u64>().map_err(|err| {
                    ConfigurationError::InvalidEnv {
                        name: BACKEND_TIMEOUT_MS,
                        value: value.clone(),
                        message: err.to_string(),
                    }
                })?;
                Duration::from_millis(millis)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self { base_url, timeout })
    }
}

/// Builds the application's backend fetcher.
///
/// Cookies are always sent ([`CredentialPolicy::Include`]). A `401 Unauthorized` response
/// clears `session` before the failure envelope reaches the caller.
///
/// # Errors
///
/// Returns a [`ConfigurationError`] when the settings are invalid, for instance a relative
/// base URL or a zero timeout.
pub fn backend_fetcher(
    settings: &BackendSettings,
    session: Arc<dyn SessionStore>,
) -> Result<Fetcher, ConfigurationError> {
    Fetcher::builder(settings.base_url.as_str())
        .with_timeout(settings.timeout)
        .with_credentials(CredentialPolicy::Include)
        .on_response_error(clear_session_on_unauthorized(session))
        .build()
}

fn clear_session_on_unauthorized(
    session: Arc<dyn SessionStore>,
) -> impl Fn(RawResponse) -> std::future::Ready<HookResult> + Send + Sync + 'static {
    move |response: RawResponse| {
        if response.status() == StatusCode::UNAUTHORIZED {
            info!(url = %response.url(), "backend rejected the session, clearing it");
            session.clear_session();
        }
        std::future::ready(Ok(()))
    }
}
