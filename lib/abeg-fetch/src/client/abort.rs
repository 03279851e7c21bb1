use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Why an in-flight request was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum AbortReason {
    /// The configured timeout elapsed first.
    #[display("Request timed out")]
    Timeout,
    /// The caller's cancellation token fired first.
    #[display("Request was cancelled")]
    Cancelled,
}

/// Call-scoped composite of a timeout and an external cancellation token.
///
/// [`AbortScope::run`] races the exchange against both sources; the first to fire decides
/// the outcome. The timer and the token listener live inside that race and are dropped
/// with it, so nothing outlives the call: cancelling the token afterwards has no effect.
#[derive(Debug)]
pub(crate) struct AbortScope {
    timeout: Option<Duration>,
    signal: Option<CancellationToken>,
}

impl AbortScope {
    pub(crate) fn new(timeout: Option<Duration>, signal: Option<CancellationToken>) -> Self {
        Self { timeout, signal }
    }

    pub(crate) async fn run<F>(self, exchange: F) -> Result<F::Output, AbortReason>
    where
        F: Future,
    {
        let Self { timeout, signal } = self;

        if signal.as_ref().is_some_and(CancellationToken::is_cancelled) {
            debug!("signal already cancelled, request not sent");
            return Err(AbortReason::Cancelled);
        }

        let cancelled = async {
            match &signal {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let timed_out = async {
            match timeout {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };

        let outcome = tokio::select! {
            biased;
            () = cancelled => Err(AbortReason::Cancelled),
            () = timed_out => Err(AbortReason::Timeout),
            output = exchange => Ok(output),
        };

        if let Err(reason) = &outcome {
            debug!(%reason, "request aborted");
        }
        outcome
    }
}
