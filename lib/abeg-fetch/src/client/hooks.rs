use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{Instrument, warn};

use super::RawResponse;

/// What a response hook returns. An `Err` is logged and discarded.
pub type HookResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Boxed future returned by [`ResponseHook::call`].
pub type HookFuture = Pin<Box<dyn Future<Output = HookResult> + Send>>;

/// A side effect run on a received response before it is classified.
///
/// Any `Fn(RawResponse) -> impl Future<Output = HookResult>` closure is a hook:
///
/// ```rust
/// use abeg_fetch::{Fetcher, HookResult, RawResponse};
///
/// # fn example() -> Result<(), abeg_fetch::ConfigurationError> {
/// let fetcher = Fetcher::builder("https://api.example.com")
///     .on_response_error(|response: RawResponse| async move {
///         tracing::warn!(status = %response.status(), "backend refused the call");
///         HookResult::Ok(())
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// Hooks run to completion before the envelope is built. Neither an error nor a panic
/// raised by a hook can change or prevent the envelope, whether the panic happens while
/// building the future or while polling it.
///
/// Panic containment relies on unwinding. A build with `panic = "abort"` (as the workspace
/// release profile sets) terminates the process when a hook panics.
pub trait ResponseHook: Send + Sync + 'static {
    /// Runs the side effect.
    fn call(&self, response: RawResponse) -> HookFuture;
}

impl<F, Fut> ResponseHook for F
where
    F: Fn(RawResponse) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HookResult> + Send + 'static,
{
    fn call(&self, response: RawResponse) -> HookFuture {
        Box::pin(self(response))
    }
}

pub(crate) type SharedHook = Arc<dyn ResponseHook>;

/// Runs a hook on its own task so a panic stays contained, and waits for it.
///
/// The hook itself is invoked on that task, so a closure panicking before it returns its
/// future is contained too. Requires `panic = "unwind"`.
pub(crate) async fn run_isolated(name: &'static str, hook: &SharedHook, response: &RawResponse) {
    let hook = Arc::clone(hook);
    let response = response.clone();
    let task = async move { hook.call(response).await }.in_current_span();

    match tokio::spawn(task).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => warn!(hook = name, %error, "response hook failed, ignoring"),
        Err(error) if error.is_panic() => warn!(hook = name, "response hook panicked, ignoring"),
        Err(error) => warn!(hook = name, %error, "response hook was aborted, ignoring"),
    }
}
