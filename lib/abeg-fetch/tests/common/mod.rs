#![allow(clippy::expect_used)]

use std::sync::OnceLock;

use rstest::fixture;
use tracing::{Level, debug};

mod test_app;
pub use self::test_app::*;

static SUBSCRIBER: OnceLock<bool> = OnceLock::new();

/// Installs a test-writer subscriber once for the whole test binary.
pub fn init_tracing() {
    let installed = *SUBSCRIBER.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(false)
            .with_test_writer()
            .try_init()
            .is_ok()
    });
    if !installed {
        debug!("keeping the subscriber installed elsewhere");
    }
}

/// A campaign backend listening on a random local port, dropped with the test.
#[fixture]
pub async fn app() -> TestApp {
    init_tracing();
    let app = TestApp::start().await.expect("local backend starts");
    debug!(base_url = app.base_url(), "campaign backend ready");
    app
}
