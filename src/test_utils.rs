#[cfg(test)]
pub mod test_utils {
    use crate::config::DEFAULT_DASHBOARD_URL;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::sessions::SessionStore;
    use axum::Router;
    use compute::TrainedModel;
    use compute::testing::fixture_model;
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create AppState around the bundled model fixture
    pub fn setup_test_app_state() -> AppState {
        setup_test_app_state_with(Arc::new(fixture_model()))
    }

    /// Create AppState around any model
    pub fn setup_test_app_state_with(model: Arc<dyn TrainedModel>) -> AppState {
        let sessions = SessionStore::new(100, Duration::from_secs(300));
        AppState::new(model, sessions, DEFAULT_DASHBOARD_URL.to_string())
    }

    /// Initialize tracing for tests, written through the test harness's
    /// captured output.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set. The subscriber is global, so only the
    /// first call installs it.
    pub fn init_test_tracing() {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let _ = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    }

    /// Create axum app for testing
    pub fn setup_test_app() -> Router {
        init_test_tracing();
        create_router(setup_test_app_state())
    }

    /// Create axum app for testing around `model`
    pub fn setup_test_app_with(model: Arc<dyn TrainedModel>) -> Router {
        init_test_tracing();
        create_router(setup_test_app_state_with(model))
    }

    #[tokio::test]
    async fn test_tracing_stays_installed_across_setups() {
        init_test_tracing();
        init_test_tracing();
        assert!(tracing::dispatcher::has_been_set());

        let _app = setup_test_app();
        assert!(tracing::dispatcher::has_been_set());
    }
}
