use crate::handlers::{
    forecast::{get_forecast, get_forecast_csv, get_model},
    health::health_check,
    pages::{download_csv, index, submit_forecast},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Dashboard page
        .route("/", get(index))
        .route("/prever", post(submit_forecast))
        .route("/previsao.csv", get(download_csv))
        // Health check
        .route("/health", get(health_check))
        // API v1 routes
        .route("/api/v1/model", get(get_model))
        .route("/api/v1/forecast", get(get_forecast))
        .route("/api/v1/forecast/csv", get(get_forecast_csv))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The Prometheus recorder is process-global, so test routers go without it
    #[cfg(not(test))]
    let router = with_metrics(router);

    router
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(not(test))]
fn with_metrics(router: Router<AppState>) -> Router<AppState> {
    use axum_prometheus::PrometheusMetricLayer;

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    router
        .route("/metrics", get(move || async move { metric_handle.render() }))
        .layer(prometheus_layer)
}
