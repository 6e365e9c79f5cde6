use crate::schemas::{ApiResponse, AppState, ErrorResponse, ForecastQuery, ForecastResponse};
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use axum_valid::Valid;
use common::ModelSummary;
use compute::{ComputeError, Horizon, RenderOutput, SessionContext, render};
use tracing::{debug, error, info, instrument, trace};

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Runs a forecast for `horizon` on the blocking pool, as a throwaway session.
pub async fn compute_forecast(state: &AppState, horizon: Horizon) -> Result<RenderOutput, HandlerError> {
    let model = state.model.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut context = SessionContext::new();
        context.submit(model.as_ref(), horizon)?;
        render(&context, model.history())
    })
    .await;

    match outcome {
        Ok(Ok(Some(output))) => Ok(output),
        Ok(Ok(None)) => {
            error!("Forecast rendered nothing after a successful request");
            Err(internal_error("Forecast produced no output", "FORECAST_ERROR"))
        }
        Ok(Err(e)) => Err(compute_error(e)),
        Err(e) => {
            error!("Forecast task failed: {}", e);
            Err(internal_error("Forecast task failed", "TASK_ERROR"))
        }
    }
}

pub fn compute_error(e: ComputeError) -> HandlerError {
    error!("Forecast failed: {}", e);
    match e {
        ComputeError::Horizon(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(message, "INVALID_HORIZON")),
        ),
        e => internal_error(format!("Failed to compute forecast: {}", e), "FORECAST_ERROR"),
    }
}

fn internal_error(message: impl Into<String>, code: &str) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message, code)),
    )
}

fn requested_horizon(query: &ForecastQuery) -> Result<Horizon, HandlerError> {
    Horizon::new(query.horizon.unwrap_or(Horizon::MIN)).map_err(compute_error)
}

/// CSV attachment response for a rendered forecast.
pub fn csv_attachment(output: RenderOutput) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.file_name),
            ),
        ],
        output.csv,
    )
        .into_response()
}

/// Describe the loaded forecasting model
#[utoipa::path(
    get,
    path = "/api/v1/model",
    tag = "model",
    responses(
        (status = 200, description = "Model summary retrieved successfully", body = ApiResponse<ModelSummary>)
    )
)]
#[instrument]
pub async fn get_model(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<ModelSummary>>) {
    trace!("Entering get_model function");
    let summary = state.model.summary();
    (
        StatusCode::OK,
        Json(ApiResponse::ok(summary, "Model summary retrieved successfully")),
    )
}

/// Forecast the Brent price for the next business days
#[utoipa::path(
    get,
    path = "/api/v1/forecast",
    tag = "forecast",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Forecast computed successfully", body = ApiResponse<ForecastResponse>),
        (status = 400, description = "Horizon outside 1..=30", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_forecast(
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<ForecastResponse>>), HandlerError> {
    trace!("Entering get_forecast function");
    let horizon = requested_horizon(&query)?;
    debug!("Computing forecast - horizon: {}", horizon);

    let output = compute_forecast(&state, horizon).await?;
    let chart = serde_json::to_value(&output.chart).map_err(|e| {
        error!("Failed to serialize chart: {}", e);
        internal_error("Failed to serialize chart", "SERIALIZATION_ERROR")
    })?;

    info!("Forecast computed for {} business days", horizon);
    let response = ForecastResponse {
        horizon: horizon.days(),
        last_trained_date: state.model.last_trained_date(),
        table: output.table,
        chart,
        file_name: output.file_name,
    };
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(response, "Forecast computed successfully")),
    ))
}

/// Forecast table as a CSV attachment
#[utoipa::path(
    get,
    path = "/api/v1/forecast/csv",
    tag = "forecast",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Forecast table as CSV", content_type = "text/csv", body = String),
        (status = 400, description = "Horizon outside 1..=30", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_forecast_csv(
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    State(state): State<AppState>,
) -> Result<Response, HandlerError> {
    trace!("Entering get_forecast_csv function");
    let horizon = requested_horizon(&query)?;

    let output = compute_forecast(&state, horizon).await?;
    info!("Exporting {} as CSV", output.file_name);
    Ok(csv_attachment(output))
}
