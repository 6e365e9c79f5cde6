use axum::{
    extract::{Form, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use compute::{Horizon, RenderOutput, SessionContext, on_submit, render};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, trace};

use crate::handlers::forecast::csv_attachment;
use crate::schemas::AppState;
use crate::sessions::session_cookie;
use crate::views::{PageView, Tab, error_page, render_page};

type PageError = (StatusCode, Html<String>);

/// Query parameters of the page
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Selected tab
    pub aba: Option<String>,
}

/// The predict form
#[derive(Debug, Deserialize)]
pub struct PredictForm {
    /// Requested number of business days, clamped to 1..=30
    pub dias: i64,
}

fn page_error(status: StatusCode, message: &str) -> PageError {
    (status, Html(error_page(message)))
}

/// Renders the stored forecast of `context`, if one was requested.
async fn render_context(state: &AppState, context: SessionContext) -> Result<Option<RenderOutput>, PageError> {
    if !context.forecast_requested {
        return Ok(None);
    }
    let model = state.model.clone();
    let outcome = tokio::task::spawn_blocking(move || render(&context, model.history())).await;

    match outcome {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => {
            error!("Failed to render forecast: {}", e);
            Err(page_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Não foi possível exibir a previsão.",
            ))
        }
        Err(e) => {
            error!("Render task failed: {}", e);
            Err(page_error(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno."))
        }
    }
}

/// The dashboard page
#[instrument]
pub async fn index(
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, PageError> {
    trace!("Entering index function");
    let tab = Tab::from_param(query.aba.as_deref());
    let context = state.sessions.existing(&headers).await.unwrap_or_default();
    let horizon = context.horizon();

    let forecast = render_context(&state, context).await?;
    debug!("Rendering tab {:?} - forecast shown: {}", tab, forecast.is_some());

    let view = PageView {
        tab,
        horizon,
        dashboard_url: &state.dashboard_url,
        forecast: forecast.as_ref(),
    };
    match render_page(&view) {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            error!("Failed to render page: {}", e);
            Err(page_error(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno."))
        }
    }
}

/// Activation of the predict control: computes, stores and redirects back
#[instrument]
pub async fn submit_forecast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PredictForm>,
) -> Result<Response, PageError> {
    trace!("Entering submit_forecast function");
    let horizon = Horizon::clamped(form.dias);
    debug!("Requested {} days, using {}", form.dias, horizon);

    let mut session = state.sessions.load(&headers).await;
    session.context.begin_request();

    let model = state.model.clone();
    let outcome = tokio::task::spawn_blocking(move || on_submit(model.as_ref(), horizon))
        .await
        .map_err(|e| {
            error!("Forecast task failed: {}", e);
            page_error(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno.")
        })?;

    let stored = session.context.finish_request(outcome).map(|_| ());
    let cookie = session_cookie(session.id);
    state.sessions.save(session).await;

    // The session keeps its cookie even when the forecast failed
    if let Err(e) = stored {
        error!("Failed to compute forecast: {}", e);
        let failure = page_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Não foi possível calcular a previsão.",
        );
        return Ok(([(header::SET_COOKIE, cookie)], failure).into_response());
    }

    info!("Forecast stored for {} business days", horizon);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Redirect::to(&Tab::Modelo.href()),
    )
        .into_response())
}

/// The current session's forecast table as a CSV download
#[instrument]
pub async fn download_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    trace!("Entering download_csv function");
    let context = state.sessions.existing(&headers).await.unwrap_or_default();

    match render_context(&state, context).await? {
        Some(output) => {
            info!("Downloading {}", output.file_name);
            Ok(csv_attachment(output))
        }
        None => {
            debug!("No forecast requested in this session");
            Err(page_error(
                StatusCode::NOT_FOUND,
                "Nenhuma previsão foi feita nesta sessão.",
            ))
        }
    }
}
