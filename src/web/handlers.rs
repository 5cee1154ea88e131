use axum::{
    Json,
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use super::pages;
use crate::error::SalesError;
use crate::predict::{PredictionForm, PredictionInput, predict_total};
use crate::visualization::Visualization;

#[derive(Debug, Default, Deserialize)]
pub struct VisualizationForm {
    pub visualization_type: Option<String>,
}

/// Error body for the JSON API.
#[derive(Debug, Serialize)]
struct ApiError {
    status: &'static str,
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: &'static str,
}

fn api_error(status: StatusCode, error_type: &'static str, message: String) -> Response {
    let body = ApiError {
        status: "error",
        error: ErrorDetails {
            message,
            error_type,
        },
    };
    (status, Json(body)).into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    log::error!("request failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::index(&state.title, None, None))
}

/// Render the selected visualization. Unknown or missing tags give the plain menu,
/// as does a body that is not a urlencoded form.
pub async fn visualize(
    State(state): State<Arc<AppState>>,
    form: Option<Form<VisualizationForm>>,
) -> Response {
    let tag = form
        .and_then(|Form(f)| f.visualization_type)
        .unwrap_or_default();
    let worker = Arc::clone(&state);
    let wanted = tag.clone();
    let result = match tokio::task::spawn_blocking(move || worker.dispatcher.dispatch(&wanted)).await
    {
        Ok(r) => r,
        Err(e) => return internal_error(e),
    };
    Html(pages::index(&state.title, Some(&tag), result.as_ref())).into_response()
}

pub async fn predict_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::predict(
        &state.title,
        &PredictionForm::default(),
        None,
        None,
    ))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PredictionForm>,
) -> Response {
    let input = match PredictionInput::from_form(&form) {
        Ok(input) => input,
        Err(e) => {
            log::debug!("rejected prediction input: {}", e);
            let page = pages::predict(&state.title, &form, Some(&e.to_string()), None);
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    let worker = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        predict_total(worker.dispatcher.dataset(), &input)
    })
    .await;
    match outcome {
        Ok(Ok(prediction)) => {
            Html(pages::predict(&state.title, &form, None, Some(&prediction))).into_response()
        }
        Ok(Err(e @ SalesError::InsufficientData { .. })) => {
            let page = pages::predict(&state.title, &form, Some(&e.to_string()), None);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
        }
        Ok(Err(e)) => internal_error(e),
        Err(e) => internal_error(e),
    }
}

pub async fn view_dataset(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::dataset(
        &state.title,
        &state.dataset_html,
        state.dispatcher.dataset().len(),
    ))
}

/// The numbers behind a visualization, as JSON.
pub async fn aggregation(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
) -> Response {
    let Some(kind) = Visualization::from_tag(&tag) else {
        return api_error(
            StatusCode::NOT_FOUND,
            "UnknownVisualization",
            format!("unknown visualization `{}`", tag),
        );
    };
    let worker = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || worker.dispatcher.aggregate(kind)).await {
        Ok(agg) => Json(agg).into_response(),
        Err(e) => internal_error(e),
    }
}

pub async fn healthz(State(state): State<Arc<AppState>>) -> String {
    format!("ok {} rows", state.dispatcher.dataset().len())
}
