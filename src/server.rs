// Copyright 2025 CalenDO developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions: The above copyright
// notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! HTTP boundary: a small axum service that turns a date and an advisory
//! image size into PNG bytes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::{error, info};

use crate::config::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DISPLAY_TZ};
use crate::data::BackendClient;
use crate::render::{render_day_view, RenderOptions};

/// State shared across handlers. One backend client serves all requests;
/// each render owns its canvas exclusively.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/day-view", get(day_view))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> Result<(), std::io::Error> {
    info!("Starting day-view server on {}", addr);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await
}

#[derive(Serialize)]
struct ServiceInfo {
    message: &'static str,
    version: &'static str,
}

async fn root() -> impl IntoResponse {
    Json(ServiceInfo {
        message: "CalenDO Image Generator API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend_url: String,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        backend_url: state.backend.base_url().to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct DayViewParams {
    /// Date in YYYY-MM-DD form; defaults to today in the display timezone.
    date: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
}

async fn day_view(
    State(state): State<AppState>,
    Query(params): Query<DayViewParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = match &params.date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                "Invalid date format. Use YYYY-MM-DD".to_string(),
            )
        })?,
        None => Utc::now().with_timezone(&DISPLAY_TZ).date_naive(),
    };

    let events = state.backend.events_for_day(date).await.map_err(|err| {
        error!("Failed to fetch data from backend: {:#}", err);
        (
            StatusCode::BAD_GATEWAY,
            "Failed to fetch data from backend".to_string(),
        )
    })?;

    let opts = RenderOptions {
        width: params.width.unwrap_or(DEFAULT_CANVAS_WIDTH),
        height: params.height.unwrap_or(DEFAULT_CANVAS_HEIGHT),
    };

    // The render core is synchronous; keep it off the async workers.
    let image = tokio::task::spawn_blocking(move || render_day_view(&events, date, &opts))
        .await
        .map_err(|err| {
            error!("Render task panicked: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error generating day view image".to_string(),
            )
        })?
        .map_err(|err| {
            error!("Error generating day view: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error generating day view image".to_string(),
            )
        })?;

    let disposition = format!("inline; filename=day-view-{}.png", date.format("%Y-%m-%d"));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image.png,
    ))
}
