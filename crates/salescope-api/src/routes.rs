//! Route handlers for the sales API.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::error;

use salescope_core::SalesPage;

use crate::params::SalesParams;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sales", get(get_sales))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn get_sales(
    State(state): State<AppState>,
    Query(params): Query<SalesParams>,
) -> Result<Json<SalesPage>, ApiError> {
    let query = params.into_query();
    let page = state.engine.fetch_page(&query).await?;
    Ok(Json(page))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

/// Opaque server error. Details go to the log, never to the client.
#[derive(Debug)]
pub struct ApiError(salescope_core::Error);

impl From<salescope_core::Error> for ApiError {
    fn from(err: salescope_core::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Request failed");
        let body = ErrorBody {
            message: "Internal Server Error".to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
