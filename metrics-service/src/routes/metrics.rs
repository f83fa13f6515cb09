use crate::models::context::RequestContext;
use crate::models::responses::{ErrorResponse, MetricsResult};
use crate::services::metrics::ComputeError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::info;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MetricsParams {
    pub author: String,
}

impl MetricsParams {
    /// First `author` wins when repeated; a missing one is the empty string.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let author = pairs
            .into_iter()
            .find(|(key, _)| key == "author")
            .map(|(_, value)| value)
            .unwrap_or_default();
        Self { author }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<ComputeError> for ApiError {
    fn from(err: ComputeError) -> Self {
        let status = match err {
            ComputeError::ExternalServiceFailure => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub async fn get_metrics(
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<AppState>,
) -> Result<Json<MetricsResult>, ApiError> {
    let params = MetricsParams::from_pairs(pairs);
    info!("Metrics query: {:?}", params);

    let ctx = RequestContext::background().with_timeout(state.request_timeout);

    let result = state.metrics.compute_metrics(&ctx, &params.author).await?;
    Ok(Json(result))
}
