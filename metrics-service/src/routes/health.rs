use crate::models::responses::HealthResponse;
use axum::response::Json;

pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME.to_string(),
        status: "running".to_string(),
    })
}
