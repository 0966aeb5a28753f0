use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::adapters::http::errors::ApiError;
use crate::infrastructure::metrics::DeletionMetrics;

/// GET /health
pub async fn health_handler() -> HttpResponse {
  HttpResponse::Ok().body("OK")
}

/// GET /metrics
///
/// Prometheus text exposition of the deletion counters.
pub async fn metrics_handler(
  metrics: web::Data<Arc<DeletionMetrics>>,
) -> Result<HttpResponse, ApiError> {
  let body = metrics
    .render()
    .map_err(|e| ApiError::Internal(format!("Failed to render metrics: {}", e)))?;

  Ok(
    HttpResponse::Ok()
      .content_type("text/plain; version=0.0.4")
      .body(body),
  )
}
