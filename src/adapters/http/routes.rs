use actix_web::web;

use super::handlers::system::{health_handler, metrics_handler};
use super::handlers::users::delete_user_handler;
use super::middleware::ServiceAuthMiddleware;
use crate::infrastructure::security::ServiceTokenVerifier;

/// Configure user routes
///
/// Mounts the user endpoints under the provided scope (e.g. /api/v1/users),
/// all behind [`ServiceAuthMiddleware`].
///
/// # Routes
///
/// - DELETE /{id} - Queue deletion of the acting user's account
///
/// `RequestAccountDeletionUseCase` must be registered as app data.
pub fn configure_user_routes(cfg: &mut web::ServiceConfig, verifier: ServiceTokenVerifier) {
  cfg.service(
    web::resource("/{id}")
      .wrap(ServiceAuthMiddleware::new(verifier))
      .route(web::delete().to(delete_user_handler)),
  );
}

/// Configure unauthenticated operational routes
///
/// - GET /health - Liveness check
/// - GET /metrics - Prometheus metrics, needs `DeletionMetrics` as app data
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_handler))
    .route("/metrics", web::get().to(metrics_handler));
}
