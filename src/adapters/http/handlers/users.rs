use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::adapters::http::{
  dtos::{DeleteAccountRequest, DeleteAccountResponse},
  errors::ApiError,
  middleware::{ActingUserExt, RequestIdExt},
};
use crate::application::account_deletion::{
  RequestAccountDeletionCommand, RequestAccountDeletionUseCase,
};
use crate::domain::user::value_objects::UserId;

/// Handler for account deletion
///
/// DELETE /api/v1/users/{id}
/// Body: optional DeleteAccountRequest (JSON). An empty body means no reason;
/// a body that is present must parse.
/// Response: DeleteAccountResponse (JSON) with status 202
///
/// Only queues the deletion; the cascade runs on the deletion worker.
pub async fn delete_user_handler(
  req: HttpRequest,
  path: web::Path<i64>,
  body: web::Bytes,
  use_case: web::Data<Arc<RequestAccountDeletionUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let acting_user_id = req.acting_user()?;
  let target_user_id =
    UserId::new(path.into_inner()).map_err(|_| ApiError::NotFound("User not found".to_string()))?;

  let request = parse_request(&body)?;
  request.validate()?;

  tracing::info!(
    "Account deletion requested for user {} (request {})",
    target_user_id,
    req
      .request_id()
      .map(|id| id.to_string())
      .unwrap_or_else(|| "-".to_string())
  );

  let response = use_case
    .execute(RequestAccountDeletionCommand {
      acting_user_id,
      target_user_id,
      reason: request.reason,
    })
    .await?;

  Ok(HttpResponse::Accepted().json(DeleteAccountResponse::accepted(response.already_queued)))
}

fn parse_request(body: &[u8]) -> Result<DeleteAccountRequest, ApiError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(DeleteAccountRequest::default());
  }
  serde_json::from_slice(body)
    .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))
}
