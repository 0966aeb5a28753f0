use serde::{Deserialize, Serialize};
use validator::Validate;

/// Optional body of an account deletion request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DeleteAccountRequest {
  /// Why the user is leaving, kept with the queued event
  #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
  #[serde(default)]
  pub reason: Option<String>,
}

/// Response once an account deletion has been accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
  pub status: String,

  /// True when a deletion for this account was already pending
  pub already_queued: bool,
}

impl DeleteAccountResponse {
  pub fn accepted(already_queued: bool) -> Self {
    Self {
      status: "accepted".to_string(),
      already_queued,
    }
  }
}

/// Generic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
  /// Error type identifier
  pub error: String,

  /// Human-readable error message
  pub message: String,

  /// Optional additional details
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}
