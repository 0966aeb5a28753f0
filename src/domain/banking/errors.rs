use thiserror::Error;

/// Errors reported by the payments and bank-link providers
#[derive(Debug, Error)]
pub enum ExternalServiceError {
  /// The resource does not exist (or no longer exists) at the provider
  #[error("External resource not found: {0}")]
  NotFound(String),

  /// The provider refused the operation, e.g. a transfer that already settled
  #[error("Provider rejected operation on {resource}: {reason}")]
  Rejected { resource: String, reason: String },

  #[error("Provider unavailable: {0}")]
  Unavailable(String),

  #[error("Unexpected provider response: {0}")]
  InvalidResponse(String),

  #[error("Invalid provider configuration: {0}")]
  Configuration(String),
}

impl ExternalServiceError {
  /// True when the resource is already absent, which counts as revoked
  pub fn is_already_absent(&self) -> bool {
    matches!(self, ExternalServiceError::NotFound(_))
  }
}

impl From<reqwest::Error> for ExternalServiceError {
  fn from(error: reqwest::Error) -> Self {
    if error.is_decode() {
      ExternalServiceError::InvalidResponse(error.to_string())
    } else {
      ExternalServiceError::Unavailable(error.to_string())
    }
  }
}
