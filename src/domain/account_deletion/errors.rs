use thiserror::Error;

use super::value_objects::CleanupStep;
use crate::domain::banking::errors::ExternalServiceError;
use crate::domain::user::errors::RepositoryError;

/// Failure of a cascade step or of the cascade as a whole
#[derive(Debug, Error)]
pub enum CleanupError {
  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),

  #[error("External service error: {0}")]
  External(#[from] ExternalServiceError),

  #[error("Deactivated placeholder account is not provisioned")]
  PlaceholderMissing,

  #[error("Refusing to delete the deactivated placeholder account")]
  PlaceholderDeletionRefused,

  #[error("Cleanup step {step} failed: {source}")]
  Step {
    step: CleanupStep,
    #[source]
    source: Box<CleanupError>,
  },
}

impl CleanupError {
  /// Wraps the error with the step it came from
  pub fn in_step(self, step: CleanupStep) -> Self {
    match self {
      already @ CleanupError::Step { .. } => already,
      other => CleanupError::Step {
        step,
        source: Box::new(other),
      },
    }
  }

  /// The step that failed, if known
  pub fn step(&self) -> Option<CleanupStep> {
    match self {
      CleanupError::Step { step, .. } => Some(*step),
      _ => None,
    }
  }
}

/// Deletion queue errors
#[derive(Debug, Error)]
pub enum QueueError {
  #[error("Queue backend error: {0}")]
  Backend(String),

  #[error("Failed to encode or decode deletion event: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for QueueError {
  fn from(error: redis::RedisError) -> Self {
    QueueError::Backend(error.to_string())
  }
}

/// Notification delivery errors; never fatal to the cascade
#[derive(Debug, Error)]
pub enum NotificationError {
  #[error("Notification delivery failed: {0}")]
  Delivery(String),
}

/// Errors surfaced when a deletion is requested
#[derive(Debug, Error)]
pub enum AccountDeletionError {
  #[error("Cannot delete an account that does not belong to you")]
  NotAccountOwner,

  #[error("User not found")]
  UserNotFound,

  #[error("The deactivated placeholder account cannot be deleted")]
  PlaceholderProtected,

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),

  #[error("Queue error: {0}")]
  Queue(#[from] QueueError),
}
