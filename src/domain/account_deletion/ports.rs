use async_trait::async_trait;
use std::time::Duration;

use super::entities::{AccountDeletionEvent, Delivery};
use super::errors::{CleanupError, NotificationError, QueueError};
use super::value_objects::{CleanupStep, EnqueueOutcome, RetryOutcome};
use crate::domain::banking::value_objects::ExternalResourceKind;
use crate::domain::expense::entities::AgreementCancellationNotice;
use crate::domain::user::entities::User;

/// One bounded context's share of the deletion cascade.
///
/// Implementations must be idempotent: running twice for the same user leaves
/// the same persisted state as running once.
#[async_trait]
pub trait ResourceCleaner: Send + Sync {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError>;
}

/// Durable at-least-once queue of deletion requests
#[async_trait]
pub trait DeletionQueue: Send + Sync {
  /// Queues the event unless one is already in flight for the same user
  async fn enqueue(&self, event: AccountDeletionEvent) -> Result<EnqueueOutcome, QueueError>;

  /// Waits up to `timeout` for the next event
  async fn reserve(&self, timeout: Duration) -> Result<Option<Delivery>, QueueError>;

  /// Marks the delivery as done and releases the per-user marker
  async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

  /// Hands a failed delivery back for redelivery, or dead-letters it once the
  /// attempt limit is reached
  async fn retry(&self, delivery: Delivery) -> Result<RetryOutcome, QueueError>;
}

/// Outbound messages sent while a cascade runs
#[async_trait]
pub trait DeletionNotifier: Send + Sync {
  /// Tells a participant their shared bill was cancelled by the owner's deletion
  async fn agreement_cancelled(
    &self,
    notice: &AgreementCancellationNotice,
  ) -> Result<(), NotificationError>;

  /// Confirms to the user that their account is gone
  async fn account_deleted(&self, user: &User) -> Result<(), NotificationError>;
}

/// Receives cascade progress, e.g. for metrics
pub trait CascadeObserver: Send + Sync {
  fn step_completed(&self, step: CleanupStep);

  fn step_failed(&self, step: CleanupStep);

  fn cascade_completed(&self);

  fn cascade_failed(&self);

  fn external_failure(&self, resource: ExternalResourceKind);
}

/// Observer that discards everything
pub struct NoopCascadeObserver;

impl CascadeObserver for NoopCascadeObserver {
  fn step_completed(&self, _step: CleanupStep) {}

  fn step_failed(&self, _step: CleanupStep) {}

  fn cascade_completed(&self) {}

  fn cascade_failed(&self) {}

  fn external_failure(&self, _resource: ExternalResourceKind) {}
}
