use std::sync::Arc;
use uuid::Uuid;

use crate::domain::account_deletion::entities::{AccountDeletionEvent, DeactivatedPlaceholder};
use crate::domain::account_deletion::errors::AccountDeletionError;
use crate::domain::account_deletion::ports::DeletionQueue;
use crate::domain::account_deletion::value_objects::EnqueueOutcome;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::value_objects::UserId;

/// Command for requesting deletion of an account
#[derive(Debug, Clone)]
pub struct RequestAccountDeletionCommand {
  /// Authenticated user making the request
  pub acting_user_id: UserId,
  /// Account to delete
  pub target_user_id: UserId,
  /// Optional free-text reason given by the user
  pub reason: Option<String>,
}

/// Response once the deletion has been queued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAccountDeletionResponse {
  pub user_id: UserId,
  /// Set when this request queued a new event
  pub event_id: Option<Uuid>,
  /// True when a deletion for the user was already pending
  pub already_queued: bool,
}

/// Use case for accepting an account deletion request. The cascade itself
/// runs later on the deletion worker.
pub struct RequestAccountDeletionUseCase {
  user_repo: Arc<dyn UserRepository>,
  queue: Arc<dyn DeletionQueue>,
  placeholder: DeactivatedPlaceholder,
}

impl RequestAccountDeletionUseCase {
  pub fn new(
    user_repo: Arc<dyn UserRepository>,
    queue: Arc<dyn DeletionQueue>,
    placeholder: DeactivatedPlaceholder,
  ) -> Self {
    Self {
      user_repo,
      queue,
      placeholder,
    }
  }

  /// Executes the deletion request use case
  ///
  /// # Errors
  /// Returns `AccountDeletionError::NotAccountOwner` when the acting user asks
  /// for someone else's account, `PlaceholderProtected` for the placeholder
  /// and `UserNotFound` when the account does not exist.
  pub async fn execute(
    &self,
    command: RequestAccountDeletionCommand,
  ) -> Result<RequestAccountDeletionResponse, AccountDeletionError> {
    if command.acting_user_id != command.target_user_id {
      tracing::warn!(
        "User {} attempted to delete account {}",
        command.acting_user_id,
        command.target_user_id
      );
      return Err(AccountDeletionError::NotAccountOwner);
    }

    let user = self
      .user_repo
      .find_by_id(command.target_user_id)
      .await?
      .ok_or(AccountDeletionError::UserNotFound)?;

    if self.placeholder.is_placeholder(&user) {
      tracing::error!("Deletion requested for placeholder account {}", user.id);
      return Err(AccountDeletionError::PlaceholderProtected);
    }

    let user_id = user.id;
    let event = AccountDeletionEvent::new(user, command.reason);
    let event_id = event.event_id;

    let response = match self.queue.enqueue(event).await? {
      EnqueueOutcome::Enqueued => {
        tracing::info!("Account deletion {} queued for user {}", event_id, user_id);
        RequestAccountDeletionResponse {
          user_id,
          event_id: Some(event_id),
          already_queued: false,
        }
      }
      EnqueueOutcome::AlreadyQueued => {
        tracing::info!("Account deletion for user {} is already queued", user_id);
        RequestAccountDeletionResponse {
          user_id,
          event_id: None,
          already_queued: true,
        }
      }
    };

    Ok(response)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::infrastructure::persistence::memory::InMemoryStore;
  use crate::infrastructure::queue::InMemoryDeletionQueue;
  use crate::test_support::user;

  fn setup() -> (
    Arc<InMemoryStore>,
    Arc<InMemoryDeletionQueue>,
    RequestAccountDeletionUseCase,
  ) {
    let store = Arc::new(InMemoryStore::with_placeholder());
    let queue = Arc::new(InMemoryDeletionQueue::new(3));
    let use_case =
      RequestAccountDeletionUseCase::new(store.clone(), queue.clone(), store.placeholder());
    (store, queue, use_case)
  }

  fn command(acting: i64, target: i64) -> RequestAccountDeletionCommand {
    RequestAccountDeletionCommand {
      acting_user_id: UserId::from_db(acting),
      target_user_id: UserId::from_db(target),
      reason: None,
    }
  }

  #[tokio::test]
  async fn test_owner_request_is_queued_once() {
    let (store, queue, use_case) = setup();
    store.insert_user(user(42, "uma@example.com"));

    let first = use_case.execute(command(42, 42)).await.unwrap();
    let second = use_case.execute(command(42, 42)).await.unwrap();

    assert!(!first.already_queued);
    assert!(first.event_id.is_some());
    assert!(second.already_queued);
    assert_eq!(queue.pending_len().await, 1);
    // Nothing is deleted until the worker runs
    assert!(store.snapshot().users.contains_key(&42));
  }

  #[tokio::test]
  async fn test_someone_elses_account_is_refused() {
    let (store, queue, use_case) = setup();
    store.insert_user(user(42, "uma@example.com"));

    let result = use_case.execute(command(7, 42)).await;

    assert!(matches!(result, Err(AccountDeletionError::NotAccountOwner)));
    assert_eq!(queue.pending_len().await, 0);
  }

  #[tokio::test]
  async fn test_unknown_user_is_not_found() {
    let (_store, _queue, use_case) = setup();
    let result = use_case.execute(command(42, 42)).await;
    assert!(matches!(result, Err(AccountDeletionError::UserNotFound)));
  }

  #[tokio::test]
  async fn test_placeholder_cannot_be_deleted() {
    let (_store, queue, use_case) = setup();

    let result = use_case.execute(command(1, 1)).await;

    assert!(matches!(result, Err(AccountDeletionError::PlaceholderProtected)));
    assert_eq!(queue.pending_len().await, 0);
  }
}
