use std::sync::Arc;

use crate::domain::account_deletion::entities::AccountDeletionEvent;
use crate::domain::account_deletion::errors::CleanupError;
use crate::domain::account_deletion::services::AccountDeletionOrchestrator;
use crate::domain::user::ports::UserRepository;

/// Use case for running the cascade of one queued deletion
pub struct ProcessAccountDeletionUseCase {
  user_repo: Arc<dyn UserRepository>,
  orchestrator: Arc<AccountDeletionOrchestrator>,
}

impl ProcessAccountDeletionUseCase {
  pub fn new(
    user_repo: Arc<dyn UserRepository>,
    orchestrator: Arc<AccountDeletionOrchestrator>,
  ) -> Self {
    Self {
      user_repo,
      orchestrator,
    }
  }

  /// Runs the cascade against the current user row, or against the snapshot
  /// carried by the event once the row is gone (redelivery after success).
  pub async fn execute(&self, event: &AccountDeletionEvent) -> Result<(), CleanupError> {
    let user = match self.user_repo.find_by_id(event.user_id()).await? {
      Some(user) => user,
      None => {
        tracing::info!(
          "User {} no longer exists, replaying cascade from event snapshot",
          event.user_id()
        );
        event.user.clone()
      }
    };

    self.orchestrator.run(&user).await
  }
}
