use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entities::{AgreementParticipant, SharedExpense, SharedExpenseTransaction};
use crate::domain::account_deletion::entities::DeactivatedPlaceholder;
use crate::domain::user::errors::RepositoryError;
use crate::domain::user::value_objects::UserId;

/// Repository trait for shared expenses, their agreements and transactions
#[async_trait]
pub trait SharedExpenseRepository: Send + Sync {
  /// Finds active shared expenses created by the user
  async fn find_active_owned_by(
    &self,
    user_id: UserId,
  ) -> Result<Vec<SharedExpense>, RepositoryError>;

  /// Finds the participants (agreement holders) of a shared expense
  async fn find_participants(
    &self,
    shared_expense_id: i64,
  ) -> Result<Vec<AgreementParticipant>, RepositoryError>;

  /// Finds pending transfers where the user is source or destination
  async fn find_pending_transfers_involving(
    &self,
    user_id: UserId,
  ) -> Result<Vec<SharedExpenseTransaction>, RepositoryError>;

  /// Records that a pending transfer was cancelled at the provider
  async fn mark_transfer_cancelled(&self, transaction_id: i64) -> Result<(), RepositoryError>;

  /// Rewrites source/destination references of the user to the placeholder
  async fn redirect_transactions(
    &self,
    user_id: UserId,
    placeholder: &DeactivatedPlaceholder,
  ) -> Result<u64, RepositoryError>;

  /// Hands expenses created by the user to the placeholder and deactivates them
  async fn redirect_owned_expenses(
    &self,
    user_id: UserId,
    placeholder: &DeactivatedPlaceholder,
    now: DateTime<Utc>,
  ) -> Result<u64, RepositoryError>;

  /// Deletes the user's own participation rows
  async fn delete_agreements_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}
