use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::entities::AgreementCancellationNotice;
use super::ports::SharedExpenseRepository;
use crate::domain::account_deletion::entities::DeactivatedPlaceholder;
use crate::domain::account_deletion::errors::CleanupError;
use crate::domain::account_deletion::ports::{DeletionNotifier, ResourceCleaner};
use crate::domain::banking::ports::{BankTransactionRepository, LinkedAccountRepository};
use crate::domain::user::entities::User;

/// Hands the user's financial history over to the placeholder so that
/// counterparties keep their records.
pub struct TransactionReassignmentService {
  expense_repo: Arc<dyn SharedExpenseRepository>,
  account_repo: Arc<dyn LinkedAccountRepository>,
  bank_transaction_repo: Arc<dyn BankTransactionRepository>,
  notifier: Arc<dyn DeletionNotifier>,
  placeholder: DeactivatedPlaceholder,
}

impl TransactionReassignmentService {
  pub fn new(
    expense_repo: Arc<dyn SharedExpenseRepository>,
    account_repo: Arc<dyn LinkedAccountRepository>,
    bank_transaction_repo: Arc<dyn BankTransactionRepository>,
    notifier: Arc<dyn DeletionNotifier>,
    placeholder: DeactivatedPlaceholder,
  ) -> Self {
    Self {
      expense_repo,
      account_repo,
      bank_transaction_repo,
      notifier,
      placeholder,
    }
  }

  /// Participants of the user's active expenses, gathered before ownership
  /// moves away
  async fn collect_cancellation_notices(
    &self,
    user: &User,
  ) -> Result<Vec<AgreementCancellationNotice>, CleanupError> {
    let mut notices = Vec::new();

    for expense in self.expense_repo.find_active_owned_by(user.id).await? {
      let participants = self.expense_repo.find_participants(expense.id).await?;

      notices.extend(
        participants
          .into_iter()
          .filter(|p| p.user_id != user.id)
          .map(|p| AgreementCancellationNotice {
            shared_expense_id: expense.id,
            agreement_id: p.agreement_id,
            expense_nickname: expense.expense_nickname.clone(),
            recipient_user_id: p.user_id,
            recipient_email: p.email,
            deleted_user_first_name: user.first_name.clone(),
          }),
      );
    }

    Ok(notices)
  }

  async fn send_notices(&self, notices: &[AgreementCancellationNotice]) {
    for notice in notices {
      if let Err(e) = self.notifier.agreement_cancelled(notice).await {
        tracing::warn!(
          "Failed to notify user {} about cancelled agreement {}: {}",
          notice.recipient_user_id,
          notice.agreement_id,
          e
        );
      }
    }
  }
}

#[async_trait]
impl ResourceCleaner for TransactionReassignmentService {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError> {
    let notices = self.collect_cancellation_notices(user).await?;

    let transactions = self
      .expense_repo
      .redirect_transactions(user.id, &self.placeholder)
      .await?;
    let expenses = self
      .expense_repo
      .redirect_owned_expenses(user.id, &self.placeholder, Utc::now())
      .await?;
    let agreements = self.expense_repo.delete_agreements_for_user(user.id).await?;

    let account_ids: Vec<i64> = self
      .account_repo
      .find_for_user(user.id)
      .await?
      .into_iter()
      .map(|account| account.id)
      .collect();
    let bank_transactions = if account_ids.is_empty() {
      0
    } else {
      self
        .bank_transaction_repo
        .reassign_accounts(&account_ids, self.placeholder.account_id)
        .await?
    };

    tracing::info!(
      "Reassigned {} transactions, {} shared expenses and {} bank transactions of user {} to placeholder {}; removed {} agreements",
      transactions,
      expenses,
      bank_transactions,
      user.id,
      self.placeholder.user_id,
      agreements
    );

    // Sent only once the redirect is durable, so a retried run does not repeat them
    self.send_notices(&notices).await;
    Ok(())
  }
}
