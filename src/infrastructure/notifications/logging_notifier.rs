use async_trait::async_trait;

use crate::domain::account_deletion::errors::NotificationError;
use crate::domain::account_deletion::ports::DeletionNotifier;
use crate::domain::expense::entities::AgreementCancellationNotice;
use crate::domain::user::entities::User;

/// Writes outbound deletion messages to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

#[async_trait]
impl DeletionNotifier for LoggingNotifier {
  async fn agreement_cancelled(
    &self,
    notice: &AgreementCancellationNotice,
  ) -> Result<(), NotificationError> {
    tracing::info!(
      recipient_user_id = %notice.recipient_user_id,
      recipient_email = %notice.recipient_email,
      shared_expense_id = notice.shared_expense_id,
      "{}: {}",
      notice.title(),
      notice.body()
    );
    Ok(())
  }

  async fn account_deleted(&self, user: &User) -> Result<(), NotificationError> {
    tracing::info!(
      user_id = %user.id,
      email = %user.email,
      "Account deletion confirmed for {}",
      user.display_name()
    );
    Ok(())
  }
}
