use async_trait::async_trait;

use super::entities::LinkedAccount;
use super::errors::ExternalServiceError;
use crate::domain::user::errors::RepositoryError;
use crate::domain::user::value_objects::UserId;

/// Repository trait for linked bank accounts
#[async_trait]
pub trait LinkedAccountRepository: Send + Sync {
  /// Finds every account linked by the user
  async fn find_for_user(&self, user_id: UserId) -> Result<Vec<LinkedAccount>, RepositoryError>;

  /// Finds the inactive account owned by the placeholder user
  async fn find_placeholder_account(
    &self,
    placeholder_user_id: UserId,
  ) -> Result<Option<LinkedAccount>, RepositoryError>;

  /// Records that provider-side resources of the account were revoked
  async fn mark_funding_source_removed(&self, account_id: i64) -> Result<(), RepositoryError>;

  /// Deletes every account linked by the user
  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}

/// Repository trait for bank-feed transactions
#[async_trait]
pub trait BankTransactionRepository: Send + Sync {
  /// Moves transactions of the given accounts to `target_account_id`
  async fn reassign_accounts(
    &self,
    account_ids: &[i64],
    target_account_id: i64,
  ) -> Result<u64, RepositoryError>;
}

/// Payments provider (transfers, funding sources, customers)
#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Cancels a transfer that has not settled yet
  async fn cancel_transfer(&self, transfer_url: &str) -> Result<(), ExternalServiceError>;

  /// Removes a funding source so it can no longer be debited
  async fn remove_funding_source(&self, funding_source_url: &str)
  -> Result<(), ExternalServiceError>;

  /// Deactivates the customer record
  async fn deactivate_customer(&self, customer_url: &str) -> Result<(), ExternalServiceError>;
}

/// Bank-link provider (account connections)
#[async_trait]
pub trait BankLinkGateway: Send + Sync {
  /// Invalidates the access token and removes the item
  async fn remove_item(&self, access_token: &str) -> Result<(), ExternalServiceError>;
}
