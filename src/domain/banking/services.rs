use async_trait::async_trait;
use std::sync::Arc;

use super::errors::ExternalServiceError;
use super::ports::{BankLinkGateway, LinkedAccountRepository, PaymentGateway};
use super::value_objects::ExternalResourceKind;
use crate::domain::account_deletion::errors::CleanupError;
use crate::domain::account_deletion::ports::{CascadeObserver, ResourceCleaner};
use crate::domain::account_deletion::value_objects::ExternalFailurePolicy;
use crate::domain::expense::ports::SharedExpenseRepository;
use crate::domain::user::entities::User;
use crate::domain::user::ports::UserRepository;

/// Tears down provider-side financial resources of the user: pending
/// transfers, bank-link items, funding sources and the payments customer.
///
/// Runs first so that nothing can move money for the user once the rest of
/// the cascade starts rewriting history.
pub struct ExternalResourceRevoker {
  user_repo: Arc<dyn UserRepository>,
  expense_repo: Arc<dyn SharedExpenseRepository>,
  account_repo: Arc<dyn LinkedAccountRepository>,
  payment_gateway: Arc<dyn PaymentGateway>,
  bank_link_gateway: Arc<dyn BankLinkGateway>,
  observer: Arc<dyn CascadeObserver>,
  policy: ExternalFailurePolicy,
}

impl ExternalResourceRevoker {
  pub fn new(
    user_repo: Arc<dyn UserRepository>,
    expense_repo: Arc<dyn SharedExpenseRepository>,
    account_repo: Arc<dyn LinkedAccountRepository>,
    payment_gateway: Arc<dyn PaymentGateway>,
    bank_link_gateway: Arc<dyn BankLinkGateway>,
    observer: Arc<dyn CascadeObserver>,
    policy: ExternalFailurePolicy,
  ) -> Self {
    Self {
      user_repo,
      expense_repo,
      account_repo,
      payment_gateway,
      bank_link_gateway,
      observer,
      policy,
    }
  }

  /// Applies the failure policy to one provider call.
  ///
  /// Returns `Ok(true)` when the resource is gone, `Ok(false)` when revocation
  /// failed and the cascade continues anyway.
  fn settle(
    &self,
    user: &User,
    kind: ExternalResourceKind,
    resource: &str,
    result: Result<(), ExternalServiceError>,
  ) -> Result<bool, CleanupError> {
    let error = match result {
      Ok(()) => return Ok(true),
      Err(e) if e.is_already_absent() => {
        tracing::debug!("{} {} of user {} was already gone", kind, resource, user.id);
        return Ok(true);
      }
      Err(e) => e,
    };

    self.observer.external_failure(kind);

    match self.policy {
      ExternalFailurePolicy::Continue => {
        tracing::error!(
          user_id = %user.id,
          resource_kind = kind.as_str(),
          resource = resource,
          "Failed to revoke external resource, manual follow-up required: {}",
          error
        );
        Ok(false)
      }
      ExternalFailurePolicy::Halt => {
        tracing::error!(
          user_id = %user.id,
          resource_kind = kind.as_str(),
          resource = resource,
          "Failed to revoke external resource, halting deletion: {}",
          error
        );
        Err(CleanupError::External(error))
      }
    }
  }

  async fn cancel_pending_transfers(&self, user: &User) -> Result<(), CleanupError> {
    let pending = self
      .expense_repo
      .find_pending_transfers_involving(user.id)
      .await?;

    for transfer in pending {
      let cancelled = match transfer.transfer_url.as_deref() {
        Some(url) => {
          let result = self.payment_gateway.cancel_transfer(url).await;
          self.settle(user, ExternalResourceKind::Transfer, url, result)?
        }
        // Never submitted to the provider
        None => true,
      };

      if cancelled {
        self.expense_repo.mark_transfer_cancelled(transfer.id).await?;
      }
    }

    Ok(())
  }

  async fn revoke_linked_accounts(&self, user: &User) -> Result<(), CleanupError> {
    let accounts = self.account_repo.find_for_user(user.id).await?;

    for account in accounts
      .into_iter()
      .filter(|account| account.needs_external_revocation())
    {
      let mut revoked = true;

      if let Some(token) = account.bank_link_access_token.as_deref() {
        let item = account
          .bank_link_item_id
          .clone()
          .unwrap_or_else(|| format!("account:{}", account.id));
        let result = self.bank_link_gateway.remove_item(token).await;
        revoked &= self.settle(user, ExternalResourceKind::BankLinkItem, &item, result)?;
      }

      if let Some(url) = account.funding_source_url.as_deref() {
        let result = self.payment_gateway.remove_funding_source(url).await;
        revoked &= self.settle(user, ExternalResourceKind::FundingSource, url, result)?;
      }

      if revoked {
        self
          .account_repo
          .mark_funding_source_removed(account.id)
          .await?;
      }
    }

    Ok(())
  }

  /// Reads the customer from the current row, not the event snapshot. A
  /// missing row means the cascade already finished past this step.
  async fn deactivate_customer(&self, user: &User) -> Result<(), CleanupError> {
    let Some(current) = self.user_repo.find_by_id(user.id).await? else {
      return Ok(());
    };
    let Some(url) = current.payment_customer_url.as_deref() else {
      return Ok(());
    };

    let result = self.payment_gateway.deactivate_customer(url).await;
    if self.settle(user, ExternalResourceKind::PaymentCustomer, url, result)? {
      self.user_repo.clear_payment_customer(user.id).await?;
    }
    Ok(())
  }
}

#[async_trait]
impl ResourceCleaner for ExternalResourceRevoker {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError> {
    self.cancel_pending_transfers(user).await?;
    self.revoke_linked_accounts(user).await?;
    self.deactivate_customer(user).await?;
    Ok(())
  }
}

/// Removes local records of the user's linked bank accounts
pub struct LinkedAccountDeregistrationService {
  account_repo: Arc<dyn LinkedAccountRepository>,
}

impl LinkedAccountDeregistrationService {
  pub fn new(account_repo: Arc<dyn LinkedAccountRepository>) -> Self {
    Self { account_repo }
  }
}

#[async_trait]
impl ResourceCleaner for LinkedAccountDeregistrationService {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError> {
    let accounts = self.account_repo.find_for_user(user.id).await?;

    // Past this point the local handles are gone, so leave a trail for ops
    for account in accounts.iter().filter(|a| a.needs_external_revocation()) {
      tracing::error!(
        user_id = %user.id,
        account_id = account.id,
        item_id = account.bank_link_item_id.as_deref().unwrap_or("-"),
        funding_source = account.funding_source_url.as_deref().unwrap_or("-"),
        "Deregistering account whose provider resources were not confirmed removed, manual follow-up required"
      );
    }

    let removed = self.account_repo.delete_for_user(user.id).await?;
    tracing::debug!("Removed {} linked accounts of user {}", removed, user.id);
    Ok(())
  }
}
