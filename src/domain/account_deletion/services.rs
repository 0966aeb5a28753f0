use std::sync::Arc;

use super::entities::DeactivatedPlaceholder;
use super::errors::CleanupError;
use super::ports::{CascadeObserver, DeletionNotifier, ResourceCleaner};
use super::value_objects::{CleanupStep, ExternalFailurePolicy};
use crate::domain::banking::ports::{
  BankLinkGateway, BankTransactionRepository, LinkedAccountRepository, PaymentGateway,
};
use crate::domain::banking::services::{
  ExternalResourceRevoker, LinkedAccountDeregistrationService,
};
use crate::domain::expense::ports::SharedExpenseRepository;
use crate::domain::expense::services::TransactionReassignmentService;
use crate::domain::user::entities::User;
use crate::domain::user::ports::{
  DeviceRepository, LoginLogRepository, RelationshipRepository, UserInviteRepository,
  UserRepository,
};
use crate::domain::user::services::{
  DeviceRegistryCleaner, InviteLedgerCleaner, LoginAuditCleaner, RelationshipPruner,
  UserRecordEraser,
};

/// Ports needed to assemble the standard cascade
#[derive(Clone)]
pub struct CascadeDependencies {
  pub user_repo: Arc<dyn UserRepository>,
  pub relationship_repo: Arc<dyn RelationshipRepository>,
  pub device_repo: Arc<dyn DeviceRepository>,
  pub invite_repo: Arc<dyn UserInviteRepository>,
  pub login_log_repo: Arc<dyn LoginLogRepository>,
  pub account_repo: Arc<dyn LinkedAccountRepository>,
  pub bank_transaction_repo: Arc<dyn BankTransactionRepository>,
  pub expense_repo: Arc<dyn SharedExpenseRepository>,
  pub payment_gateway: Arc<dyn PaymentGateway>,
  pub bank_link_gateway: Arc<dyn BankLinkGateway>,
  pub notifier: Arc<dyn DeletionNotifier>,
  pub observer: Arc<dyn CascadeObserver>,
}

/// The eight collaborators of the cascade, one per step
pub struct CascadeCleaners {
  pub external_resources: Arc<dyn ResourceCleaner>,
  pub transaction_reassignment: Arc<dyn ResourceCleaner>,
  pub relationships: Arc<dyn ResourceCleaner>,
  pub devices: Arc<dyn ResourceCleaner>,
  pub invites: Arc<dyn ResourceCleaner>,
  pub login_audit: Arc<dyn ResourceCleaner>,
  pub linked_accounts: Arc<dyn ResourceCleaner>,
  pub user_record: Arc<dyn ResourceCleaner>,
}

impl CascadeCleaners {
  /// Wires the standard cleaners against the given ports
  pub fn assemble(
    deps: &CascadeDependencies,
    placeholder: &DeactivatedPlaceholder,
    policy: ExternalFailurePolicy,
  ) -> Self {
    Self {
      external_resources: Arc::new(ExternalResourceRevoker::new(
        deps.user_repo.clone(),
        deps.expense_repo.clone(),
        deps.account_repo.clone(),
        deps.payment_gateway.clone(),
        deps.bank_link_gateway.clone(),
        deps.observer.clone(),
        policy,
      )),
      transaction_reassignment: Arc::new(TransactionReassignmentService::new(
        deps.expense_repo.clone(),
        deps.account_repo.clone(),
        deps.bank_transaction_repo.clone(),
        deps.notifier.clone(),
        placeholder.clone(),
      )),
      relationships: Arc::new(RelationshipPruner::new(deps.relationship_repo.clone())),
      devices: Arc::new(DeviceRegistryCleaner::new(deps.device_repo.clone())),
      invites: Arc::new(InviteLedgerCleaner::new(deps.invite_repo.clone())),
      login_audit: Arc::new(LoginAuditCleaner::new(deps.login_log_repo.clone())),
      linked_accounts: Arc::new(LinkedAccountDeregistrationService::new(
        deps.account_repo.clone(),
      )),
      user_record: Arc::new(UserRecordEraser::new(
        deps.user_repo.clone(),
        deps.notifier.clone(),
        placeholder.clone(),
      )),
    }
  }

  /// Cleaners paired with their step, in execution order
  pub fn in_order(&self) -> [(CleanupStep, &dyn ResourceCleaner); 8] {
    [
      (CleanupStep::ExternalResources, self.external_resources.as_ref()),
      (
        CleanupStep::TransactionReassignment,
        self.transaction_reassignment.as_ref(),
      ),
      (CleanupStep::Relationships, self.relationships.as_ref()),
      (CleanupStep::Devices, self.devices.as_ref()),
      (CleanupStep::Invites, self.invites.as_ref()),
      (CleanupStep::LoginAudit, self.login_audit.as_ref()),
      (CleanupStep::LinkedAccounts, self.linked_accounts.as_ref()),
      (CleanupStep::UserRecord, self.user_record.as_ref()),
    ]
  }
}

/// Runs the deletion cascade for one user.
///
/// Steps run strictly one after another. The first failing step stops the
/// cascade and nothing is rolled back; every step is idempotent so the whole
/// cascade can simply be run again.
pub struct AccountDeletionOrchestrator {
  cleaners: CascadeCleaners,
  placeholder: DeactivatedPlaceholder,
  observer: Arc<dyn CascadeObserver>,
}

impl AccountDeletionOrchestrator {
  pub fn new(
    cleaners: CascadeCleaners,
    placeholder: DeactivatedPlaceholder,
    observer: Arc<dyn CascadeObserver>,
  ) -> Self {
    Self {
      cleaners,
      placeholder,
      observer,
    }
  }

  pub fn placeholder(&self) -> &DeactivatedPlaceholder {
    &self.placeholder
  }

  pub async fn run(&self, user: &User) -> Result<(), CleanupError> {
    if self.placeholder.is_placeholder(user) {
      tracing::error!("Refusing to run deletion cascade for placeholder user {}", user.id);
      self.observer.cascade_failed();
      return Err(CleanupError::PlaceholderDeletionRefused);
    }

    tracing::info!("Starting deletion cascade for user {}", user.id);

    for (step, cleaner) in self.cleaners.in_order() {
      tracing::debug!(step = step.as_str(), "Running cleanup step");

      if let Err(e) = cleaner.delete_managed_resources_for_user(user).await {
        tracing::error!("Cleanup step {} failed for user {}: {}", step, user.id, e);
        self.observer.step_failed(step);
        self.observer.cascade_failed();
        return Err(e.in_step(step));
      }

      tracing::debug!(step = step.as_str(), "Cleanup step finished");
      self.observer.step_completed(step);
    }

    self.observer.cascade_completed();
    tracing::info!("Deletion cascade finished for user {}", user.id);
    Ok(())
  }
}

/// Looks up the seeded placeholder account at startup
pub struct PlaceholderResolver {
  user_repo: Arc<dyn UserRepository>,
  account_repo: Arc<dyn LinkedAccountRepository>,
  expected_email: String,
}

impl PlaceholderResolver {
  pub fn new(
    user_repo: Arc<dyn UserRepository>,
    account_repo: Arc<dyn LinkedAccountRepository>,
    expected_email: impl Into<String>,
  ) -> Self {
    Self {
      user_repo,
      account_repo,
      expected_email: expected_email.into(),
    }
  }

  pub async fn resolve(&self) -> Result<DeactivatedPlaceholder, CleanupError> {
    let user = self
      .user_repo
      .find_placeholder()
      .await?
      .ok_or(CleanupError::PlaceholderMissing)?;

    if !user.email.eq_ignore_ascii_case(&self.expected_email) {
      tracing::error!(
        "Placeholder user {} has email {}, expected {}",
        user.id,
        user.email,
        self.expected_email
      );
      return Err(CleanupError::PlaceholderMissing);
    }

    let account = self
      .account_repo
      .find_placeholder_account(user.id)
      .await?
      .ok_or(CleanupError::PlaceholderMissing)?;

    tracing::info!(
      "Resolved deactivated placeholder: user {}, account {}",
      user.id,
      account.id
    );

    Ok(DeactivatedPlaceholder {
      user_id: user.id,
      account_id: account.id,
      display_name: user.display_name(),
    })
  }
}
