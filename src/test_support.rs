//! Fixtures and recording fakes shared by unit tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::domain::account_deletion::errors::NotificationError;
use crate::domain::account_deletion::ports::{CascadeObserver, DeletionNotifier};
use crate::domain::account_deletion::services::CascadeDependencies;
use crate::domain::account_deletion::value_objects::CleanupStep;
use crate::domain::banking::errors::ExternalServiceError;
use crate::domain::banking::ports::{BankLinkGateway, PaymentGateway};
use crate::domain::banking::value_objects::ExternalResourceKind;
use crate::domain::expense::entities::AgreementCancellationNotice;
use crate::domain::user::entities::User;
use crate::domain::user::value_objects::UserId;
use crate::infrastructure::persistence::memory::InMemoryStore;

pub fn user(id: i64, email: &str) -> User {
  let now = Utc::now();
  let first_name = email.split('@').next().unwrap_or("user");
  User::from_db(
    UserId::from_db(id),
    email.to_string(),
    first_name.to_string(),
    "Tester".to_string(),
    None,
    false,
    now,
    now,
  )
}

/// Cascade ports backed by one in-memory store
pub fn cascade_dependencies(
  store: &Arc<InMemoryStore>,
  gateway: &Arc<RecordingGateway>,
  notifier: &Arc<RecordingNotifier>,
  observer: Arc<dyn CascadeObserver>,
) -> CascadeDependencies {
  CascadeDependencies {
    user_repo: store.clone(),
    relationship_repo: store.clone(),
    device_repo: store.clone(),
    invite_repo: store.clone(),
    login_log_repo: store.clone(),
    account_repo: store.clone(),
    bank_transaction_repo: store.clone(),
    expense_repo: store.clone(),
    payment_gateway: gateway.clone(),
    bank_link_gateway: gateway.clone(),
    notifier: notifier.clone(),
    observer,
  }
}

#[derive(Default)]
pub struct RecordingNotifier {
  fail: bool,
  cancelled: Mutex<Vec<AgreementCancellationNotice>>,
  deleted: Mutex<Vec<UserId>>,
}

impl RecordingNotifier {
  /// Records every message, then reports it as undeliverable
  pub fn failing() -> Self {
    Self {
      fail: true,
      ..Self::default()
    }
  }

  pub fn cancelled_agreements(&self) -> Vec<AgreementCancellationNotice> {
    self.cancelled.lock().unwrap().clone()
  }

  pub fn deleted_accounts(&self) -> Vec<UserId> {
    self.deleted.lock().unwrap().clone()
  }

  fn outcome(&self) -> Result<(), NotificationError> {
    if self.fail {
      return Err(NotificationError::Delivery("mailbox unavailable".to_string()));
    }
    Ok(())
  }
}

#[async_trait]
impl DeletionNotifier for RecordingNotifier {
  async fn agreement_cancelled(
    &self,
    notice: &AgreementCancellationNotice,
  ) -> Result<(), NotificationError> {
    self.cancelled.lock().unwrap().push(notice.clone());
    self.outcome()
  }

  async fn account_deleted(&self, user: &User) -> Result<(), NotificationError> {
    self.deleted.lock().unwrap().push(user.id);
    self.outcome()
  }
}

/// Payments and bank-link provider fake that records every call
#[derive(Default)]
pub struct RecordingGateway {
  calls: Mutex<Vec<String>>,
  rejected: Mutex<HashSet<String>>,
  absent: Mutex<HashSet<String>>,
}

impl RecordingGateway {
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  /// Makes calls for `resource` fail as if the provider refused them
  pub fn reject(&self, resource: &str) {
    self.rejected.lock().unwrap().insert(resource.to_string());
  }

  /// Makes calls for `resource` report it as already gone
  pub fn mark_absent(&self, resource: &str) {
    self.absent.lock().unwrap().insert(resource.to_string());
  }

  fn record(&self, operation: &str, resource: &str) -> Result<(), ExternalServiceError> {
    self
      .calls
      .lock()
      .unwrap()
      .push(format!("{} {}", operation, resource));

    if self.rejected.lock().unwrap().contains(resource) {
      return Err(ExternalServiceError::Rejected {
        resource: resource.to_string(),
        reason: "already settled".to_string(),
      });
    }
    if self.absent.lock().unwrap().contains(resource) {
      return Err(ExternalServiceError::NotFound(resource.to_string()));
    }
    Ok(())
  }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
  async fn cancel_transfer(&self, transfer_url: &str) -> Result<(), ExternalServiceError> {
    self.record("cancel_transfer", transfer_url)
  }

  async fn remove_funding_source(
    &self,
    funding_source_url: &str,
  ) -> Result<(), ExternalServiceError> {
    self.record("remove_funding_source", funding_source_url)
  }

  async fn deactivate_customer(&self, customer_url: &str) -> Result<(), ExternalServiceError> {
    self.record("deactivate_customer", customer_url)
  }
}

#[async_trait]
impl BankLinkGateway for RecordingGateway {
  async fn remove_item(&self, access_token: &str) -> Result<(), ExternalServiceError> {
    self.record("remove_item", access_token)
  }
}

#[derive(Default)]
pub struct RecordingObserver {
  completed: Mutex<Vec<CleanupStep>>,
  failed: Mutex<Vec<CleanupStep>>,
  cascades: Mutex<Vec<&'static str>>,
  external: Mutex<Vec<ExternalResourceKind>>,
}

impl RecordingObserver {
  pub fn completed_steps(&self) -> Vec<CleanupStep> {
    self.completed.lock().unwrap().clone()
  }

  pub fn failed_steps(&self) -> Vec<CleanupStep> {
    self.failed.lock().unwrap().clone()
  }

  pub fn cascades(&self) -> Vec<&'static str> {
    self.cascades.lock().unwrap().clone()
  }

  pub fn external_failures(&self) -> Vec<ExternalResourceKind> {
    self.external.lock().unwrap().clone()
  }
}

impl CascadeObserver for RecordingObserver {
  fn step_completed(&self, step: CleanupStep) {
    self.completed.lock().unwrap().push(step);
  }

  fn step_failed(&self, step: CleanupStep) {
    self.failed.lock().unwrap().push(step);
  }

  fn cascade_completed(&self) {
    self.cascades.lock().unwrap().push("completed");
  }

  fn cascade_failed(&self) {
    self.cascades.lock().unwrap().push("failed");
  }

  fn external_failure(&self, resource: ExternalResourceKind) {
    self.external.lock().unwrap().push(resource);
  }
}
