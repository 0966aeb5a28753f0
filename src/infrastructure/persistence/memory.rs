//! In-memory implementation of every repository port, used to run whole
//! cascades in tests without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::account_deletion::entities::DeactivatedPlaceholder;
use crate::domain::banking::entities::{BankTransaction, LinkedAccount};
use crate::domain::banking::ports::{BankTransactionRepository, LinkedAccountRepository};
use crate::domain::expense::entities::{
  AgreementParticipant, SharedExpense, SharedExpenseTransaction, SharedExpenseUserAgreement,
};
use crate::domain::expense::ports::SharedExpenseRepository;
use crate::domain::expense::value_objects::TransferStatus;
use crate::domain::user::entities::{
  Device, LoginLogEntry, PushNotification, Relationship, User, UserInvite,
};
use crate::domain::user::errors::RepositoryError;
use crate::domain::user::ports::{
  DeviceRepository, LoginLogRepository, RelationshipRepository, UserInviteRepository,
  UserRepository,
};
use crate::domain::user::value_objects::{Email, UserId};

pub const PLACEHOLDER_USER_ID: i64 = 1;
pub const PLACEHOLDER_ACCOUNT_ID: i64 = 1;
pub const PLACEHOLDER_EMAIL: &str = "account-reserved-for-deleted-users@equater.app";

/// Everything the store holds; compared whole to check idempotence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryState {
  pub users: BTreeMap<i64, User>,
  pub linked_accounts: Vec<LinkedAccount>,
  pub bank_transactions: Vec<BankTransaction>,
  pub expenses: Vec<SharedExpense>,
  pub agreements: Vec<SharedExpenseUserAgreement>,
  pub transactions: Vec<SharedExpenseTransaction>,
  pub relationships: Vec<Relationship>,
  pub devices: Vec<Device>,
  pub push_notifications: Vec<PushNotification>,
  pub invites: Vec<UserInvite>,
  pub login_logs: Vec<LoginLogEntry>,
  last_id: i64,
}

impl MemoryState {
  fn allocate_id(&mut self) -> i64 {
    self.last_id += 1;
    1000 + self.last_id
  }

  pub fn transaction(&self, id: i64) -> &SharedExpenseTransaction {
    self
      .transactions
      .iter()
      .find(|t| t.id == id)
      .expect("transaction exists")
  }

  pub fn expense(&self, id: i64) -> &SharedExpense {
    self
      .expenses
      .iter()
      .find(|e| e.id == id)
      .expect("shared expense exists")
  }

  pub fn linked_account(&self, id: i64) -> &LinkedAccount {
    self
      .linked_accounts
      .iter()
      .find(|a| a.id == id)
      .expect("linked account exists")
  }

  pub fn bank_transaction(&self, id: i64) -> &BankTransaction {
    self
      .bank_transactions
      .iter()
      .find(|t| t.id == id)
      .expect("bank transaction exists")
  }

  /// Describes every stored user reference that no longer resolves to a user
  pub fn dangling_user_references(&self) -> Vec<String> {
    let mut references: Vec<(String, UserId)> = Vec::new();

    for t in &self.transactions {
      references.push((format!("transaction {} source", t.id), t.source_user_id));
      references.push((format!("transaction {} destination", t.id), t.destination_user_id));
    }
    for e in &self.expenses {
      references.push((format!("shared expense {} owner", e.id), e.expense_owner_user_id));
    }
    for a in &self.agreements {
      references.push((format!("agreement {}", a.id), a.user_id));
    }
    for r in &self.relationships {
      references.push((format!("relationship {} originating", r.id), r.originating_user_id));
      references.push((format!("relationship {} consenting", r.id), r.consenting_user_id));
    }
    for d in &self.devices {
      references.push((format!("device {}", d.id), d.user_id));
    }
    for i in &self.invites {
      references.push((format!("invite {}", i.id), i.initiating_user_id));
    }
    for l in &self.login_logs {
      references.push((format!("login log {}", l.id), l.user_id));
    }
    for a in &self.linked_accounts {
      references.push((format!("linked account {}", a.id), a.user_id));
    }

    references
      .into_iter()
      .filter(|(_, user_id)| !self.users.contains_key(&user_id.into_inner()))
      .map(|(what, user_id)| format!("{} -> user {}", what, user_id))
      .collect()
  }
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct InMemoryStore {
  state: Mutex<MemoryState>,
}

impl InMemoryStore {
  /// Store seeded with the placeholder user and its inactive account
  pub fn with_placeholder() -> Self {
    let store = Self::default();
    let now = Utc::now();
    {
      let mut state = store.state();
      state.users.insert(
        PLACEHOLDER_USER_ID,
        User::from_db(
          UserId::from_db(PLACEHOLDER_USER_ID),
          PLACEHOLDER_EMAIL.to_string(),
          "Deactivated".to_string(),
          "Account".to_string(),
          None,
          true,
          now,
          now,
        ),
      );
      state.linked_accounts.push(LinkedAccount {
        id: PLACEHOLDER_ACCOUNT_ID,
        user_id: UserId::from_db(PLACEHOLDER_USER_ID),
        account_name: "Deactivated Account".to_string(),
        institution_name: "Equater".to_string(),
        bank_link_access_token: None,
        bank_link_item_id: None,
        funding_source_url: None,
        has_removed_funding_source: true,
        is_active: false,
        created_at: now,
      });
    }
    store
  }

  fn state(&self) -> MutexGuard<'_, MemoryState> {
    self
      .state
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn placeholder(&self) -> DeactivatedPlaceholder {
    DeactivatedPlaceholder {
      user_id: UserId::from_db(PLACEHOLDER_USER_ID),
      account_id: PLACEHOLDER_ACCOUNT_ID,
      display_name: "Deactivated Account".to_string(),
    }
  }

  pub fn snapshot(&self) -> MemoryState {
    self.state().clone()
  }

  /// Stores the user under its own id
  pub fn insert_user(&self, user: User) -> User {
    self.state().users.insert(user.id.into_inner(), user.clone());
    user
  }

  pub fn insert_linked_account(&self, mut account: LinkedAccount) -> LinkedAccount {
    let mut state = self.state();
    account.id = state.allocate_id();
    state.linked_accounts.push(account.clone());
    account
  }

  pub fn insert_bank_transaction(&self, mut transaction: BankTransaction) -> BankTransaction {
    let mut state = self.state();
    transaction.id = state.allocate_id();
    state.bank_transactions.push(transaction.clone());
    transaction
  }

  pub fn insert_expense(&self, mut expense: SharedExpense) -> SharedExpense {
    let mut state = self.state();
    expense.id = state.allocate_id();
    state.expenses.push(expense.clone());
    expense
  }

  pub fn insert_agreement(
    &self,
    mut agreement: SharedExpenseUserAgreement,
  ) -> SharedExpenseUserAgreement {
    let mut state = self.state();
    agreement.id = state.allocate_id();
    state.agreements.push(agreement.clone());
    agreement
  }

  pub fn insert_transaction(
    &self,
    mut transaction: SharedExpenseTransaction,
  ) -> SharedExpenseTransaction {
    let mut state = self.state();
    transaction.id = state.allocate_id();
    state.transactions.push(transaction.clone());
    transaction
  }

  pub fn insert_relationship(&self, mut relationship: Relationship) -> Relationship {
    let mut state = self.state();
    relationship.id = state.allocate_id();
    state.relationships.push(relationship.clone());
    relationship
  }

  pub fn insert_device(&self, mut device: Device) -> Device {
    let mut state = self.state();
    device.id = state.allocate_id();
    state.devices.push(device.clone());
    device
  }

  pub fn insert_push_notification(&self, mut notification: PushNotification) -> PushNotification {
    let mut state = self.state();
    notification.id = state.allocate_id();
    state.push_notifications.push(notification.clone());
    notification
  }

  pub fn insert_invite(&self, mut invite: UserInvite) -> UserInvite {
    let mut state = self.state();
    invite.id = state.allocate_id();
    state.invites.push(invite.clone());
    invite
  }

  pub fn insert_login_log(&self, mut entry: LoginLogEntry) -> LoginLogEntry {
    let mut state = self.state();
    entry.id = state.allocate_id();
    state.login_logs.push(entry.clone());
    entry
  }
}

fn removed<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> u64 {
  let before = rows.len();
  rows.retain(|row| !matches(row));
  (before - rows.len()) as u64
}

#[async_trait]
impl UserRepository for InMemoryStore {
  async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
    Ok(self.state().users.get(&id.into_inner()).cloned())
  }

  async fn find_placeholder(&self) -> Result<Option<User>, RepositoryError> {
    Ok(
      self
        .state()
        .users
        .values()
        .find(|u| u.is_deactivated_placeholder)
        .cloned(),
    )
  }

  async fn delete_non_placeholder(&self, id: UserId) -> Result<bool, RepositoryError> {
    let mut state = self.state();
    match state.users.get(&id.into_inner()) {
      Some(user) if !user.is_deactivated_placeholder => {
        state.users.remove(&id.into_inner());
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn clear_payment_customer(&self, id: UserId) -> Result<(), RepositoryError> {
    if let Some(user) = self.state().users.get_mut(&id.into_inner()) {
      user.payment_customer_url = None;
    }
    Ok(())
  }
}

#[async_trait]
impl RelationshipRepository for InMemoryStore {
  async fn delete_involving(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    Ok(removed(&mut self.state().relationships, |r| r.involves(user_id)))
  }
}

#[async_trait]
impl DeviceRepository for InMemoryStore {
  async fn find_ids_for_user(&self, user_id: UserId) -> Result<Vec<i64>, RepositoryError> {
    Ok(
      self
        .state()
        .devices
        .iter()
        .filter(|d| d.user_id == user_id)
        .map(|d| d.id)
        .collect(),
    )
  }

  async fn delete_notifications_for_devices(
    &self,
    device_ids: &[i64],
  ) -> Result<u64, RepositoryError> {
    Ok(removed(&mut self.state().push_notifications, |n| {
      device_ids.contains(&n.device_id)
    }))
  }

  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    Ok(removed(&mut self.state().devices, |d| d.user_id == user_id))
  }
}

#[async_trait]
impl UserInviteRepository for InMemoryStore {
  async fn delete_for_user(
    &self,
    user_id: UserId,
    email: Option<&Email>,
  ) -> Result<u64, RepositoryError> {
    Ok(removed(&mut self.state().invites, |i| {
      i.initiating_user_id == user_id
        || email.is_some_and(|e| !i.is_converted && i.email.eq_ignore_ascii_case(e.as_str()))
    }))
  }
}

#[async_trait]
impl LoginLogRepository for InMemoryStore {
  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    Ok(removed(&mut self.state().login_logs, |l| l.user_id == user_id))
  }
}

#[async_trait]
impl LinkedAccountRepository for InMemoryStore {
  async fn find_for_user(&self, user_id: UserId) -> Result<Vec<LinkedAccount>, RepositoryError> {
    Ok(
      self
        .state()
        .linked_accounts
        .iter()
        .filter(|a| a.user_id == user_id)
        .cloned()
        .collect(),
    )
  }

  async fn find_placeholder_account(
    &self,
    placeholder_user_id: UserId,
  ) -> Result<Option<LinkedAccount>, RepositoryError> {
    Ok(
      self
        .state()
        .linked_accounts
        .iter()
        .filter(|a| a.user_id == placeholder_user_id && !a.is_active)
        .min_by_key(|a| a.id)
        .cloned(),
    )
  }

  async fn mark_funding_source_removed(&self, account_id: i64) -> Result<(), RepositoryError> {
    let mut state = self.state();
    let account = state
      .linked_accounts
      .iter_mut()
      .find(|a| a.id == account_id)
      .ok_or(RepositoryError::NotFound)?;
    account.has_removed_funding_source = true;
    Ok(())
  }

  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    Ok(removed(&mut self.state().linked_accounts, |a| a.user_id == user_id))
  }
}

#[async_trait]
impl BankTransactionRepository for InMemoryStore {
  async fn reassign_accounts(
    &self,
    account_ids: &[i64],
    target_account_id: i64,
  ) -> Result<u64, RepositoryError> {
    let mut moved = 0;
    for t in self
      .state()
      .bank_transactions
      .iter_mut()
      .filter(|t| account_ids.contains(&t.account_id))
    {
      t.account_id = target_account_id;
      moved += 1;
    }
    Ok(moved)
  }
}

#[async_trait]
impl SharedExpenseRepository for InMemoryStore {
  async fn find_active_owned_by(
    &self,
    user_id: UserId,
  ) -> Result<Vec<SharedExpense>, RepositoryError> {
    Ok(
      self
        .state()
        .expenses
        .iter()
        .filter(|e| e.expense_owner_user_id == user_id && e.is_active)
        .cloned()
        .collect(),
    )
  }

  async fn find_participants(
    &self,
    shared_expense_id: i64,
  ) -> Result<Vec<AgreementParticipant>, RepositoryError> {
    let state = self.state();
    Ok(
      state
        .agreements
        .iter()
        .filter(|a| a.shared_expense_id == shared_expense_id)
        .filter_map(|a| {
          state
            .users
            .get(&a.user_id.into_inner())
            .map(|u| AgreementParticipant {
              agreement_id: a.id,
              user_id: u.id,
              email: u.email.clone(),
              first_name: u.first_name.clone(),
            })
        })
        .collect(),
    )
  }

  async fn find_pending_transfers_involving(
    &self,
    user_id: UserId,
  ) -> Result<Vec<SharedExpenseTransaction>, RepositoryError> {
    Ok(
      self
        .state()
        .transactions
        .iter()
        .filter(|t| t.involves(user_id) && t.transfer_status == TransferStatus::Pending)
        .cloned()
        .collect(),
    )
  }

  async fn mark_transfer_cancelled(&self, transaction_id: i64) -> Result<(), RepositoryError> {
    let mut state = self.state();
    let transaction = state
      .transactions
      .iter_mut()
      .find(|t| t.id == transaction_id)
      .ok_or(RepositoryError::NotFound)?;
    transaction.transfer_status = TransferStatus::Cancelled;
    Ok(())
  }

  async fn redirect_transactions(
    &self,
    user_id: UserId,
    placeholder: &DeactivatedPlaceholder,
  ) -> Result<u64, RepositoryError> {
    let mut changed = 0;
    for t in self.state().transactions.iter_mut() {
      if t.redirect_party(user_id, placeholder) {
        changed += 1;
      }
    }
    Ok(changed)
  }

  async fn redirect_owned_expenses(
    &self,
    user_id: UserId,
    placeholder: &DeactivatedPlaceholder,
    now: DateTime<Utc>,
  ) -> Result<u64, RepositoryError> {
    let mut changed = 0;
    for e in self
      .state()
      .expenses
      .iter_mut()
      .filter(|e| e.expense_owner_user_id == user_id)
    {
      e.redirect_owner(placeholder, now);
      changed += 1;
    }
    Ok(changed)
  }

  async fn delete_agreements_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    Ok(removed(&mut self.state().agreements, |a| a.user_id == user_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::user;

  #[tokio::test]
  async fn test_placeholder_row_is_never_deleted() {
    let store = InMemoryStore::with_placeholder();

    let deleted = store
      .delete_non_placeholder(UserId::from_db(PLACEHOLDER_USER_ID))
      .await
      .unwrap();

    assert!(!deleted);
    assert!(store.snapshot().users.contains_key(&PLACEHOLDER_USER_ID));
  }

  #[tokio::test]
  async fn test_dangling_references_are_reported() {
    let store = InMemoryStore::with_placeholder();
    store.insert_relationship(Relationship {
      id: 0,
      originating_user_id: UserId::from_db(PLACEHOLDER_USER_ID),
      consenting_user_id: UserId::from_db(99),
      is_confirmed: true,
    });
    store.insert_user(user(5, "five@example.com"));

    let dangling = store.snapshot().dangling_user_references();

    assert_eq!(dangling.len(), 1);
    assert!(dangling[0].ends_with("-> user 99"));
  }
}
