use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::value_objects::TransferStatus;
use crate::domain::account_deletion::entities::DeactivatedPlaceholder;
use crate::domain::user::value_objects::UserId;

/// Recurring or one-off bill shared between an owner and participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedExpense {
  pub id: i64,
  pub expense_nickname: String,
  pub expense_owner_user_id: UserId,
  pub expense_owner_source_account_id: Option<i64>,
  pub expense_owner_destination_account_id: Option<i64>,
  pub is_active: bool,
  pub is_pending: bool,
  pub date_time_deactivated: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}

impl SharedExpense {
  /// Hands ownership to the placeholder and deactivates the bill
  pub fn redirect_owner(&mut self, placeholder: &DeactivatedPlaceholder, now: DateTime<Utc>) {
    self.expense_owner_user_id = placeholder.user_id;
    self.expense_owner_source_account_id = Some(placeholder.account_id);
    self.expense_owner_destination_account_id = Some(placeholder.account_id);

    if self.is_active {
      self.is_active = false;
      self.is_pending = false;
      self.date_time_deactivated = Some(now);
    }
  }
}

/// A participant's share of a shared expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedExpenseUserAgreement {
  pub id: i64,
  pub shared_expense_id: i64,
  pub user_id: UserId,
  pub payment_account_id: Option<i64>,
  pub is_active: bool,
  pub is_pending: bool,
  pub date_time_became_inactive: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}

/// Money movement between two users for a shared expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedExpenseTransaction {
  pub id: i64,
  pub shared_expense_id: i64,
  pub source_user_id: UserId,
  pub destination_user_id: UserId,
  pub source_account_id: Option<i64>,
  pub destination_account_id: Option<i64>,
  pub total_transaction_amount: Decimal,
  pub transfer_url: Option<String>,
  pub transfer_status: TransferStatus,
  pub created_at: DateTime<Utc>,
}

impl SharedExpenseTransaction {
  /// Rewrites whichever side references `user_id` to the placeholder.
  ///
  /// Returns true when anything changed.
  pub fn redirect_party(&mut self, user_id: UserId, placeholder: &DeactivatedPlaceholder) -> bool {
    let mut changed = false;

    if self.source_user_id == user_id {
      self.source_user_id = placeholder.user_id;
      self.source_account_id = Some(placeholder.account_id);
      changed = true;
    }

    if self.destination_user_id == user_id {
      self.destination_user_id = placeholder.user_id;
      self.destination_account_id = Some(placeholder.account_id);
      changed = true;
    }

    changed
  }

  pub fn involves(&self, user_id: UserId) -> bool {
    self.source_user_id == user_id || self.destination_user_id == user_id
  }
}

/// Participant of a shared expense, as needed to notify them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementParticipant {
  pub agreement_id: i64,
  pub user_id: UserId,
  pub email: String,
  pub first_name: String,
}

/// Message telling a participant their agreement was cancelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementCancellationNotice {
  pub shared_expense_id: i64,
  pub agreement_id: i64,
  pub expense_nickname: String,
  pub recipient_user_id: UserId,
  pub recipient_email: String,
  pub deleted_user_first_name: String,
}

impl AgreementCancellationNotice {
  pub fn title(&self) -> &'static str {
    "Agreement Canceled"
  }

  pub fn body(&self) -> String {
    format!(
      "Your agreement, {}, has been canceled because {} deleted their Equater account.",
      self.expense_nickname, self.deleted_user_first_name
    )
  }
}
