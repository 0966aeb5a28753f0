use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::user::value_objects::UserId;

/// Bank account linked through the bank-link provider and, for depository
/// accounts, registered as a funding source with the payments provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
  pub id: i64,
  pub user_id: UserId,
  pub account_name: String,
  pub institution_name: String,
  pub bank_link_access_token: Option<String>,
  pub bank_link_item_id: Option<String>,
  pub funding_source_url: Option<String>,
  pub has_removed_funding_source: bool,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
}

impl LinkedAccount {
  /// True while provider-side resources may still be live
  pub fn needs_external_revocation(&self) -> bool {
    self.bank_link_access_token.is_some() && !self.has_removed_funding_source
  }
}

/// Bank-feed transaction recorded against a linked account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankTransaction {
  pub id: i64,
  pub account_id: i64,
  pub amount: Decimal,
  pub merchant_name: Option<String>,
  pub created_at: DateTime<Utc>,
}
