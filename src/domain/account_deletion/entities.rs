use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::entities::User;
use crate::domain::user::value_objects::UserId;

/// Request to run the deletion cascade for one user.
///
/// Carries a snapshot of the user so a redelivered event can still run after
/// the user row is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDeletionEvent {
  pub event_id: Uuid,
  pub user: User,
  pub requested_at: DateTime<Utc>,
  /// Number of failed deliveries so far
  #[serde(default)]
  pub attempt: u32,
  #[serde(default)]
  pub reason: Option<String>,
}

impl AccountDeletionEvent {
  pub fn new(user: User, reason: Option<String>) -> Self {
    Self {
      event_id: Uuid::new_v4(),
      user,
      requested_at: Utc::now(),
      attempt: 0,
      reason,
    }
  }

  pub fn user_id(&self) -> UserId {
    self.user.id
  }
}

/// An event handed out by the queue, to be acked or retried
#[derive(Debug, Clone)]
pub struct Delivery {
  pub event: AccountDeletionEvent,
  /// Backend-specific handle identifying the reserved copy
  pub receipt: String,
}

/// The seeded account that takes over references from deleted users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivatedPlaceholder {
  pub user_id: UserId,
  /// Placeholder linked account, used where rows reference an account
  pub account_id: i64,
  pub display_name: String,
}

impl DeactivatedPlaceholder {
  /// True when `user` is the placeholder itself
  pub fn is_placeholder(&self, user: &User) -> bool {
    user.is_deactivated_placeholder || user.id == self.user_id
  }
}
