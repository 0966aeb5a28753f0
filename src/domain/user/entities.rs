use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::UserId;

/// User entity, as loaded when a deletion is requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  /// Unique identifier for the user
  pub id: UserId,
  /// User's email address (unique)
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  /// Customer resource at the payments provider, if one was provisioned
  pub payment_customer_url: Option<String>,
  /// True only for the reserved account that absorbs deleted users' history
  pub is_deactivated_placeholder: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  /// Creates a user from database fields (for reconstruction)
  #[allow(clippy::too_many_arguments)]
  pub fn from_db(
    id: UserId,
    email: String,
    first_name: String,
    last_name: String,
    payment_customer_url: Option<String>,
    is_deactivated_placeholder: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  ) -> Self {
    Self {
      id,
      email,
      first_name,
      last_name,
      payment_customer_url,
      is_deactivated_placeholder,
      created_at,
      updated_at,
    }
  }

  /// Name shown to other participants
  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
      .trim()
      .to_string()
  }
}

/// Contact-graph edge between two users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
  pub id: i64,
  pub originating_user_id: UserId,
  pub consenting_user_id: UserId,
  pub is_confirmed: bool,
}

impl Relationship {
  /// Returns true when the given user is either endpoint
  pub fn involves(&self, user_id: UserId) -> bool {
    self.originating_user_id == user_id || self.consenting_user_id == user_id
  }
}

/// Push-notification registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
  pub id: i64,
  pub user_id: UserId,
  pub fcm_token: String,
  pub device_model: Option<String>,
}

/// Notification previously delivered to a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotification {
  pub id: i64,
  pub device_id: i64,
  pub title: String,
  pub body: String,
}

/// Invitation to join a shared expense, addressed by e-mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInvite {
  pub id: i64,
  /// Lowercased invitee address
  pub email: String,
  pub initiating_user_id: UserId,
  pub shared_expense_id: Option<i64>,
  pub is_converted: bool,
}

/// Authentication audit log row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginLogEntry {
  pub id: i64,
  pub user_id: UserId,
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
  pub created_at: DateTime<Utc>,
}
